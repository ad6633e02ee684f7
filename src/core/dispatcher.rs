//! # Dispatcher - event scheduling engine.
//!
//! [`Dispatcher`] owns two registries, the last-triggered-value cache, the two
//! coalescing sets and the request/provide broker. It decides whether a
//! delivery is immediate or deferred to the next frame.
//!
//! ## Delivery paths
//! ```text
//! trigger(name, data)
//!   ├─► deliver(ordinary, event)                  immediate, registration order
//!   └─► name has latest subscribers?
//!         ├─ trigger flush running ─► deliver(latest, event) inline
//!         └─ otherwise             ─► mark name ─► plan(FlushLatest)
//!
//! trigger_latest(name, data)
//!   └─► planned_triggers[name] = data (overwrite) ─► plan(FlushTriggers)
//!
//! run_frame()
//!   ├─ FlushTriggers: trigger(name, data) for every planned name (inline latest delivery)
//!   ├─ FlushLatest:   deliver(latest, cached event) for every marked name
//!   │                 not planned for trigger-latest
//!   └─ Compact:       drop disabled records from both registries
//! ```
//!
//! ## Rules
//! - Handler panics are caught per handler, logged and published as [`Fault`]s;
//!   they never reach the caller of `trigger` nor skip sibling handlers.
//! - No internal state is borrowed while user code runs, so handlers may
//!   trigger, subscribe or unsubscribe re-entrantly.
//! - Unsubscribe only disables records; removal is a frame job.
//! - Latest-registry subscribers are delivered at most once per frame per event,
//!   with the most recently cached value.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures::FutureExt;
use futures::channel::oneshot;
use tokio::sync::broadcast;
use tracing::{error, trace, warn};

use crate::config::DispatcherConfig;
use crate::core::builder::DispatcherBuilder;
use crate::core::frame::{FrameJob, FrameQueue};
use crate::core::registry::Registry;
use crate::error::{DispatchError, ProviderError, panic_info};
use crate::events::{Event, Fault, FaultBus, Origin, split_names};
use crate::rendezvous::{Broker, Provided, Request};
use crate::scheduler::Scheduler;
use crate::subscribers::{Delivery, Filter, Handler, Subscriber};

struct Inner<P> {
    config: DispatcherConfig,
    /// Immediate delivery.
    ordinary: Registry<P>,
    /// At most one delivery per frame.
    latest: Registry<P>,
    /// Last delivered event per name; key presence means "was triggered".
    last: RefCell<HashMap<Arc<str>, Rc<Event<P>>>>,
    /// Trigger-latest payloads queued for the next frame, in first-planned order.
    planned_triggers: RefCell<Vec<(Arc<str>, Option<P>)>>,
    /// Names whose latest subscribers must be notified next frame.
    planned_latest: RefCell<Vec<Arc<str>>>,
    /// True while the trigger-latest flush runs.
    flushing_triggers: Cell<bool>,
    frames: FrameQueue,
    faults: FaultBus,
    broker: Broker<P, P>,
}

/// Single-threaded publish/subscribe dispatcher.
///
/// Cheap to clone: clones are handles to the same dispatcher. Handlers should
/// not capture a strong clone (that forms a reference cycle); use
/// [`Delivery::dispatcher`] or [`Dispatcher::downgrade`] instead.
///
/// ## Example
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use eventvisor::{Dispatcher, Handler};
///
/// let d: Dispatcher<i32> = Dispatcher::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&seen);
/// d.subscribe_throttled("scroll", Handler::new(move |ev| sink.set(*ev.data().unwrap())), None);
///
/// d.trigger("scroll", Some(1));
/// d.trigger("scroll", Some(2));
/// d.trigger("scroll", Some(3));
/// assert_eq!(seen.get(), 0);
///
/// d.run_frame();
/// assert_eq!(seen.get(), 3);
/// ```
pub struct Dispatcher<P> {
    inner: Rc<Inner<P>>,
}

impl<P: 'static> Dispatcher<P> {
    /// Creates a dispatcher with default configuration and a [`ManualScheduler`](crate::ManualScheduler).
    pub fn new() -> Self {
        Self::builder(DispatcherConfig::default()).build()
    }

    /// Returns a builder for a dispatcher with `config`.
    pub fn builder(config: DispatcherConfig) -> DispatcherBuilder<P> {
        DispatcherBuilder::new(config)
    }

    pub(crate) fn from_parts(config: DispatcherConfig, scheduler: Box<dyn Scheduler>) -> Self {
        let faults = FaultBus::new(config.fault_capacity_clamped());
        Self {
            inner: Rc::new(Inner {
                config,
                ordinary: Registry::new(),
                latest: Registry::new(),
                last: RefCell::new(HashMap::new()),
                planned_triggers: RefCell::new(Vec::new()),
                planned_latest: RefCell::new(Vec::new()),
                flushing_triggers: Cell::new(false),
                frames: FrameQueue::new(scheduler),
                broker: Broker::with_faults(faults.clone()),
                faults,
            }),
        }
    }

    /// Configuration this dispatcher was built with.
    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    // ---------------------------
    // Subscribe
    // ---------------------------

    /// Subscribes `handler` to every name in `names` (space/comma separated)
    /// for immediate delivery.
    pub fn subscribe(&self, names: &str, handler: Handler<P>, subscriber: Option<&Subscriber>) -> &Self {
        for name in split_names(names) {
            self.inner
                .ordinary
                .register(name, handler.clone(), subscriber.cloned());
        }
        self
    }

    /// Like [`subscribe`](Self::subscribe), first replaying the cached value of
    /// each name that was already triggered.
    pub fn subscribe_with_past(
        &self,
        names: &str,
        handler: Handler<P>,
        subscriber: Option<&Subscriber>,
    ) -> &Self {
        for name in split_names(names) {
            self.replay(name, &handler, subscriber);
            self.inner
                .ordinary
                .register(name, handler.clone(), subscriber.cloned());
        }
        self
    }

    /// Subscribes `handler` for at most one delivery per frame, carrying the
    /// most recent value.
    pub fn subscribe_throttled(
        &self,
        names: &str,
        handler: Handler<P>,
        subscriber: Option<&Subscriber>,
    ) -> &Self {
        for name in split_names(names) {
            self.inner
                .latest
                .register(name, handler.clone(), subscriber.cloned());
        }
        self
    }

    /// Like [`subscribe_throttled`](Self::subscribe_throttled), first replaying
    /// the cached value of each name that was already triggered.
    pub fn subscribe_debounced(
        &self,
        names: &str,
        handler: Handler<P>,
        subscriber: Option<&Subscriber>,
    ) -> &Self {
        for name in split_names(names) {
            self.replay(name, &handler, subscriber);
            self.inner
                .latest
                .register(name, handler.clone(), subscriber.cloned());
        }
        self
    }

    fn replay(&self, name: &str, handler: &Handler<P>, subscriber: Option<&Subscriber>) {
        if let Some(event) = self.last_triggered(name) {
            self.invoke(handler, subscriber, &event, Origin::Replay);
        }
    }

    // ---------------------------
    // Trigger
    // ---------------------------

    /// Delivers `name` now to ordinary subscribers, and to latest subscribers
    /// at the next frame.
    pub fn trigger(&self, name: &str, data: Option<P>) {
        self.dispatch(Rc::new(Event::new(name, data)));
    }

    /// Queues `name` for delivery at the next frame. Within one frame only the
    /// last queued `data` is delivered, once.
    pub fn trigger_latest(&self, name: &str, data: Option<P>) {
        {
            let mut planned = self.inner.planned_triggers.borrow_mut();
            match planned.iter_mut().find(|(n, _)| &**n == name) {
                Some(slot) => {
                    trace!(event = name, "trigger-latest coalesced");
                    slot.1 = data;
                }
                None => planned.push((Arc::from(name), data)),
            }
        }
        self.inner.frames.plan(FrameJob::FlushTriggers);
    }

    fn dispatch(&self, event: Rc<Event<P>>) {
        self.deliver(&self.inner.ordinary, &event, Origin::Ordinary);

        if !self.inner.latest.contains(event.name()) {
            return;
        }
        if self.inner.flushing_triggers.get() {
            // This flush is the frame's delivery for the name.
            self.unmark_latest(event.name());
            self.deliver(&self.inner.latest, &event, Origin::Latest);
        } else {
            self.mark_latest(&event.name);
        }
    }

    fn mark_latest(&self, name: &Arc<str>) {
        {
            let mut marked = self.inner.planned_latest.borrow_mut();
            if marked.iter().any(|n| n == name) {
                return;
            }
            marked.push(Arc::clone(name));
        }
        self.inner.frames.plan(FrameJob::FlushLatest);
    }

    fn unmark_latest(&self, name: &str) {
        self.inner
            .planned_latest
            .borrow_mut()
            .retain(|n| &**n != name);
    }

    /// Caches `event` and invokes every enabled record of its name.
    fn deliver(&self, registry: &Registry<P>, event: &Rc<Event<P>>, origin: Origin) {
        self.inner
            .last
            .borrow_mut()
            .insert(Arc::clone(&event.name), Rc::clone(event));

        for record in registry.snapshot(event.name()) {
            if record.is_enabled() {
                self.invoke(&record.handler, record.subscriber.as_ref(), event, origin);
            }
        }
    }

    fn invoke(
        &self,
        handler: &Handler<P>,
        subscriber: Option<&Subscriber>,
        event: &Rc<Event<P>>,
        origin: Origin,
    ) {
        let delivery = Delivery::new(self, event, subscriber);
        if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| handler.call(&delivery))) {
            let info = panic_info(payload.as_ref());
            error!(event = %event.name, origin = ?origin, info = %info, "handler panicked");
            self.inner.faults.publish(Fault::handler_panicked(
                Arc::clone(&event.name),
                origin,
                info,
            ));
        }
    }

    // ---------------------------
    // Unsubscribe
    // ---------------------------

    /// Disables ordinary registrations selected by `filter`.
    ///
    /// With `Some(name)` present in the registry only that event is scanned,
    /// otherwise every event is. Returns the number of registrations disabled.
    /// An empty filter is a usage error: logged, nothing is disabled.
    pub fn unsubscribe(&self, name: Option<&str>, filter: &Filter<P>) -> usize {
        self.unsubscribe_from(&self.inner.ordinary, name, filter)
    }

    /// Same as [`unsubscribe`](Self::unsubscribe), for throttled/debounced registrations.
    pub fn unsubscribe_latest(&self, name: Option<&str>, filter: &Filter<P>) -> usize {
        self.unsubscribe_from(&self.inner.latest, name, filter)
    }

    fn unsubscribe_from(&self, registry: &Registry<P>, name: Option<&str>, filter: &Filter<P>) -> usize {
        if filter.is_empty() {
            warn!(
                event = name.unwrap_or("*"),
                "unsubscribe requires a handler or a subscriber; ignored"
            );
            return 0;
        }
        let disabled = registry.mark_disabled(name, filter);
        self.inner.frames.plan(FrameJob::Compact);
        disabled
    }

    // ---------------------------
    // When
    // ---------------------------

    /// Resolves on the next delivery of `name` to ordinary subscribers, or at
    /// once with the cached event if `resolve_if_triggered` and `name` was
    /// already triggered.
    pub fn when(&self, name: &str, resolve_if_triggered: bool) -> When<P> {
        let (tx, rx) = oneshot::channel();
        if resolve_if_triggered {
            if let Some(event) = self.last_triggered(name) {
                let _ = tx.send(event);
                return When { rx, cancel: None };
            }
        }

        let once = Subscriber::anonymous();
        let key = once.clone();
        let name: Arc<str> = Arc::from(name);
        let event_name = Arc::clone(&name);
        let tx = RefCell::new(Some(tx));
        let handler = Handler::new(move |delivery: &Delivery<'_, P>| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Rc::clone(delivery.event()));
            }
            delivery
                .dispatcher()
                .unsubscribe(Some(&*event_name), &Filter::subscriber(&key));
        });
        self.inner.ordinary.register(&name, handler, Some(once.clone()));

        let weak = self.downgrade();
        let cancel = move || {
            if let Some(dispatcher) = weak.upgrade() {
                dispatcher.unsubscribe(Some(&*name), &Filter::subscriber(&once));
            }
        };
        When {
            rx,
            cancel: Some(Box::new(cancel)),
        }
    }

    // ---------------------------
    // Frames
    // ---------------------------

    /// Runs every job planned before this call. Returns the number of jobs run.
    pub fn run_frame(&self) -> usize {
        let jobs = self.inner.frames.take();
        let count = jobs.len();
        for job in jobs {
            match job {
                FrameJob::FlushTriggers => self.flush_triggers(),
                FrameJob::FlushLatest => self.flush_latest(),
                FrameJob::Compact => self.compact(),
            }
        }
        count
    }

    /// True if work is planned for the next frame.
    pub fn is_frame_scheduled(&self) -> bool {
        self.inner.frames.is_scheduled()
    }

    fn flush_triggers(&self) {
        let planned = std::mem::take(&mut *self.inner.planned_triggers.borrow_mut());
        trace!(events = planned.len(), "flushing trigger-latest");

        let was_flushing = self.inner.flushing_triggers.replace(true);
        for (name, data) in planned {
            self.dispatch(Rc::new(Event::new(name, data)));
        }
        self.inner.flushing_triggers.set(was_flushing);
    }

    fn flush_latest(&self) {
        let marked = std::mem::take(&mut *self.inner.planned_latest.borrow_mut());
        trace!(events = marked.len(), "flushing latest subscribers");

        for name in marked {
            if self.is_trigger_planned(&name) {
                // Delivered inline by the trigger-latest flush.
                continue;
            }
            if let Some(event) = self.last_triggered(&name) {
                self.deliver(&self.inner.latest, &event, Origin::Latest);
            }
        }
    }

    fn is_trigger_planned(&self, name: &str) -> bool {
        self.inner
            .planned_triggers
            .borrow()
            .iter()
            .any(|(n, _)| &**n == name)
    }

    fn compact(&self) {
        let removed = self.inner.ordinary.compact() + self.inner.latest.compact();
        trace!(removed, "compacted registries");
    }

    // ---------------------------
    // Inspection
    // ---------------------------

    /// Last event delivered for `name`, if it was ever triggered.
    pub fn last_triggered(&self, name: &str) -> Option<Rc<Event<P>>> {
        self.inner.last.borrow().get(name).cloned()
    }

    /// True if `name` was ever delivered.
    pub fn was_triggered(&self, name: &str) -> bool {
        self.inner.last.borrow().contains_key(name)
    }

    /// Stored ordinary registrations for `name`, including disabled ones
    /// awaiting compaction.
    pub fn subscriptions(&self, name: &str) -> usize {
        self.inner.ordinary.len(name)
    }

    /// Stored latest registrations for `name`, including disabled ones
    /// awaiting compaction.
    pub fn latest_subscriptions(&self, name: &str) -> usize {
        self.inner.latest.len(name)
    }

    /// Receiver of faults published after this call.
    pub fn faults(&self) -> broadcast::Receiver<Fault> {
        self.inner.faults.subscribe()
    }

    /// Returns a non-owning handle.
    pub fn downgrade(&self) -> WeakDispatcher<P> {
        WeakDispatcher {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ---------------------------
    // Request/provide
    // ---------------------------

    /// The embedded request/provide broker.
    pub fn broker(&self) -> &Broker<P, P> {
        &self.inner.broker
    }

    /// See [`Broker::provide`].
    ///
    /// # Errors
    /// [`DispatchError::DuplicateProvider`] if `namespace` already has a provider.
    pub fn provide<F>(&self, namespace: &str, provider: F) -> Result<(), DispatchError>
    where
        F: Fn(Option<P>) -> Result<Provided<P>, ProviderError> + 'static,
    {
        self.inner.broker.provide(namespace, provider)
    }

    /// See [`Broker::request`].
    pub fn request(&self, namespace: &str, arg: Option<P>) -> Request<P> {
        self.inner.broker.request(namespace, arg)
    }

    /// See [`Broker::request_with`].
    pub fn request_with(
        &self,
        namespace: &str,
        arg: Option<P>,
        callback: impl FnOnce(&P) + 'static,
    ) -> Request<P> {
        self.inner.broker.request_with(namespace, arg, callback)
    }

    /// See [`Broker::stop_providing`].
    pub fn stop_providing(&self, namespace: &str) -> bool {
        self.inner.broker.stop_providing(namespace)
    }

    /// See [`Broker::is_provided`].
    pub fn is_provided(&self, namespace: &str) -> bool {
        self.inner.broker.is_provided(namespace)
    }
}

impl<P: 'static> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.inner.config)
            .field("frame_scheduled", &self.inner.frames.is_scheduled())
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to a [`Dispatcher`].
pub struct WeakDispatcher<P> {
    inner: Weak<Inner<P>>,
}

impl<P> WeakDispatcher<P> {
    /// Returns the dispatcher if it is still alive.
    pub fn upgrade(&self) -> Option<Dispatcher<P>> {
        self.inner.upgrade().map(|inner| Dispatcher { inner })
    }
}

impl<P> Clone for WeakDispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

/// Future returned by [`Dispatcher::when`].
///
/// Resolves to the delivered event, or `None` if the dispatcher was dropped first.
/// Dropping it before it resolves removes its one-shot registration.
#[must_use = "futures do nothing unless polled"]
pub struct When<P> {
    rx: oneshot::Receiver<Rc<Event<P>>>,
    /// Unsubscribes the one-shot record; `None` once resolved.
    cancel: Option<Box<dyn FnOnce()>>,
}

impl<P> Future for When<P> {
    type Output = Option<Rc<Event<P>>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let out = ready!(self.rx.poll_unpin(cx));
        // The record removed itself when it fired.
        self.cancel = None;
        Poll::Ready(out.ok())
    }
}

impl<P> Drop for When<P> {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
