//! # Event handlers
//!
//! [`Handler`] is the callable registered with the dispatcher. It receives a
//! [`Delivery`] describing the event, the optional invocation context and the
//! dispatcher itself (so it can trigger, subscribe or unsubscribe re-entrantly).
//!
//! ## Identity
//! A handler's identity is its allocation: clones of one `Handler` are the same
//! handler, two `Handler::new` calls are different handlers even for identical
//! closures. Unsubscribing by handler disables every registration made with
//! that handler (or its clones).
//!
//! ## Example
//! ```rust
//! use eventvisor::{Dispatcher, Filter, Handler};
//!
//! let d: Dispatcher<u32> = Dispatcher::new();
//! let h = Handler::new(|delivery| {
//!     println!("{} -> {:?}", delivery.name(), delivery.data());
//! });
//! d.subscribe("tick", h.clone(), None);
//! d.trigger("tick", Some(1));
//! d.unsubscribe(Some("tick"), &Filter::handler(&h));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::core::Dispatcher;
use crate::events::Event;
use crate::subscribers::Subscriber;

type HandlerFn<P> = dyn Fn(&Delivery<'_, P>);

/// A registered event callback.
pub struct Handler<P> {
    f: Rc<HandlerFn<P>>,
}

impl<P> Handler<P> {
    /// Wraps a closure into a new handler identity.
    pub fn new(f: impl Fn(&Delivery<'_, P>) + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Invokes the handler.
    #[inline]
    pub(crate) fn call(&self, delivery: &Delivery<'_, P>) {
        (self.f)(delivery)
    }

    /// True if both values are the same handler.
    #[inline]
    pub fn same(&self, other: &Handler<P>) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl<P> Clone for Handler<P> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<P> PartialEq for Handler<P> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<P> Eq for Handler<P> {}

impl<P> fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &Rc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}

/// What a handler sees when it is invoked.
///
/// The invocation context is the subscriber given at subscribe time; when none
/// was given, [`Delivery::dispatcher`] is the context to act on.
pub struct Delivery<'a, P> {
    dispatcher: &'a Dispatcher<P>,
    event: &'a Rc<Event<P>>,
    subscriber: Option<&'a Subscriber>,
}

impl<'a, P> Delivery<'a, P> {
    pub(crate) fn new(
        dispatcher: &'a Dispatcher<P>,
        event: &'a Rc<Event<P>>,
        subscriber: Option<&'a Subscriber>,
    ) -> Self {
        Self {
            dispatcher,
            event,
            subscriber,
        }
    }

    /// The dispatcher delivering the event.
    #[inline]
    pub fn dispatcher(&self) -> &'a Dispatcher<P> {
        self.dispatcher
    }

    /// The delivered event (shared with the last-triggered-value cache).
    #[inline]
    pub fn event(&self) -> &'a Rc<Event<P>> {
        self.event
    }

    /// Event name.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.event.name()
    }

    /// Event payload, `None` if triggered without data.
    #[inline]
    pub fn data(&self) -> Option<&'a P> {
        self.event.data()
    }

    /// Subscriber identity given at subscribe time.
    #[inline]
    pub fn subscriber(&self) -> Option<&'a Subscriber> {
        self.subscriber
    }

    /// Invocation context: the subscriber's value, if it is a `T`.
    #[inline]
    pub fn context<T: 'static>(&self) -> Option<&'a T> {
        self.subscriber.and_then(Subscriber::downcast_ref::<T>)
    }
}
