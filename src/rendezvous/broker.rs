//! # Request/provide broker.
//!
//! Pairs requesters with a single provider per namespace, queuing requests
//! made before any provider registered.
//!
//! ## Architecture
//! ```text
//! request(ns, arg) ──► provider present? ──yes──► serve(provider, arg) ──► Resolver::settle
//!                                │
//!                                └──no──► pending[ns].push({arg, resolver})
//!
//! provide(ns, f) ──► providers[ns] = f ──► drain pending[ns] in FIFO order ──► serve(f, arg)
//! stop_providing(ns) ──► providers.remove(ns)   (queued/settled requests untouched)
//! ```
//!
//! ## Rules
//! - At most one provider per namespace; a second `provide` is a usage error.
//! - A provider error or panic rejects only the request being served.
//! - A request with no provider stays pending; there is no timeout.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::error::{DispatchError, ProviderError, RequestError, panic_info};
use crate::events::{Fault, FaultBus};

use super::Provided;
use super::request::{Callback, Request, Resolver};

type ProviderFn<A, R> = dyn Fn(Option<A>) -> Result<Provided<R>, ProviderError>;

/// A request waiting for a provider.
struct Pending<A, R> {
    arg: Option<A>,
    resolver: Resolver<R>,
}

/// Single-provider-per-namespace request broker.
///
/// `A` is the request argument type, `R` the provided value type.
///
/// ```
/// use eventvisor::Broker;
/// use futures::FutureExt;
///
/// let broker: Broker<u32, String> = Broker::new();
/// let early = broker.request("numbers", Some(50));
///
/// broker
///     .provide("numbers", |arg| Ok(format!("got {arg:?}").into()))
///     .unwrap();
///
/// assert_eq!(early.now_or_never(), Some(Ok("got Some(50)".to_string())));
/// ```
pub struct Broker<A, R> {
    providers: RefCell<HashMap<Arc<str>, Rc<ProviderFn<A, R>>>>,
    pending: RefCell<HashMap<Arc<str>, Vec<Pending<A, R>>>>,
    faults: Option<FaultBus>,
}

impl<A: 'static, R: 'static> Broker<A, R> {
    /// Creates a broker that reports provider panics only through `tracing`.
    pub fn new() -> Self {
        Self {
            providers: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashMap::new()),
            faults: None,
        }
    }

    /// Creates a broker that also publishes provider panics on `faults`.
    pub fn with_faults(faults: FaultBus) -> Self {
        Self {
            faults: Some(faults),
            ..Self::new()
        }
    }

    /// Installs the provider for `namespace` and serves every queued request
    /// for it, in the order they were made.
    ///
    /// # Errors
    /// [`DispatchError::DuplicateProvider`] if `namespace` already has a provider.
    pub fn provide<F>(&self, namespace: &str, provider: F) -> Result<(), DispatchError>
    where
        F: Fn(Option<A>) -> Result<Provided<R>, ProviderError> + 'static,
    {
        let provider: Rc<ProviderFn<A, R>> = Rc::new(provider);
        {
            let mut providers = self.providers.borrow_mut();
            if providers.contains_key(namespace) {
                return Err(DispatchError::DuplicateProvider {
                    namespace: Arc::from(namespace),
                });
            }
            providers.insert(Arc::from(namespace), Rc::clone(&provider));
        }

        let queued = self
            .pending
            .borrow_mut()
            .remove(namespace)
            .unwrap_or_default();
        debug!(namespace, drained = queued.len(), "provider registered");

        for Pending { arg, resolver } in queued {
            self.serve(provider.as_ref(), arg, resolver);
        }
        Ok(())
    }

    /// Requests a value from the provider of `namespace`.
    ///
    /// Served synchronously if a provider exists; queued otherwise.
    pub fn request(&self, namespace: &str, arg: Option<A>) -> Request<R> {
        self.submit(namespace, arg, None)
    }

    /// Like [`request`](Self::request), additionally invoking `callback` with the value.
    ///
    /// For a ready value the callback runs as soon as the provider answers,
    /// even if the returned [`Request`] is dropped. For a deferred value it runs
    /// when the chained future completes, while the request is polled.
    pub fn request_with(
        &self,
        namespace: &str,
        arg: Option<A>,
        callback: impl FnOnce(&R) + 'static,
    ) -> Request<R> {
        self.submit(namespace, arg, Some(Box::new(callback)))
    }

    /// Removes the provider of `namespace`. Returns true if one was installed.
    ///
    /// Already settled requests are unaffected; later requests queue again.
    pub fn stop_providing(&self, namespace: &str) -> bool {
        let removed = self.providers.borrow_mut().remove(namespace).is_some();
        debug!(namespace, removed, "provider removed");
        removed
    }

    /// True if `namespace` currently has a provider.
    pub fn is_provided(&self, namespace: &str) -> bool {
        self.providers.borrow().contains_key(namespace)
    }

    /// Number of requests queued for `namespace`.
    pub fn pending(&self, namespace: &str) -> usize {
        self.pending.borrow().get(namespace).map_or(0, Vec::len)
    }

    fn submit(&self, namespace: &str, arg: Option<A>, callback: Option<Callback<R>>) -> Request<R> {
        let namespace: Arc<str> = Arc::from(namespace);
        let (resolver, rx) = Resolver::new(Arc::clone(&namespace), callback);

        let provider = self.providers.borrow().get(&*namespace).cloned();
        match provider {
            Some(provider) => self.serve(provider.as_ref(), arg, resolver),
            None => {
                trace!(namespace = %namespace, "request queued until provided");
                self.pending
                    .borrow_mut()
                    .entry(Arc::clone(&namespace))
                    .or_default()
                    .push(Pending { arg, resolver });
            }
        }
        Request::new(namespace, rx)
    }

    /// Runs the provider for one request and settles it.
    ///
    /// No broker state is borrowed while the provider runs, so providers may
    /// re-enter the broker.
    fn serve(&self, provider: &ProviderFn<A, R>, arg: Option<A>, resolver: Resolver<R>) {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| provider(arg)));
        let resolution = match outcome {
            Ok(Ok(provided)) => Ok(provided),
            Ok(Err(err)) => Err(RequestError::Rejected {
                namespace: Arc::clone(resolver.namespace()),
                reason: err.reason,
            }),
            Err(payload) => {
                let namespace = Arc::clone(resolver.namespace());
                let info = panic_info(payload.as_ref());
                error!(namespace = %namespace, info = %info, "provider panicked");
                if let Some(bus) = &self.faults {
                    bus.publish(Fault::provider_panicked(Arc::clone(&namespace), info.clone()));
                }
                Err(RequestError::ProviderPanicked { namespace, info })
            }
        };
        resolver.settle(resolution, self.faults.as_ref());
    }
}

impl<A: 'static, R: 'static> Default for Broker<A, R> {
    fn default() -> Self {
        Self::new()
    }
}
