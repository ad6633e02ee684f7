//! # Request handles.
//!
//! A [`Request`] is the deferred result of
//! [`Broker::request`](crate::Broker::request). It settles once the provider
//! has answered, following one level of [`Provided::Deferred`].
//!
//! ```text
//! Waiting(oneshot rx) ──Ready(v)──────────────► Ok(v)
//!        │            ──Deferred(fut)──► Chained(fut) ──► Ok(v) | Err(Rejected) | Err(ProviderPanicked)
//!        │            ──Err(e)────────────────► Err(e)
//!        └─ sender dropped (broker dropped) ──► Err(Abandoned)
//! ```
//!
//! A request with no provider stays in `Waiting` forever; this is not an error.
//!
//! Panics in user code never unwind through `poll`: a panicking deferred
//! provider resolves to [`RequestError::ProviderPanicked`], a panicking
//! callback is published as a fault and the value is still returned.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use tracing::error;

use crate::error::{ProviderError, RequestError, panic_info};
use crate::events::{Fault, FaultBus};

use super::Provided;

/// Provision as seen by the requester: deferred values are already wrapped
/// with panic isolation and the callback.
pub(crate) enum Settled<R> {
    Ready(R),
    Chained(LocalBoxFuture<'static, Result<R, RequestError>>),
}

pub(crate) type Resolution<R> = Result<Settled<R>, RequestError>;

/// Callback channel of `request_with`.
pub(crate) type Callback<R> = Box<dyn FnOnce(&R)>;

/// Sending half of a request: settles it exactly once.
pub(crate) struct Resolver<R> {
    namespace: Arc<str>,
    tx: oneshot::Sender<Resolution<R>>,
    callback: Option<Callback<R>>,
}

impl<R: 'static> Resolver<R> {
    pub(crate) fn new(
        namespace: Arc<str>,
        callback: Option<Callback<R>>,
    ) -> (Self, oneshot::Receiver<Resolution<R>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                namespace,
                tx,
                callback,
            },
            rx,
        )
    }

    /// Settles the request. Ready values reach the callback immediately;
    /// deferred values reach it when the chained future completes.
    pub(crate) fn settle(self, outcome: Result<Provided<R>, RequestError>, faults: Option<&FaultBus>) {
        let Resolver {
            namespace,
            tx,
            callback,
        } = self;

        let resolution = match outcome {
            Ok(Provided::Ready(value)) => {
                if let Some(cb) = callback {
                    run_callback(&namespace, cb, &value, faults);
                }
                Ok(Settled::Ready(value))
            }
            Ok(Provided::Deferred(fut)) => Ok(Settled::Chained(chain(
                namespace,
                fut,
                callback,
                faults.cloned(),
            ))),
            Err(err) => Err(err),
        };

        // The requester may have dropped its handle; nothing to do then.
        let _ = tx.send(resolution);
    }

    pub(crate) fn namespace(&self) -> &Arc<str> {
        &self.namespace
    }
}

/// Wraps a deferred provision: a panic in the provider future rejects the
/// request, a panic in the callback is reported and the value still resolves.
fn chain<R: 'static>(
    namespace: Arc<str>,
    fut: LocalBoxFuture<'static, Result<R, ProviderError>>,
    callback: Option<Callback<R>>,
    faults: Option<FaultBus>,
) -> LocalBoxFuture<'static, Result<R, RequestError>> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .map(move |outcome| match outcome {
            Ok(Ok(value)) => {
                if let Some(cb) = callback {
                    run_callback(&namespace, cb, &value, faults.as_ref());
                }
                Ok(value)
            }
            Ok(Err(err)) => Err(RequestError::Rejected {
                namespace,
                reason: err.reason,
            }),
            Err(payload) => {
                let info = panic_info(payload.as_ref());
                error!(namespace = %namespace, info = %info, "deferred provider panicked");
                if let Some(bus) = &faults {
                    bus.publish(Fault::provider_panicked(Arc::clone(&namespace), info.clone()));
                }
                Err(RequestError::ProviderPanicked { namespace, info })
            }
        })
        .boxed_local()
}

fn run_callback<R>(namespace: &Arc<str>, callback: Callback<R>, value: &R, faults: Option<&FaultBus>) {
    if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
        report_callback_panic(namespace, payload.as_ref(), faults);
    }
}

fn report_callback_panic(namespace: &Arc<str>, payload: &(dyn Any + Send), faults: Option<&FaultBus>) {
    let info = panic_info(payload);
    error!(namespace = %namespace, info = %info, "request callback panicked");
    if let Some(bus) = faults {
        bus.publish(Fault::callback_panicked(Arc::clone(namespace), info));
    }
}

enum State<R> {
    Waiting(oneshot::Receiver<Resolution<R>>),
    Chained(LocalBoxFuture<'static, Result<R, RequestError>>),
    Done,
}

/// Deferred result of a request.
///
/// Resolves to the provider's value, or a [`RequestError`] if the provider
/// rejected or panicked. Stays pending while no provider is registered.
/// Polling after completion returns `Poll::Pending`.
#[must_use = "requests do nothing observable unless polled or given a callback"]
pub struct Request<R> {
    namespace: Arc<str>,
    state: State<R>,
}

impl<R> Request<R> {
    pub(crate) fn new(namespace: Arc<str>, rx: oneshot::Receiver<Resolution<R>>) -> Self {
        Self {
            namespace,
            state: State::Waiting(rx),
        }
    }

    /// Namespace this request is addressed to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl<R> Future for Request<R> {
    type Output = Result<R, RequestError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                State::Waiting(rx) => match ready!(rx.poll_unpin(cx)) {
                    Ok(Ok(Settled::Ready(value))) => {
                        this.state = State::Done;
                        return Poll::Ready(Ok(value));
                    }
                    Ok(Ok(Settled::Chained(fut))) => {
                        this.state = State::Chained(fut);
                    }
                    Ok(Err(err)) => {
                        this.state = State::Done;
                        return Poll::Ready(Err(err));
                    }
                    Err(oneshot::Canceled) => {
                        this.state = State::Done;
                        return Poll::Ready(Err(RequestError::Abandoned {
                            namespace: Arc::clone(&this.namespace),
                        }));
                    }
                },
                State::Chained(fut) => {
                    let res = ready!(fut.poll_unpin(cx));
                    this.state = State::Done;
                    return Poll::Ready(res);
                }
                State::Done => return Poll::Pending,
            }
        }
    }
}
