//! Provider results.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::error::ProviderError;

/// What a provider hands back for one request: a value now, or later.
///
/// A deferred result is flattened exactly once: the request resolves with the
/// inner future's output.
///
/// ```
/// use eventvisor::Provided;
///
/// let now: Provided<u32> = 7.into();
/// assert!(now.is_ready());
///
/// let later = Provided::deferred(async { Ok(7_u32) });
/// assert!(!later.is_ready());
/// ```
pub enum Provided<R> {
    /// The value is available now.
    Ready(R),
    /// The value will be produced by a future.
    Deferred(LocalBoxFuture<'static, Result<R, ProviderError>>),
}

impl<R> Provided<R> {
    /// Wraps a future producing the value.
    pub fn deferred(fut: impl Future<Output = Result<R, ProviderError>> + 'static) -> Self {
        Provided::Deferred(fut.boxed_local())
    }

    /// True for [`Provided::Ready`].
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Provided::Ready(_))
    }
}

impl<R> From<R> for Provided<R> {
    fn from(value: R) -> Self {
        Provided::Ready(value)
    }
}

impl<R: fmt::Debug> fmt::Debug for Provided<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provided::Ready(v) => f.debug_tuple("Ready").field(v).finish(),
            Provided::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
