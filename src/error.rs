//! Error types used by the dispatcher and the request/provide broker.
//!
//! This module defines three error types:
//!
//! - [`DispatchError`]: usage errors raised synchronously to the caller.
//! - [`RequestError`]: reasons a [`Request`](crate::Request) settles without a value.
//! - [`ProviderError`]: returned by provider functions to reject one request.
//!
//! The enums provide helper methods (`as_label`, `as_message`) for logs/metrics.
//!
//! Handler panics are not errors of the caller: they are isolated and reported
//! as [`Fault`](crate::Fault)s on the fault bus.

use std::sync::Arc;
use thiserror::Error;

/// # Usage errors produced by the dispatcher.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A provider is already registered for this namespace.
    #[error("\"{namespace}\" is already provided")]
    DuplicateProvider {
        /// The occupied namespace.
        namespace: Arc<str>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::DispatchError;
    ///
    /// let err = DispatchError::DuplicateProvider { namespace: "data".into() };
    /// assert_eq!(err.as_label(), "dispatch_duplicate_provider");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::DuplicateProvider { .. } => "dispatch_duplicate_provider",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::DuplicateProvider { namespace } => {
                format!("duplicate provider for namespace={namespace}")
            }
        }
    }
}

/// # Reasons a request settles without a value.
///
/// A request with no provider is **not** an error: it simply stays pending.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The provider returned an error (directly or from its deferred result).
    #[error("request to \"{namespace}\" rejected: {reason}")]
    Rejected {
        /// Namespace the request was addressed to.
        namespace: Arc<str>,
        /// Provider's rejection reason.
        reason: String,
    },

    /// The provider panicked while serving this request.
    #[error("provider of \"{namespace}\" panicked: {info}")]
    ProviderPanicked {
        /// Namespace the request was addressed to.
        namespace: Arc<str>,
        /// Panic payload rendered as text.
        info: String,
    },

    /// The broker was dropped while the request was still queued.
    #[error("request to \"{namespace}\" abandoned")]
    Abandoned {
        /// Namespace the request was addressed to.
        namespace: Arc<str>,
    },
}

impl RequestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::RequestError;
    ///
    /// let err = RequestError::Abandoned { namespace: "data".into() };
    /// assert_eq!(err.as_label(), "request_abandoned");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestError::Rejected { .. } => "request_rejected",
            RequestError::ProviderPanicked { .. } => "request_provider_panicked",
            RequestError::Abandoned { .. } => "request_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RequestError::Rejected { namespace, reason } => {
                format!("rejected: namespace={namespace} reason={reason}")
            }
            RequestError::ProviderPanicked { namespace, info } => {
                format!("provider panicked: namespace={namespace} info={info}")
            }
            RequestError::Abandoned { namespace } => format!("abandoned: namespace={namespace}"),
        }
    }

    /// Namespace the failed request was addressed to.
    pub fn namespace(&self) -> &str {
        match self {
            RequestError::Rejected { namespace, .. }
            | RequestError::ProviderPanicked { namespace, .. }
            | RequestError::Abandoned { namespace } => namespace,
        }
    }
}

/// Rejection returned by a provider function.
///
/// Rejects only the request being served; other queued requests are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ProviderError {
    /// Human-readable rejection reason.
    pub reason: String,
}

impl ProviderError {
    /// Creates a rejection with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let dup = DispatchError::DuplicateProvider {
            namespace: "ns".into(),
        };
        assert_eq!(dup.as_label(), "dispatch_duplicate_provider");
        assert_eq!(dup.to_string(), "\"ns\" is already provided");

        let rejected = RequestError::Rejected {
            namespace: "ns".into(),
            reason: "nope".into(),
        };
        assert_eq!(rejected.as_label(), "request_rejected");
        assert_eq!(rejected.namespace(), "ns");
        assert_eq!(rejected.as_message(), "rejected: namespace=ns reason=nope");
    }

    #[test]
    fn test_panic_info_downcasts_common_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_info(s.as_ref()), "static");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_info(owned.as_ref()), "owned");

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_info(other.as_ref()), "unknown panic");
    }
}
