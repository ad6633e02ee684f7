//! # Faults raised by user code during delivery.
//!
//! A handler that panics must not abort delivery to its siblings nor reach the
//! caller of `trigger`. The panic is caught and turned into a [`Fault`],
//! published on the [`FaultBus`](super::FaultBus) and logged at `error` level.
//!
//! Provider panics are reported the same way, in addition to rejecting the
//! request being served. A panicking `request_with` callback is reported as
//! [`FaultKind::CallbackPanicked`]; the request still resolves with the value.

use std::sync::Arc;
use std::time::SystemTime;

use super::event::next_seq;

/// Classification of faults.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// An event handler panicked.
    ///
    /// Sets:
    /// - `source`: event name
    /// - `origin`: which delivery path invoked the handler
    HandlerPanicked,

    /// A provider function panicked while serving a request.
    ///
    /// Sets:
    /// - `source`: namespace
    /// - `origin`: [`Origin::Provider`]
    ProviderPanicked,

    /// A `request_with` callback panicked while receiving a provided value.
    ///
    /// Sets:
    /// - `source`: namespace
    /// - `origin`: [`Origin::Callback`]
    CallbackPanicked,
}

/// Delivery path that invoked the faulting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Immediate delivery from the ordinary registry.
    Ordinary,
    /// Once-per-frame delivery from the latest registry.
    Latest,
    /// Replay of the cached value at subscribe time.
    Replay,
    /// Provider invocation for a request.
    Provider,
    /// Requester callback invoked with the provided value.
    Callback,
}

/// A caught panic from user code.
#[derive(Debug, Clone)]
pub struct Fault {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Fault classification.
    pub kind: FaultKind,
    /// Event name or namespace.
    pub source: Arc<str>,
    /// Delivery path.
    pub origin: Origin,
    /// Panic payload rendered as text.
    pub info: String,
}

impl Fault {
    /// Creates a handler fault.
    #[inline]
    pub fn handler_panicked(event: Arc<str>, origin: Origin, info: String) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            kind: FaultKind::HandlerPanicked,
            source: event,
            origin,
            info,
        }
    }

    /// Creates a provider fault.
    #[inline]
    pub fn provider_panicked(namespace: Arc<str>, info: String) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            kind: FaultKind::ProviderPanicked,
            source: namespace,
            origin: Origin::Provider,
            info,
        }
    }

    /// Creates a requester callback fault.
    #[inline]
    pub fn callback_panicked(namespace: Arc<str>, info: String) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            kind: FaultKind::CallbackPanicked,
            source: namespace,
            origin: Origin::Callback,
            info,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self.kind {
            FaultKind::HandlerPanicked => "handler_panicked",
            FaultKind::ProviderPanicked => "provider_panicked",
            FaultKind::CallbackPanicked => "callback_panicked",
        }
    }
}
