//! # Events delivered by the dispatcher.
//!
//! An [`Event`] is created once per `trigger` and shared (`Rc`) between every
//! handler of that delivery and the last-triggered-value cache.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. There is no ordering guarantee across different event names.
//!
//! ## Example
//! ```rust
//! use eventvisor::Event;
//!
//! let ev = Event::new("resize", Some((80, 24)));
//! assert_eq!(ev.name(), "resize");
//! assert_eq!(ev.data(), Some(&(80, 24)));
//!
//! let empty: Event<()> = Event::new("ready", None);
//! assert!(empty.data().is_none());
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter shared by events and faults.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Returns the next global sequence number.
#[inline]
pub(crate) fn next_seq() -> u64 {
    EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed)
}

/// One occurrence of a named event.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `data`: payload; `None` is the explicit "no data" value, distinct from
///   any real payload
pub struct Event<P> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event name.
    pub name: Arc<str>,
    /// Payload, if any.
    pub data: Option<P>,
}

impl<P> Event<P> {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(name: impl Into<Arc<str>>, data: Option<P>) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            name: name.into(),
            data,
        }
    }

    /// Event name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload, if the event was triggered with one.
    #[inline]
    pub fn data(&self) -> Option<&P> {
        self.data.as_ref()
    }
}

impl<P: fmt::Debug> fmt::Debug for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("name", &self.name)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a: Event<u8> = Event::new("a", None);
        let b: Event<u8> = Event::new("a", None);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_falsy_payload_is_not_empty() {
        let zero = Event::new("n", Some(0));
        assert_eq!(zero.data(), Some(&0));
        let none: Event<i32> = Event::new("n", None);
        assert_eq!(none.data(), None);
    }
}
