//! # Dispatcher configuration.
//!
//! [`DispatcherConfig`] centralizes the few knobs the dispatcher has:
//! the fault bus capacity and the frame period used by
//! [`FrameLoop`](crate::FrameLoop).
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use eventvisor::DispatcherConfig;
//!
//! let mut cfg = DispatcherConfig::default();
//! cfg.frame_period = Duration::from_millis(8);
//! cfg.fault_capacity = 0;
//!
//! assert_eq!(cfg.fault_capacity_clamped(), 1);
//! ```

use std::time::Duration;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
///
/// ## Field semantics
/// - `fault_capacity`: fault bus ring buffer size (min 1; clamped)
/// - `frame_period`: delay between a frame request and the frame run when
///   frames are driven by [`FrameLoop`](crate::FrameLoop)
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Capacity of the fault broadcast channel.
    ///
    /// Fault receivers that lag behind more than `fault_capacity` faults skip
    /// the oldest ones.
    pub fault_capacity: usize,

    /// Frame period for the tokio frame loop.
    ///
    /// Every trigger-latest, throttled delivery and compaction planned within one
    /// period is coalesced into a single frame.
    pub frame_period: Duration,
}

impl DispatcherConfig {
    /// Returns the fault bus capacity, clamped to at least 1.
    #[inline]
    pub fn fault_capacity_clamped(&self) -> usize {
        self.fault_capacity.max(1)
    }
}

impl Default for DispatcherConfig {
    /// Provides a default configuration:
    /// - `fault_capacity = 256`
    /// - `frame_period = 16ms` (about 60 frames per second)
    fn default() -> Self {
        Self {
            fault_capacity: 256,
            frame_period: Duration::from_millis(16),
        }
    }
}
