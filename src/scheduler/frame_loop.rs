//! # Tokio-driven frame loop.
//!
//! Stands in for a host animation-frame callback: frames are requested through
//! a [`FrameSignal`] and run by [`FrameLoop::run`] one `frame_period` later.
//!
//! ```text
//! dispatcher ── request_frame() ──► FrameSignal (Notify permit)
//!                                        │
//! FrameLoop::run ◄── notified() ─────────┘
//!      ├─► sleep(frame_period)            (coalescing window)
//!      ├─► dispatcher.run_frame()
//!      └─► loop until token cancelled
//! ```
//!
//! The dispatcher is `!Send`, so the loop must run on a current-thread runtime
//! or inside a `tokio::task::LocalSet`.

use std::rc::Rc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::core::Dispatcher;
use crate::scheduler::Scheduler;

/// [`Scheduler`] that wakes a [`FrameLoop`].
///
/// Clones share the same signal.
#[derive(Clone, Debug, Default)]
pub struct FrameSignal {
    notify: Rc<Notify>,
}

impl FrameSignal {
    /// Creates a new signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until a frame has been requested.
    ///
    /// A request made while nobody waits is remembered (single permit).
    pub async fn requested(&self) {
        self.notify.notified().await
    }
}

impl Scheduler for FrameSignal {
    fn request_frame(&self) {
        self.notify.notify_one();
    }
}

/// Host loop that runs dispatcher frames on request.
pub struct FrameLoop<P> {
    dispatcher: Dispatcher<P>,
    signal: FrameSignal,
    period: Duration,
}

impl<P: 'static> FrameLoop<P> {
    /// Creates a loop for `dispatcher`, which must have been built with a clone of `signal`.
    pub fn new(dispatcher: Dispatcher<P>, signal: FrameSignal, period: Duration) -> Self {
        Self {
            dispatcher,
            signal,
            period,
        }
    }

    /// Runs frames until `token` is cancelled. Returns the number of frames run.
    pub async fn run(self, token: CancellationToken) -> u64 {
        let mut frames = 0_u64;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = self.signal.requested() => {}
            }
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.period) => {}
            }
            let jobs = self.dispatcher.run_frame();
            frames += 1;
            trace!(frame = frames, jobs, "frame ran");
        }
        frames
    }
}
