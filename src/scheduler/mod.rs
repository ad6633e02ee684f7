//! # Frame scheduling.
//!
//! The dispatcher never decides *when* a frame happens. Whenever it plans work
//! for the next frame and no frame is pending yet, it calls
//! [`Scheduler::request_frame`] once; the host then calls
//! [`Dispatcher::run_frame`](crate::Dispatcher::run_frame) at its next frame
//! boundary.
//!
//! ## Implementations
//! - [`ManualScheduler`] does nothing: the host polls
//!   [`Dispatcher::is_frame_scheduled`](crate::Dispatcher::is_frame_scheduled)
//!   or simply calls `run_frame()` every frame (render loops, tests).
//! - [`FrameSignal`] wakes a [`FrameLoop`] running on a tokio current-thread
//!   runtime, which waits one `frame_period` and runs the frame.
//!
//! Custom hosts (a window system's vsync callback, a game loop) implement
//! [`Scheduler`] directly.

mod frame_loop;

pub use frame_loop::{FrameLoop, FrameSignal};

/// Capability to arrange for a frame to run.
///
/// The dispatcher keeps the "already scheduled" guard itself, so
/// `request_frame` is called at most once between two frame runs.
pub trait Scheduler {
    /// Arrange for `Dispatcher::run_frame` to be called at the next frame boundary.
    fn request_frame(&self);
}

/// Scheduler for hosts that drive frames themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualScheduler;

impl Scheduler for ManualScheduler {
    fn request_frame(&self) {}
}

impl<S: Scheduler + ?Sized> Scheduler for std::rc::Rc<S> {
    fn request_frame(&self) {
        (**self).request_frame()
    }
}
