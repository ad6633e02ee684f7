//! # Frame job queue.
//!
//! Three kinds of deferred work share one scheduling primitive: "run once at
//! the next frame boundary, then allow planning again".
//!
//! ```text
//! plan(FlushTriggers) ─┐
//! plan(FlushLatest)   ─┼─► jobs: [..] ── first plan ──► Scheduler::request_frame()
//! plan(Compact)       ─┘         │
//!                                ▼
//!                     run_frame(): take all jobs, run in planning order
//! ```
//!
//! ## Rules
//! - Each job kind is planned at most once per frame (the guard is "already queued").
//! - `request_frame` is called only for the first job of a frame.
//! - Jobs are taken before running, so anything planned while a frame runs
//!   belongs to the next frame.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::scheduler::Scheduler;

/// Deferred work kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameJob {
    /// Deliver queued trigger-latest payloads.
    FlushTriggers,
    /// Notify latest-registry subscribers of marked events.
    FlushLatest,
    /// Physically remove disabled records.
    Compact,
}

pub(crate) struct FrameQueue {
    jobs: RefCell<VecDeque<FrameJob>>,
    scheduler: Box<dyn Scheduler>,
}

impl FrameQueue {
    pub(crate) fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            jobs: RefCell::new(VecDeque::with_capacity(3)),
            scheduler,
        }
    }

    /// Plans `job` for the next frame. Returns false if it was already planned.
    pub(crate) fn plan(&self, job: FrameJob) -> bool {
        let first = {
            let mut jobs = self.jobs.borrow_mut();
            if jobs.contains(&job) {
                return false;
            }
            jobs.push_back(job);
            jobs.len() == 1
        };
        if first {
            self.scheduler.request_frame();
        }
        true
    }

    /// True if any job is planned.
    pub(crate) fn is_scheduled(&self) -> bool {
        !self.jobs.borrow().is_empty()
    }

    /// Takes every planned job, resetting the guards.
    pub(crate) fn take(&self) -> VecDeque<FrameJob> {
        std::mem::take(&mut *self.jobs.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counting(Cell<usize>);

    impl Scheduler for Counting {
        fn request_frame(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_plan_requests_one_frame_per_batch() {
        let counter = Rc::new(Counting::default());
        let q = FrameQueue::new(Box::new(Rc::clone(&counter)));

        assert!(q.plan(FrameJob::Compact));
        assert!(!q.plan(FrameJob::Compact));
        assert!(q.plan(FrameJob::FlushTriggers));
        assert_eq!(counter.0.get(), 1);

        let jobs: Vec<FrameJob> = q.take().into_iter().collect();
        assert_eq!(jobs, [FrameJob::Compact, FrameJob::FlushTriggers]);
        assert!(!q.is_scheduled());

        assert!(q.plan(FrameJob::Compact));
        assert_eq!(counter.0.get(), 2);
    }
}
