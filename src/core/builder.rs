use std::marker::PhantomData;

use crate::config::DispatcherConfig;
use crate::scheduler::{ManualScheduler, Scheduler};

use super::dispatcher::Dispatcher;

/// Builder for constructing a [`Dispatcher`] with optional features.
pub struct DispatcherBuilder<P> {
    cfg: DispatcherConfig,
    scheduler: Option<Box<dyn Scheduler>>,
    _payload: PhantomData<fn() -> P>,
}

impl<P: 'static> DispatcherBuilder<P> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            scheduler: None,
            _payload: PhantomData,
        }
    }

    /// Sets the frame scheduler.
    ///
    /// The dispatcher calls [`Scheduler::request_frame`] when the first job of
    /// a frame is planned; the host then calls [`Dispatcher::run_frame`].
    /// Defaults to [`ManualScheduler`].
    pub fn with_scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Builds and returns the Dispatcher instance.
    pub fn build(self) -> Dispatcher<P> {
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Box::new(ManualScheduler));
        Dispatcher::from_parts(self.cfg, scheduler)
    }
}
