//! Runtime core: registries, frame queue and the dispatcher.
//!
//! The only public API from this module is [`Dispatcher`] (with its builder
//! and the [`When`] future).
//!
//! Internal modules:
//! - [`registry`]: per-event handler records with lazy disabling;
//! - [`frame`]: deduplicated queue of jobs deferred to the next frame;
//! - [`dispatcher`]: immediate and coalesced delivery, compaction, rendezvous.

mod builder;
mod dispatcher;
mod frame;
mod registry;


pub use builder::DispatcherBuilder;
pub use dispatcher::{Dispatcher, WeakDispatcher, When};
