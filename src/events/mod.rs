//! Event data model, fault reporting and name parsing.
//!
//! ## Contents
//! - [`Event`] one occurrence of a named event with its payload
//! - [`Fault`], [`FaultKind`], [`Origin`] caught panics from handlers and providers
//! - [`FaultBus`] thin wrapper over `tokio::sync::broadcast` for faults
//! - [`split_names`] space/comma separated name lists
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher` (handler panics), `Broker` (provider panics).
//! - **Consumers**: whoever holds a receiver from `Dispatcher::faults()`.

mod bus;
mod event;
mod fault;
mod names;

pub use bus::FaultBus;
pub use event::Event;
pub use fault::{Fault, FaultKind, Origin};
pub use names::split_names;
