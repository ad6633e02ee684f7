//! Request/provide rendezvous.
//!
//! A sibling of the event system that shares only the dispatcher object:
//! a requester asks a namespace for a value, a provider registered for that
//! namespace (possibly later) answers it.
//!
//! ## Contents
//! - [`Broker`] provider table and pending-request queue
//! - [`Request`] deferred result returned to the requester
//! - [`Provided`] provider answer: ready value or future

mod broker;
mod provided;
mod request;

pub use broker::Broker;
pub use provided::Provided;
pub use request::Request;
