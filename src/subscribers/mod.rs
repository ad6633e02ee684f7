//! # Subscription building blocks.
//!
//! This module provides what callers register with the
//! [`Dispatcher`](crate::Dispatcher) and what they use to unregister.
//!
//! ## Architecture
//! ```text
//! subscribe(names, Handler, Option<&Subscriber>)
//!        │
//!        ▼
//!   Registry ── Record { handler, subscriber, disabled } ──► Handler::call(&Delivery)
//!        ▲                                                        │
//!        │                                          Delivery { dispatcher, event, subscriber }
//! unsubscribe(name, &Filter) ── marks records disabled
//! ```
//!
//! ## Contents
//! - [`Handler`], [`Delivery`] callable and what it receives
//! - [`Subscriber`] identity used as invocation context and unsubscribe key
//! - [`Filter`] selector for unsubscribe

mod filter;
mod handler;
mod subscriber;

pub use filter::Filter;
pub use handler::{Delivery, Handler};
pub use subscriber::Subscriber;
