//! # eventvisor
//!
//! **Eventvisor** is a single-threaded, in-process publish/subscribe dispatcher
//! for interactive hosts (render loops, UI runtimes, games).
//!
//! Besides ordinary immediate delivery it offers frame-coalesced delivery:
//! high-frequency events can be collapsed so that a subscriber sees at most
//! one notification per frame, carrying the most recent value. It also embeds
//! a request/provide rendezvous where requests issued before a provider
//! exists are queued and served once it registers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   trigger / trigger_latest          subscribe* / unsubscribe*       request / provide
//!            │                                 │                             │
//!            ▼                                 ▼                             ▼
//! ┌───────────────────────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (Rc handle, !Send)                                                    │
//! │  - ordinary Registry   immediate delivery, registration order                     │
//! │  - latest Registry     at most one delivery per frame (throttled/debounced)       │
//! │  - last-value cache    replay for *_with_past / debounced / when                  │
//! │  - FrameQueue          FlushTriggers | FlushLatest | Compact, each at most once   │
//! │  - Broker              providers + pending requests per namespace                 │
//! │  - FaultBus            caught handler/provider panics (tokio broadcast)           │
//! └─────────────┬───────────────────────────────────────────────────────┬─────────────┘
//!               │ request_frame() (first job of a frame)                │ faults()
//!               ▼                                                       ▼
//!     Scheduler (host frame clock)                            broadcast::Receiver<Fault>
//!      - ManualScheduler: host calls run_frame() itself
//!      - FrameSignal + FrameLoop: tokio current-thread loop
//!               │
//!               ▼
//!     Dispatcher::run_frame()
//! ```
//!
//! ### Frame lifecycle
//! ```text
//! trigger("scroll", 1) ─► ordinary handlers ─► mark "scroll" ─► plan(FlushLatest) ─► request_frame()
//! trigger("scroll", 2) ─► ordinary handlers ─► already marked
//! trigger("scroll", 3) ─► ordinary handlers ─► already marked
//!            ... frame boundary ...
//! run_frame() ─► FlushLatest ─► throttled handlers see ("scroll", 3) once
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Dispatch**      | Immediate, throttled and debounced delivery, replay, `when`.  | [`Dispatcher`], [`When`]                  |
//! | **Subscriptions** | Handler identity, invocation context, unsubscribe selection.  | [`Handler`], [`Subscriber`], [`Filter`]   |
//! | **Frames**        | Plug the dispatcher into a host frame clock.                  | [`Scheduler`], [`FrameLoop`]              |
//! | **Rendezvous**    | Request a value from a namespace before or after it exists.   | [`Broker`], [`Request`], [`Provided`]     |
//! | **Faults**        | Panics in handlers and providers are caught and published.    | [`Fault`], [`FaultBus`]                   |
//! | **Errors**        | Typed errors for registration and requests.                   | [`DispatchError`], [`RequestError`]       |
//! | **Configuration** | Centralize dispatcher settings.                               | [`DispatcherConfig`]                      |
//!
//! ## Example
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use eventvisor::{Dispatcher, Handler, Subscriber};
//!
//! struct Panel { title: &'static str }
//!
//! let d: Dispatcher<String> = Dispatcher::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let panel = Subscriber::new(Panel { title: "main" });
//! let sink = Rc::clone(&log);
//! d.subscribe("resize, scroll", Handler::new(move |ev| {
//!     let title = ev.context::<Panel>().map_or("?", |p| p.title);
//!     sink.borrow_mut().push(format!("{title}:{}", ev.name()));
//! }), Some(&panel));
//!
//! d.trigger("resize", None);
//! d.trigger("scroll", Some("down".to_string()));
//!
//! assert_eq!(*log.borrow(), ["main:resize", "main:scroll"]);
//! ```
mod config;
mod core;
mod error;
mod events;
mod rendezvous;
mod scheduler;
mod subscribers;

// ---- Public re-exports ----

pub use config::DispatcherConfig;
pub use core::{Dispatcher, DispatcherBuilder, WeakDispatcher, When};
pub use error::{DispatchError, ProviderError, RequestError};
pub use events::{Event, Fault, FaultBus, FaultKind, Origin, split_names};
pub use rendezvous::{Broker, Provided, Request};
pub use scheduler::{FrameLoop, FrameSignal, ManualScheduler, Scheduler};
pub use subscribers::{Delivery, Filter, Handler, Subscriber};
