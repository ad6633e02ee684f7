//! # Fault bus for surfacing isolated panics.
//!
//! [`FaultBus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets the
//! dispatcher report handler and provider panics without blocking and without
//! propagating them to the code that triggered the event.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent faults for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: faults are lost if there are no active receivers at send time
//!   (they are still logged through `tracing`).

use tokio::sync::broadcast;

use super::fault::Fault;

/// Broadcast channel for faults.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct FaultBus {
    tx: broadcast::Sender<Fault>,
}

impl FaultBus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Fault>(capacity);
        Self { tx }
    }

    /// Publishes a fault to all active receivers.
    ///
    /// If there are no receivers the fault is dropped.
    pub fn publish(&self, fault: Fault) {
        let _ = self.tx.send(fault);
    }

    /// Creates a new receiver that will observe subsequent faults.
    ///
    /// A receiver only gets faults **published after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Fault> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Origin;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = FaultBus::new(0);
        bus.publish(Fault::handler_panicked("e".into(), Origin::Ordinary, "boom".into()));
    }

    #[test]
    fn test_receiver_sees_faults_after_subscribe() {
        let bus = FaultBus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(Fault::provider_panicked("ns".into(), "boom".into()));

        let fault = rx.try_recv().expect("fault published");
        assert_eq!(fault.as_label(), "provider_panicked");
        assert_eq!(&*fault.source, "ns");
        assert_eq!(fault.origin, Origin::Provider);
    }
}
