/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Status broadcaster: snapshot fan-out to observers.
//!
//! Two delivery mechanisms, matching the two kinds of consumers:
//!
//! - **Listeners** are synchronous closures registered while wiring the gate,
//!   invoked in registration order for every snapshot. In-process consumers
//!   (tests, metrics hooks) use these.
//! - **Observers** are channel subscriptions added and removed at any time
//!   (one per connected control-channel client). Delivery is per-observer
//!   isolated: a dead observer is pruned, never blocking the rest.
//!
//! The broadcaster has no transport knowledge and no queuing policy of its
//! own; an observer that connects mid-sequence sees only subsequent
//! snapshots and queries the current one synchronously from the gate.

use crate::gate::GateSnapshot;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Type alias for snapshot listener functions.
type SnapshotListener = Arc<dyn Fn(&GateSnapshot) + Send + Sync>;

/// Registry of snapshot consumers for one gate.
///
/// # Examples
///
/// ```
/// use boomgate_rs::broadcast::Broadcaster;
///
/// let mut broadcaster = Broadcaster::new();
/// broadcaster.add_listener(|snapshot| {
///     println!("gate {} at version {}", snapshot.gate_id, snapshot.sequence_version);
/// });
/// ```
#[derive(Default)]
pub struct Broadcaster {
    listeners: Vec<SnapshotListener>,
    observers: DashMap<u64, mpsc::UnboundedSender<GateSnapshot>>,
    next_observer_id: AtomicU64,
}

impl Broadcaster {
    /// Creates an empty broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener called synchronously, in version order, for each
    /// published snapshot. Listeners are registered while wiring the gate,
    /// before any snapshot flows.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&GateSnapshot) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Registers an observer and returns its subscription handle.
    ///
    /// The observer receives every snapshot published after this call.
    #[must_use]
    pub fn subscribe(&self) -> StatusSubscription {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.insert(id, tx);
        debug!(observer_id = id, "observer subscribed");
        StatusSubscription { id, rx }
    }

    /// Removes an observer. The transport layer calls this on disconnect;
    /// dropped receivers are also pruned lazily on the next publish.
    pub fn unsubscribe(&self, observer_id: u64) {
        self.observers.remove(&observer_id);
        debug!(observer_id, "observer unsubscribed");
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Delivers a snapshot to every listener and observer.
    ///
    /// Observers whose channel is gone are pruned; one failed delivery never
    /// affects the others. Called under the gate status lock, which is what
    /// makes delivery order match `sequence_version` order.
    pub(crate) fn publish(&self, snapshot: &GateSnapshot) {
        for listener in &self.listeners {
            listener(snapshot);
        }
        self.observers
            .retain(|_, tx| tx.send(snapshot.clone()).is_ok());
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Handle held by one observer: an id for explicit disconnect and the
/// receiving end of the snapshot stream.
#[derive(Debug)]
pub struct StatusSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<GateSnapshot>,
}

impl StatusSubscription {
    /// Observer id, for [`Broadcaster::unsubscribe`].
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the next snapshot. Returns `None` once the gate is gone.
    pub async fn recv(&mut self) -> Option<GateSnapshot> {
        self.rx.recv().await
    }

    /// Returns the next snapshot if one is already queued.
    pub fn try_recv(&mut self) -> Option<GateSnapshot> {
        self.rx.try_recv().ok()
    }
}
