// ── Snapshot store ──
//
// Holds the latest published snapshot for one device and fans each new
// one out to push observers. Async consumers read the same value through
// a `watch` channel.

mod observers;

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Snapshot;
use crate::stream::SnapshotStream;

pub use observers::{Observer, ObserverToken};

use observers::ObserverRegistry;

pub(crate) struct SnapshotStore {
    latest: watch::Sender<Arc<Snapshot>>,
    observers: ObserverRegistry,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        let (latest, _) = watch::channel(Arc::new(Snapshot::unavailable(0)));
        Self {
            latest,
            observers: ObserverRegistry::new(),
        }
    }

    /// Replace the current snapshot, then deliver it to every observer.
    /// Callers serialize publishes.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.latest.send_replace(Arc::clone(&snapshot));
        self.observers.fan_out(&snapshot);
        snapshot
    }

    pub(crate) fn current(&self) -> Arc<Snapshot> {
        self.latest.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.latest.subscribe())
    }

    pub(crate) fn register(&self, observer: Arc<dyn Observer>) -> ObserverToken {
        self.observers.register(observer)
    }

    pub(crate) fn unregister(&self, token: ObserverToken) -> bool {
        self.observers.unregister(token)
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
