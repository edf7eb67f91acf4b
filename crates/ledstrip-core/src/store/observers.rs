// ── Observer registry ──
//
// Ordered list of snapshot observers keyed by registration token.
// Fan-out works on a copy of the list so observers may register or
// unregister (themselves or others) from inside a delivery. Each entry
// carries an `active` flag that unregister clears before returning, and
// fan-out checks it immediately before each delivery.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::model::Snapshot;

/// Something that re-renders from a published snapshot.
///
/// Called synchronously on the publishing thread, once per snapshot, in
/// registration order. Implementations must be idempotent and must not
/// trigger a refresh of the same coordinator from inside the callback.
pub trait Observer: Send + Sync {
    fn on_snapshot_updated(&self, snapshot: &Arc<Snapshot>);
}

impl<F> Observer for F
where
    F: Fn(&Arc<Snapshot>) + Send + Sync,
{
    fn on_snapshot_updated(&self, snapshot: &Arc<Snapshot>) {
        self(snapshot);
    }
}

/// Handle returned by registration; pass it back to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverToken(u64);

struct Registration {
    token: ObserverToken,
    active: AtomicBool,
    observer: Arc<dyn Observer>,
}

pub(crate) struct ObserverRegistry {
    entries: Mutex<Vec<Arc<Registration>>>,
    next_token: AtomicU64,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(1),
        }
    }

    pub(crate) fn register(&self, observer: Arc<dyn Observer>) -> ObserverToken {
        let token = ObserverToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Arc::new(Registration {
            token,
            active: AtomicBool::new(true),
            observer,
        }));
        token
    }

    /// Returns `false` if the token was unknown or already removed.
    pub(crate) fn unregister(&self, token: ObserverToken) -> bool {
        let mut entries = self.lock();
        let Some(pos) = entries.iter().position(|r| r.token == token) else {
            return false;
        };
        let removed = entries.remove(pos);
        removed.active.store(false, Ordering::SeqCst);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Deliver `snapshot` to every observer that is still registered when
    /// its turn comes.
    pub(crate) fn fan_out(&self, snapshot: &Arc<Snapshot>) {
        let entries: Vec<Arc<Registration>> = self.lock().clone();
        for entry in entries {
            if entry.active.load(Ordering::SeqCst) {
                entry.observer.on_snapshot_updated(snapshot);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Registration>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
