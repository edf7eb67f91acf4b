// ── State coordinator ──
//
// One coordinator per strip. It turns driver change notifications into
// published snapshots, owns the attach/shutdown lifecycle, and hands the
// device handle to surfaces that issue commands.
//
// Publishing is serialized by a single mutex: belief read, snapshot build,
// store replace, and observer fan-out all happen under it, so observers
// see snapshots one at a time and in version order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::device::{DeviceHandle, ListenerId};
use crate::error::CoreError;
use crate::model::{DeviceAddress, Snapshot};
use crate::store::{Observer, ObserverToken, SnapshotStore};
use crate::stream::SnapshotStream;

// ── Lifecycle ────────────────────────────────────────────────────

/// Attachment and connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// No device handle yet.
    Detached,
    /// Handle attached, link down.
    Unconnected,
    /// Handle attached, link up.
    Connected,
    /// Host stop received; disconnect in progress.
    ShuttingDown,
    Stopped,
}

impl Lifecycle {
    pub fn is_attached(self) -> bool {
        matches!(self, Self::Unconnected | Self::Connected)
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// Per-device state coordinator.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Created detached; a
/// device handle is attached when the strip is first seen.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    address: DeviceAddress,
    store: SnapshotStore,
    lifecycle: watch::Sender<Lifecycle>,
    device: RwLock<Option<Arc<dyn DeviceHandle>>>,
    /// Also serializes attach against shutdown.
    listener: Mutex<Option<ListenerId>>,
    /// Last published version. Held for the whole read-build-publish step.
    publish: Mutex<u64>,
    shutting_down: AtomicBool,
}

impl Coordinator {
    pub fn new(address: DeviceAddress) -> Self {
        let (lifecycle, _) = watch::channel(Lifecycle::Detached);
        Self {
            inner: Arc::new(CoordinatorInner {
                address,
                store: SnapshotStore::new(),
                lifecycle,
                device: RwLock::new(None),
                listener: Mutex::new(None),
                publish: Mutex::new(0),
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.inner.address
    }

    // ── Attachment ───────────────────────────────────────────────

    /// Attach the device handle and subscribe to its change notifications.
    ///
    /// Idempotent: once a handle is attached, later calls are no-ops and
    /// exactly one listener stays registered. Does not publish; call
    /// [`force_refresh`](Self::force_refresh) or wait for a notification.
    pub fn attach(&self, handle: Arc<dyn DeviceHandle>) -> Result<(), CoreError> {
        let inner = &self.inner;
        if handle.address() != &inner.address {
            return Err(CoreError::AddressMismatch {
                expected: inner.address.clone(),
                actual: handle.address().clone(),
            });
        }

        let mut listener = inner.lock_listener();
        if inner.shutting_down.load(Ordering::SeqCst) {
            return Err(CoreError::ShutDown {
                address: inner.address.clone(),
            });
        }
        if inner.read_device().is_some() {
            debug!(address = %inner.address, "device already attached");
            return Ok(());
        }

        *inner.device.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&handle));

        let weak: Weak<CoordinatorInner> = Arc::downgrade(&self.inner);
        *listener = Some(handle.subscribe(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.refresh();
            }
        })));
        drop(listener);

        inner.lifecycle.send_if_modified(|state| {
            if *state == Lifecycle::Detached {
                *state = Lifecycle::Unconnected;
                true
            } else {
                false
            }
        });
        info!(address = %inner.address, "device attached");
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.inner.read_device().is_some()
    }

    /// The attached device handle, if any.
    pub fn device(&self) -> Option<Arc<dyn DeviceHandle>> {
        self.inner.read_device().clone()
    }

    /// The handle to send commands to, or why there is none.
    pub fn command_target(&self) -> Result<Arc<dyn DeviceHandle>, CoreError> {
        if self.inner.shutting_down.load(Ordering::SeqCst) {
            return Err(CoreError::ShutDown {
                address: self.inner.address.clone(),
            });
        }
        self.device().ok_or_else(|| CoreError::NotAttached {
            address: self.inner.address.clone(),
        })
    }

    // ── Publishing ───────────────────────────────────────────────

    /// Entry point for driver change callbacks. Returns the published
    /// snapshot, or `None` once shutdown has begun.
    pub fn on_device_notification(&self) -> Option<Arc<Snapshot>> {
        self.inner.refresh()
    }

    /// Rebuild and publish a snapshot on demand. Works with no device
    /// attached, in which case everything is unknown and unavailable.
    pub fn force_refresh(&self) -> Option<Arc<Snapshot>> {
        self.inner.refresh()
    }

    // ── Observers ────────────────────────────────────────────────

    /// Register a push observer. It receives every snapshot published
    /// after this call returns.
    pub fn register_observer(&self, observer: Arc<dyn Observer>) -> ObserverToken {
        self.inner.store.register(observer)
    }

    /// Remove an observer. After this returns, no new delivery to it
    /// begins. Returns `false` for unknown tokens.
    pub fn unregister_observer(&self, token: ObserverToken) -> bool {
        self.inner.store.unregister(token)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.store.observer_count()
    }

    // ── State observation ────────────────────────────────────────

    /// The latest published snapshot (version 0 before the first publish).
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.store.current()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    /// Subscribe to lifecycle changes.
    pub fn lifecycle(&self) -> watch::Receiver<Lifecycle> {
        self.inner.lifecycle.subscribe()
    }

    pub fn lifecycle_state(&self) -> Lifecycle {
        *self.inner.lifecycle.borrow()
    }

    // ── Shutdown ─────────────────────────────────────────────────

    /// Disconnect the device and stop publishing.
    ///
    /// The first call disconnects (if a handle is attached), removes the
    /// change listener, and moves to [`Lifecycle::Stopped`]. Later calls
    /// return immediately. Disconnect failures are logged, not returned.
    pub async fn shutdown(&self) {
        let inner = &self.inner;
        // Flag swap and device read happen under the listener lock, so an
        // attach either lands before them or sees the flag and bails.
        let (device, listener) = {
            let mut listener = inner.lock_listener();
            if inner.shutting_down.swap(true, Ordering::SeqCst) {
                debug!(address = %inner.address, "shutdown already in progress");
                return;
            }
            (inner.read_device().clone(), listener.take())
        };
        inner.lifecycle.send_replace(Lifecycle::ShuttingDown);
        info!(address = %inner.address, "shutting down");

        // Let a publish that started before the flag flipped finish.
        drop(inner.lock_publish());

        if let Some(device) = device {
            if let Err(e) = device.disconnect().await {
                warn!(address = %inner.address, error = %e, "disconnect failed during shutdown");
            }
            if let Some(id) = listener {
                device.unsubscribe(id);
            }
        }

        inner.lifecycle.send_replace(Lifecycle::Stopped);
        info!(address = %inner.address, "stopped");
    }

    /// Wait until shutdown has fully completed.
    pub async fn stopped(&self) {
        let mut rx = self.lifecycle();
        // Only fails if the sender is dropped, which cannot happen while
        // `self` holds it.
        let _ = rx.wait_for(|state| *state == Lifecycle::Stopped).await;
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("address", &self.inner.address)
            .field("lifecycle", &self.lifecycle_state())
            .field("version", &self.current().version)
            .finish_non_exhaustive()
    }
}

impl CoordinatorInner {
    fn refresh(&self) -> Option<Arc<Snapshot>> {
        if self.shutting_down.load(Ordering::SeqCst) {
            debug!(address = %self.address, "notification ignored during shutdown");
            return None;
        }

        let mut version = self.lock_publish();
        // Shutdown may have started while waiting for the lock.
        if self.shutting_down.load(Ordering::SeqCst) {
            return None;
        }

        let belief = self.read_device().as_ref().map(|d| d.current_belief());
        *version += 1;
        let snapshot = match &belief {
            Some(belief) => Snapshot::from_belief(belief, *version),
            None => Snapshot::unavailable(*version),
        };

        if belief.is_some() {
            self.track_connection(snapshot.connected);
        }

        debug!(
            address = %self.address,
            version = snapshot.version,
            connected = snapshot.connected,
            "publishing snapshot"
        );
        Some(self.store.publish(snapshot))
    }

    fn track_connection(&self, connected: bool) {
        let next = if connected {
            Lifecycle::Connected
        } else {
            Lifecycle::Unconnected
        };
        let changed = self.lifecycle.send_if_modified(|state| {
            if state.is_attached() && *state != next {
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            info!(address = %self.address, state = %next, "connection state changed");
        }
    }

    fn read_device(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<dyn DeviceHandle>>> {
        self.device.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listener(&self) -> MutexGuard<'_, Option<ListenerId>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_publish(&self) -> MutexGuard<'_, u64> {
        self.publish.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::device::{FailurePoint, MemoryDevice};
    use crate::model::{DeviceBelief, Effect};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    const ADDR: &str = "AA:BB:CC:DD:EE:FF";

    fn setup() -> (Coordinator, Arc<MemoryDevice>) {
        let addr = DeviceAddress::new(ADDR);
        let coordinator = Coordinator::new(addr.clone());
        let device = Arc::new(MemoryDevice::new(addr));
        (coordinator, device)
    }

    #[test]
    fn starts_detached_with_placeholder() {
        let (coordinator, _) = setup();
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Detached);
        assert_eq!(coordinator.current().version, 0);
    }

    #[test]
    fn force_refresh_without_device_is_unavailable() {
        let (coordinator, _) = setup();
        let snap = coordinator.force_refresh().unwrap();
        assert_eq!(snap.version, 1);
        assert!(!snap.connected);
        assert_eq!(snap.power, None);
        assert_eq!(snap.brightness, None);
        assert_eq!(snap.effect, Effect::Off);
        assert_eq!(snap.rssi, None);
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Detached);
    }

    #[test]
    fn attach_is_idempotent() {
        let (coordinator, device) = setup();
        coordinator.attach(device.clone()).unwrap();
        coordinator.attach(device.clone()).unwrap();
        assert_eq!(device.listener_count(), 1);
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Unconnected);
    }

    #[test]
    fn attach_rejects_other_address() {
        let (coordinator, _) = setup();
        let stranger = Arc::new(MemoryDevice::new(DeviceAddress::new("00:00:00:00:00:01")));
        let err = coordinator.attach(stranger).unwrap_err();
        assert!(matches!(err, CoreError::AddressMismatch { .. }));
        assert!(!coordinator.is_attached());
    }

    #[test]
    fn notifications_publish_and_track_connection() {
        let (coordinator, device) = setup();
        coordinator.attach(device.clone()).unwrap();

        device.apply(|b| {
            b.power = Some(false);
            b.rssi = Some(-60);
            b.connected = true;
        });

        let snap = coordinator.current();
        assert_eq!(snap.version, 1);
        assert_eq!(snap.power, Some(false));
        assert_eq!(snap.rssi, Some(-60));
        assert!(snap.connected);
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Connected);

        device.set_connected(false);
        assert_eq!(coordinator.current().version, 2);
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Unconnected);
    }

    #[test]
    fn every_observer_sees_same_snapshot() {
        let (coordinator, device) = setup();
        coordinator.attach(device.clone()).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let seen = seen.clone();
            coordinator.register_observer(Arc::new(move |snap: &Arc<Snapshot>| {
                seen.lock().unwrap().push(Arc::clone(snap));
            }));
        }

        device.apply(|b| b.brightness = Some(50));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|s| Arc::ptr_eq(s, &seen[0])));
        assert_eq!(seen[0].brightness, Some(128));
    }

    #[tokio::test]
    async fn shutdown_disconnects_once() {
        let (coordinator, device) = setup();
        coordinator.attach(device.clone()).unwrap();

        coordinator.shutdown().await;
        coordinator.shutdown().await;

        assert_eq!(device.disconnect_count(), 1);
        assert_eq!(device.listener_count(), 0);
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Stopped);
    }

    #[tokio::test]
    async fn shutdown_swallows_disconnect_error() {
        let (coordinator, device) = setup();
        coordinator.attach(device.clone()).unwrap();
        device.fail_next(FailurePoint::Disconnect, "radio gone");

        coordinator.shutdown().await;
        assert_eq!(coordinator.lifecycle_state(), Lifecycle::Stopped);
    }

    #[tokio::test]
    async fn notifications_after_shutdown_are_ignored() {
        let (coordinator, device) = setup();
        coordinator.attach(device.clone()).unwrap();
        device.set_connected(true);
        let before = coordinator.current().version;

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        coordinator.register_observer(Arc::new(move |_: &Arc<Snapshot>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        coordinator.shutdown().await;
        assert!(coordinator.on_device_notification().is_none());
        assert!(coordinator.force_refresh().is_none());
        assert_eq!(coordinator.current().version, before);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stopped_resolves_only_after_shutdown() {
        let (coordinator, device) = setup();
        coordinator.attach(device).unwrap();

        let mut waiter = tokio_test::task::spawn(coordinator.stopped());
        tokio_test::assert_pending!(waiter.poll());

        tokio_test::block_on(coordinator.shutdown());
        assert!(waiter.is_woken());
        tokio_test::assert_ready!(waiter.poll());
    }

    #[test]
    fn attach_racing_shutdown_never_leaks_device() {
        use std::sync::Barrier;
        use std::thread;

        for _ in 0..2_000 {
            let (coordinator, device) = setup();
            let barrier = Arc::new(Barrier::new(2));

            let attacher = {
                let coordinator = coordinator.clone();
                let device = device.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    coordinator.attach(device).is_ok()
                })
            };
            let stopper = {
                let coordinator = coordinator.clone();
                thread::spawn(move || {
                    barrier.wait();
                    tokio_test::block_on(coordinator.shutdown());
                })
            };
            let attached = attacher.join().unwrap();
            stopper.join().unwrap();

            assert_eq!(coordinator.lifecycle_state(), Lifecycle::Stopped);
            if attached {
                assert!(coordinator.is_attached());
                assert_eq!(device.disconnect_count(), 1);
                assert_eq!(device.listener_count(), 0);
            } else {
                assert!(!coordinator.is_attached());
                assert_eq!(device.disconnect_count(), 0);
            }
        }
    }

    #[tokio::test]
    async fn attach_after_shutdown_fails() {
        let (coordinator, device) = setup();
        coordinator.shutdown().await;
        let err = coordinator.attach(device).unwrap_err();
        assert!(matches!(err, CoreError::ShutDown { .. }));
    }

    #[test]
    fn command_target_requires_device() {
        let (coordinator, device) = setup();
        assert!(matches!(
            coordinator.command_target(),
            Err(CoreError::NotAttached { .. })
        ));
        coordinator.attach(device).unwrap();
        assert!(coordinator.command_target().is_ok());
    }

    #[test]
    fn attach_does_not_publish() {
        let addr = DeviceAddress::new(ADDR);
        let coordinator = Coordinator::new(addr.clone());
        let device = Arc::new(MemoryDevice::new(addr).with_belief(DeviceBelief {
            connected: true,
            ..DeviceBelief::default()
        }));
        coordinator.attach(device).unwrap();
        assert_eq!(coordinator.current().version, 0);
        assert!(coordinator.force_refresh().unwrap().connected);
    }
}
