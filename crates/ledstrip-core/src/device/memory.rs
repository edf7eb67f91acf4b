// ── In-memory device ──
//
// A `DeviceHandle` with no radio behind it. Commands mutate the belief
// directly and fire listeners synchronously, the way a driver would after
// the strip acknowledged a write. Tests and the CLI simulator drive it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use strum::{Display, IntoStaticStr};
use tracing::debug;

use super::{ChangeListener, DeviceError, DeviceHandle, ListenerId};
use crate::command::DeviceCommand;
use crate::model::{DeviceAddress, DeviceBelief, EffectCode, Rgb, brightness};

/// Operation that can be made to fail once with [`MemoryDevice::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailurePoint {
    SetPower,
    SetBrightness,
    SetColor,
    SetEffect,
    Disconnect,
}

#[derive(Default)]
struct MemoryState {
    belief: DeviceBelief,
    listeners: Vec<(ListenerId, ChangeListener)>,
    journal: Vec<DeviceCommand>,
    failures: HashMap<FailurePoint, String>,
}

pub struct MemoryDevice {
    address: DeviceAddress,
    state: Mutex<MemoryState>,
    next_listener: AtomicU64,
    disconnects: AtomicUsize,
    disconnect_delay: Option<Duration>,
}

impl MemoryDevice {
    pub fn new(address: DeviceAddress) -> Self {
        Self {
            address,
            state: Mutex::new(MemoryState::default()),
            next_listener: AtomicU64::new(1),
            disconnects: AtomicUsize::new(0),
            disconnect_delay: None,
        }
    }

    /// Start from a known belief instead of all-unknown.
    #[must_use]
    pub fn with_belief(self, belief: DeviceBelief) -> Self {
        self.lock().belief = belief;
        self
    }

    /// Make `disconnect()` take this long before it completes.
    #[must_use]
    pub fn with_disconnect_delay(mut self, delay: Duration) -> Self {
        self.disconnect_delay = Some(delay);
        self
    }

    /// Mutate the belief as if a BLE notification arrived, then notify
    /// every listener.
    pub fn apply(&self, update: impl FnOnce(&mut DeviceBelief)) {
        update(&mut self.lock().belief);
        self.notify();
    }

    /// Mark the link up or down.
    pub fn set_connected(&self, connected: bool) {
        self.apply(|b| b.connected = connected);
    }

    /// Report a fresh signal-strength reading.
    pub fn report_rssi(&self, rssi: i16) {
        self.apply(|b| b.rssi = Some(rssi));
    }

    /// The next call to `point` fails with [`DeviceError::Rejected`].
    pub fn fail_next(&self, point: FailurePoint, reason: impl Into<String>) {
        self.lock().failures.insert(point, reason.into());
    }

    /// Commands issued so far, oldest first.
    pub fn issued(&self) -> Vec<DeviceCommand> {
        self.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// How many times `disconnect()` was called, failed calls included.
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self, point: FailurePoint) -> Result<(), DeviceError> {
        match self.lock().failures.remove(&point) {
            Some(reason) => Err(DeviceError::Rejected {
                operation: point.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Record the command, apply its effect on the belief, then notify.
    fn execute(
        &self,
        point: FailurePoint,
        command: DeviceCommand,
        update: impl FnOnce(&mut DeviceBelief),
    ) -> Result<(), DeviceError> {
        self.take_failure(point)?;
        {
            let mut state = self.lock();
            state.journal.push(command);
            update(&mut state.belief);
        }
        debug!(address = %self.address, operation = %point, "memory device command applied");
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        // Listeners read the belief back, so the lock must be released first.
        let listeners: Vec<ChangeListener> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

#[async_trait]
impl DeviceHandle for MemoryDevice {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn current_belief(&self) -> DeviceBelief {
        self.lock().belief.clone()
    }

    async fn set_power(&self, on: bool) -> Result<(), DeviceError> {
        self.execute(FailurePoint::SetPower, DeviceCommand::SetPower(on), |b| {
            b.power = Some(on);
        })
    }

    async fn set_brightness(&self, percent: u8) -> Result<(), DeviceError> {
        let percent = percent.min(brightness::NATIVE_MAX);
        self.execute(
            FailurePoint::SetBrightness,
            DeviceCommand::SetBrightness(percent),
            |b| b.brightness = Some(percent),
        )
    }

    async fn set_color(&self, color: Rgb, color_correction: bool) -> Result<(), DeviceError> {
        self.execute(
            FailurePoint::SetColor,
            DeviceCommand::SetColor {
                color,
                color_correction,
            },
            |b| {
                // A solid colour replaces any running effect.
                b.color = Some(color);
                b.effect = None;
            },
        )
    }

    async fn set_effect(&self, code: EffectCode) -> Result<(), DeviceError> {
        self.execute(FailurePoint::SetEffect, DeviceCommand::SetEffect(code), |b| {
            b.effect = Some(code);
        })
    }

    async fn disconnect(&self) -> Result<(), DeviceError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.disconnect_delay {
            tokio::time::sleep(delay).await;
        }
        self.take_failure(FailurePoint::Disconnect)?;
        self.apply(|b| b.connected = false);
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId::new(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock().listeners.push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.lock().listeners.retain(|(lid, _)| *lid != id);
    }
}
