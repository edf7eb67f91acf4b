// ── Integration glue ──
//
// Wires one configured strip to its coordinator and surfaces, and maps
// host lifecycle hooks (device sighted, options changed, application
// stopping, unload) onto the coordinator.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{IntegrationConfig, StripOptions};
use crate::coordinator::Coordinator;
use crate::device::DeviceHandle;
use crate::entity::{LightEntity, SensorEntity};
use crate::error::CoreError;
use crate::store::ObserverToken;

/// A fully set-up strip: coordinator, light, and sensors.
pub struct Integration {
    config: IntegrationConfig,
    coordinator: Coordinator,
    options: Arc<ArcSwap<StripOptions>>,
    light: Arc<LightEntity>,
    sensors: Vec<Arc<SensorEntity>>,
    tokens: Mutex<Vec<ObserverToken>>,
}

impl Integration {
    /// Build the coordinator and every surface, register the surfaces,
    /// then publish an initial snapshot.
    ///
    /// With a handle (the strip was already seen) it is attached first.
    /// Without one, the initial snapshot is the unavailable placeholder
    /// and the strip is attached later through
    /// [`device_sighted`](Self::device_sighted).
    pub fn setup(
        config: IntegrationConfig,
        handle: Option<Arc<dyn DeviceHandle>>,
    ) -> Result<Self, CoreError> {
        if !config.address.is_well_formed() {
            return Err(CoreError::Config {
                message: format!("'{}' is not a BLE address", config.address),
            });
        }
        let coordinator = Coordinator::new(config.address.clone());
        let options = Arc::new(ArcSwap::from_pointee(config.options));

        let light = Arc::new(LightEntity::new(&config, coordinator.clone(), Arc::clone(&options)));
        let sensors = SensorEntity::all(&config, &coordinator.current());

        let mut tokens = Vec::with_capacity(sensors.len() + 1);
        tokens.push(coordinator.register_observer(light.clone()));
        for sensor in &sensors {
            tokens.push(coordinator.register_observer(sensor.clone()));
        }

        if let Some(handle) = handle {
            coordinator.attach(handle)?;
        }
        coordinator.force_refresh();

        info!(
            address = %config.address,
            title = %config.title,
            attached = coordinator.is_attached(),
            "integration set up"
        );

        Ok(Self {
            config,
            coordinator,
            options,
            light,
            sensors,
            tokens: Mutex::new(tokens),
        })
    }

    /// Hot-plug: the strip showed up after setup. Attaches if needed and
    /// republishes.
    pub fn device_sighted(&self, handle: Arc<dyn DeviceHandle>) -> Result<(), CoreError> {
        self.coordinator.attach(handle)?;
        self.coordinator.force_refresh();
        Ok(())
    }

    /// Reload user options. Connection state is untouched.
    pub fn options_changed(&self, options: StripOptions) {
        debug!(
            address = %self.config.address,
            color_correction = options.color_correction,
            "options changed"
        );
        self.options.store(Arc::new(options));
    }

    /// Host is stopping: disconnect the strip.
    pub async fn application_stopping(&self) {
        self.coordinator.shutdown().await;
    }

    /// Shut the coordinator down when `token` is cancelled.
    pub fn stop_on(&self, token: CancellationToken) -> JoinHandle<()> {
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            token.cancelled().await;
            coordinator.shutdown().await;
        })
    }

    /// Detach every surface from the coordinator. Does not disconnect.
    pub fn unload(&self) {
        let tokens: Vec<ObserverToken> = self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for token in tokens {
            self.coordinator.unregister_observer(token);
        }
        info!(address = %self.config.address, "integration unloaded");
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn options(&self) -> StripOptions {
        **self.options.load()
    }

    pub fn light(&self) -> &Arc<LightEntity> {
        &self.light
    }

    pub fn sensors(&self) -> &[Arc<SensorEntity>] {
        &self.sensors
    }

    pub fn sensor(&self, key: &str) -> Option<&Arc<SensorEntity>> {
        self.sensors.iter().find(|s| s.description().key == key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::{DeviceCommand, TurnOnRequest};
    use crate::coordinator::Lifecycle;
    use crate::device::MemoryDevice;
    use crate::model::{DeviceAddress, Rgb};

    fn config() -> IntegrationConfig {
        IntegrationConfig::new(DeviceAddress::new("AA:BB:CC:DD:EE:FF"))
    }

    #[test]
    fn setup_without_device_publishes_unavailable() {
        let integration = Integration::setup(config(), None).unwrap();
        assert_eq!(integration.coordinator().lifecycle_state(), Lifecycle::Detached);
        assert_eq!(integration.coordinator().observer_count(), 3);
        let view = integration.light().view();
        assert_eq!(view.version, 1);
        assert!(!view.available);
    }

    #[test]
    fn setup_rejects_malformed_address() {
        let config = IntegrationConfig::new(DeviceAddress::new("not-a-strip"));
        let err = Integration::setup(config, None).err().unwrap();
        assert!(matches!(err, CoreError::Config { .. }));
        assert!(err.to_string().contains("NOT:A:STRIP"));
    }

    #[test]
    fn device_sighted_attaches_and_refreshes() {
        let config = config();
        let integration = Integration::setup(config.clone(), None).unwrap();
        let device = Arc::new(MemoryDevice::new(config.address.clone()));
        device.set_connected(true);

        integration.device_sighted(device.clone()).unwrap();
        assert_eq!(integration.coordinator().lifecycle_state(), Lifecycle::Connected);
        assert!(integration.light().view().available);

        integration.device_sighted(device.clone()).unwrap();
        assert_eq!(device.listener_count(), 1);
    }

    #[tokio::test]
    async fn options_change_affects_next_command_only() {
        let config = config();
        let device = Arc::new(MemoryDevice::new(config.address.clone()));
        let integration = Integration::setup(config, Some(device.clone())).unwrap();

        integration.options_changed(StripOptions {
            color_correction: false,
        });
        assert!(!integration.options().color_correction);
        assert!(integration.coordinator().is_attached());

        integration
            .light()
            .turn_on(&TurnOnRequest::default().with_color(Rgb::new(0, 0, 255)))
            .await
            .unwrap();
        assert!(device.issued().contains(&DeviceCommand::SetColor {
            color: Rgb::new(0, 0, 255),
            color_correction: false,
        }));
    }

    #[tokio::test]
    async fn stop_on_cancellation_shuts_down() {
        let config = config();
        let device = Arc::new(MemoryDevice::new(config.address.clone()));
        let integration = Integration::setup(config, Some(device.clone())).unwrap();

        let token = CancellationToken::new();
        let task = integration.stop_on(token.clone());
        token.cancel();
        task.await.unwrap();

        assert_eq!(integration.coordinator().lifecycle_state(), Lifecycle::Stopped);
        assert_eq!(device.disconnect_count(), 1);
    }

    #[test]
    fn unload_unregisters_surfaces() {
        let integration = Integration::setup(config(), None).unwrap();
        integration.unload();
        assert_eq!(integration.coordinator().observer_count(), 0);
        integration.coordinator().force_refresh();
        assert_eq!(integration.light().view().version, 1);
    }
}
