// ledstrip-core: State coordination between a BLE LED strip driver and
// the surfaces that display and control it.
//
// - `model`: effect codec, brightness rescaling, device belief, snapshot
// - `device`: the driver contract and an in-memory device
// - `coordinator`: attach/shutdown lifecycle and snapshot publishing
// - `entity`: light and sensor surfaces
// - `integration`: host lifecycle glue for one configured strip

pub mod command;
pub mod config;
pub mod coordinator;
pub mod device;
pub mod entity;
pub mod error;
pub mod integration;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{DeviceCommand, TurnOnRequest};
pub use config::{IntegrationConfig, StripOptions};
pub use coordinator::{Coordinator, Lifecycle};
pub use device::{DeviceError, DeviceHandle, MemoryDevice};
pub use entity::{LightEntity, SensorEntity};
pub use error::CoreError;
pub use integration::Integration;
pub use store::{Observer, ObserverToken};
pub use stream::SnapshotStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DeviceAddress, DeviceBelief, Effect, EffectCode, Rgb, Snapshot, code_to_name, name_to_code,
};
