// ── Light surface ──

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::debug;

use crate::command::{TurnOnRequest, execute_plan, plan_turn_off, plan_turn_on};
use crate::config::{IntegrationConfig, StripOptions};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::{Effect, Rgb, Snapshot};
use crate::store::Observer;

use super::{EntityIdentity, entity_identity};

pub const LIGHT_KEY: &str = "lights";

/// What the light control currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightView {
    pub version: u64,
    pub available: bool,
    pub is_on: Option<bool>,
    /// Presentation brightness, 0..=255.
    pub brightness: Option<u8>,
    pub color: Option<Rgb>,
    pub effect: Effect,
}

impl LightView {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version,
            available: snapshot.is_available(),
            is_on: snapshot.power,
            brightness: snapshot.brightness,
            color: snapshot.color,
            effect: snapshot.effect,
        }
    }
}

/// RGB light control with effect selection.
pub struct LightEntity {
    identity: EntityIdentity,
    coordinator: Coordinator,
    options: Arc<ArcSwap<StripOptions>>,
    view: ArcSwap<LightView>,
}

impl LightEntity {
    pub fn new(
        config: &IntegrationConfig,
        coordinator: Coordinator,
        options: Arc<ArcSwap<StripOptions>>,
    ) -> Self {
        let view = LightView::from_snapshot(&coordinator.current());
        Self {
            identity: entity_identity(config, LIGHT_KEY),
            coordinator,
            options,
            view: ArcSwap::from_pointee(view),
        }
    }

    pub fn identity(&self) -> &EntityIdentity {
        &self.identity
    }

    pub fn view(&self) -> Arc<LightView> {
        self.view.load_full()
    }

    /// Selectable effect names, `off` first.
    pub fn effect_list() -> Vec<&'static str> {
        Effect::all().map(Effect::name).collect()
    }

    /// Turn the strip on, applying any requested attributes in order.
    /// The rendered view only changes once the device confirms.
    pub async fn turn_on(&self, request: &TurnOnRequest) -> Result<(), CoreError> {
        let handle = self.coordinator.command_target()?;
        let options = **self.options.load();
        let plan = plan_turn_on(self.view().is_on, request, &options);
        debug!(
            unique_id = %self.identity.unique_id,
            commands = plan.len(),
            "turning light on"
        );
        execute_plan(handle.as_ref(), &plan).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        let handle = self.coordinator.command_target()?;
        debug!(unique_id = %self.identity.unique_id, "turning light off");
        execute_plan(handle.as_ref(), &plan_turn_off()).await
    }
}

impl Observer for LightEntity {
    fn on_snapshot_updated(&self, snapshot: &Arc<Snapshot>) {
        self.view.store(Arc::new(LightView::from_snapshot(snapshot)));
    }
}
