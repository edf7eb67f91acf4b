//! Scripted session against an in-memory strip.
//!
//! Drives the full integration (setup, optional hot-plug, connection,
//! light commands, stop) and reports every snapshot the coordinator
//! published along with the commands the strip received.

use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ledstrip_core::model::{AddressParseError, ColorParseError};
use ledstrip_core::{
    CoreError, DeviceAddress, DeviceCommand, DeviceHandle, Integration, IntegrationConfig,
    Lifecycle, MemoryDevice, Rgb, Snapshot, StripOptions, TurnOnRequest, code_to_name,
};

use crate::cli::{GlobalOpts, SimulateArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Address used when neither `--address` nor a profile names a strip.
const DEMO_ADDRESS: &str = "C0:FF:EE:00:00:01";

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Step {
    action: String,
    outcome: String,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    address: DeviceAddress,
    title: String,
    color_correction: bool,
    steps: Vec<Step>,
    snapshots: Vec<Arc<Snapshot>>,
    commands: Vec<DeviceCommand>,
    lifecycle: Lifecycle,
    disconnects: usize,
}

// ── Table rows ──────────────────────────────────────────────────────

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "Step")]
    action: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

impl From<&Step> for StepRow {
    fn from(s: &Step) -> Self {
        Self {
            action: s.action.clone(),
            outcome: s.outcome.clone(),
        }
    }
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Version")]
    version: u64,
    #[tabled(rename = "Connected")]
    connected: &'static str,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Effect")]
    effect: String,
    #[tabled(rename = "RSSI")]
    rssi: String,
}

impl From<&Snapshot> for SnapshotRow {
    fn from(s: &Snapshot) -> Self {
        Self {
            version: s.version,
            connected: if s.connected { "yes" } else { "no" },
            power: or_dash(s.power.map(|on| if on { "on" } else { "off" })),
            brightness: or_dash(s.brightness),
            color: or_dash(s.color),
            effect: s.effect.to_string(),
            rssi: or_dash(s.rssi),
        }
    }
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Command")]
    operation: &'static str,
    #[tabled(rename = "Args")]
    args: String,
}

fn describe(command: &DeviceCommand) -> String {
    match command {
        DeviceCommand::SetPower(on) => (if *on { "on" } else { "off" }).into(),
        DeviceCommand::SetBrightness(percent) => format!("{percent}%"),
        DeviceCommand::SetColor {
            color,
            color_correction,
        } => {
            if *color_correction {
                format!("{color} (corrected)")
            } else {
                color.to_string()
            }
        }
        DeviceCommand::SetEffect(code) => format!("{code} ({})", code_to_name(Some(*code))),
    }
}

fn render_detail(report: &SimulationReport) -> String {
    let steps: Vec<StepRow> = report.steps.iter().map(StepRow::from).collect();
    let snapshots: Vec<SnapshotRow> = report
        .snapshots
        .iter()
        .map(|s| SnapshotRow::from(s.as_ref()))
        .collect();
    let commands: Vec<CommandRow> = report
        .commands
        .iter()
        .enumerate()
        .map(|(i, c)| CommandRow {
            index: i + 1,
            operation: c.operation(),
            args: describe(c),
        })
        .collect();

    format!(
        "{} ({})\n\n{}\n\nSnapshots\n{}\n\nCommands\n{}\n\nLifecycle: {}, disconnects: {}",
        report.title,
        report.address,
        output::render_table(&steps),
        output::render_table(&snapshots),
        output::render_table(&commands),
        report.lifecycle,
        report.disconnects,
    )
}

// ── Session ─────────────────────────────────────────────────────────

fn resolve_config(args: &SimulateArgs, global: &GlobalOpts) -> Result<IntegrationConfig, CliError> {
    if let Some(raw) = &args.address {
        let address: DeviceAddress = raw
            .parse()
            .map_err(|e: AddressParseError| CliError::Validation {
                field: "address".into(),
                reason: e.to_string(),
            })?;
        return Ok(IntegrationConfig::new(address));
    }

    let cfg = config::load_config(global)?;
    Ok(config::resolve_integration(global, &cfg)?
        .unwrap_or_else(|| IntegrationConfig::new(DeviceAddress::new(DEMO_ADDRESS))))
}

fn first_request(args: &SimulateArgs) -> Result<TurnOnRequest, CliError> {
    let mut request = TurnOnRequest::default().with_brightness(args.brightness);
    if let Some(raw) = &args.rgb {
        let color: Rgb = raw
            .parse()
            .map_err(|e: ColorParseError| CliError::Validation {
                field: "rgb".into(),
                reason: e.to_string(),
            })?;
        request = request.with_color(color);
    }
    Ok(request)
}

fn outcome(result: Result<(), CoreError>) -> String {
    match result {
        Ok(()) => "ok".into(),
        Err(e) => format!("rejected: {e}"),
    }
}

async fn run_session(
    args: &SimulateArgs,
    config: IntegrationConfig,
) -> Result<SimulationReport, CliError> {
    let request = first_request(args)?;
    let device = Arc::new(
        MemoryDevice::new(config.address.clone())
            .with_disconnect_delay(Duration::from_millis(args.disconnect_delay_ms)),
    );
    let handle: Arc<dyn DeviceHandle> = device.clone();
    let mut steps = Vec::new();
    let step = |steps: &mut Vec<Step>, action: String, outcome: String| {
        steps.push(Step { action, outcome });
    };

    let integration = Integration::setup(config, (!args.absent).then(|| Arc::clone(&handle)))?;
    let coordinator = integration.coordinator().clone();
    step(
        &mut steps,
        "setup".into(),
        (if args.absent { "strip absent" } else { "strip attached" }).into(),
    );

    let recorded = Arc::new(Mutex::new(vec![coordinator.current()]));
    let sink = Arc::clone(&recorded);
    let recorder = coordinator.register_observer(Arc::new(move |snap: &Arc<Snapshot>| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(snap));
    }));

    let light = Arc::clone(integration.light());

    if args.absent {
        let early = light.turn_on(&request).await;
        step(&mut steps, "turn on before sighting".into(), outcome(early));
        integration.device_sighted(Arc::clone(&handle))?;
        step(&mut steps, "strip sighted".into(), "ok".into());
    }

    device.set_connected(true);
    step(&mut steps, "connect".into(), "ok".into());
    device.report_rssi(args.rssi);
    step(&mut steps, format!("rssi {} dBm", args.rssi), "ok".into());

    if args.no_color_correction {
        integration.options_changed(StripOptions {
            color_correction: false,
        });
        step(&mut steps, "colour correction off".into(), "ok".into());
    }

    let result = light.turn_on(&request).await;
    step(&mut steps, "turn on".into(), outcome(result));

    for name in &args.effects {
        let result = light
            .turn_on(&TurnOnRequest::default().with_effect(name.clone()))
            .await;
        let shown = light.view().effect;
        let outcome = match result {
            Ok(()) if shown.name() == name.as_str() => "ok".into(),
            Ok(()) => format!("unknown, fell back to white ({shown})"),
            Err(e) => format!("rejected: {e}"),
        };
        step(&mut steps, format!("effect {name}"), outcome);
    }

    let result = light.turn_off().await;
    step(&mut steps, "turn off".into(), outcome(result));

    let token = CancellationToken::new();
    let stopper = integration.stop_on(token.clone());
    token.cancel();
    stopper.await.map_err(|e| CliError::CommandFailed {
        operation: "shutdown".into(),
        reason: e.to_string(),
    })?;
    coordinator.stopped().await;
    step(&mut steps, "stop".into(), "ok".into());

    let late = light.turn_on(&request).await;
    step(&mut steps, "turn on after stop".into(), outcome(late));

    coordinator.unregister_observer(recorder);
    integration.unload();

    let snapshots = recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    Ok(SimulationReport {
        address: integration.config().address.clone(),
        title: integration.config().title.clone(),
        color_correction: integration.options().color_correction,
        steps,
        snapshots,
        commands: device.issued(),
        lifecycle: coordinator.lifecycle_state(),
        disconnects: device.disconnect_count(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: SimulateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = resolve_config(&args, global)?;
    info!(address = %config.address, absent = args.absent, "starting simulation");

    let report = run_session(&args, config).await?;
    info!(
        snapshots = report.snapshots.len(),
        commands = report.commands.len(),
        "simulation finished"
    );

    let out = output::render_single(&global.output, &report, render_detail, |r| {
        r.snapshots
            .iter()
            .map(|s| s.version.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ledstrip_core::Effect;

    fn args() -> SimulateArgs {
        SimulateArgs {
            address: Some(DEMO_ADDRESS.into()),
            absent: false,
            effects: vec!["blink_red".into(), "disco".into()],
            brightness: 128,
            rgb: Some("#ff8000".into()),
            rssi: -61,
            no_color_correction: false,
            disconnect_delay_ms: 0,
        }
    }

    fn config() -> IntegrationConfig {
        IntegrationConfig::new(DeviceAddress::new(DEMO_ADDRESS))
    }

    #[tokio::test]
    async fn session_publishes_in_order_and_stops() {
        let report = run_session(&args(), config()).await.unwrap();

        let versions: Vec<u64> = report.snapshots.iter().map(|s| s.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(report.lifecycle, Lifecycle::Stopped);
        assert_eq!(report.disconnects, 1);

        let last = report.snapshots.last().unwrap();
        assert_eq!(last.power, Some(false));
        assert_eq!(last.rssi, Some(-61));
    }

    #[tokio::test]
    async fn session_issues_expected_commands() {
        let report = run_session(&args(), config()).await.unwrap();
        assert_eq!(
            report.commands,
            vec![
                DeviceCommand::SetPower(true),
                DeviceCommand::SetBrightness(50),
                DeviceCommand::SetColor {
                    color: Rgb::new(255, 128, 0),
                    color_correction: true,
                },
                DeviceCommand::SetEffect(Effect::BlinkRed.code().unwrap()),
                DeviceCommand::SetColor {
                    color: Rgb::WHITE,
                    color_correction: true,
                },
                DeviceCommand::SetPower(false),
            ]
        );
    }

    #[tokio::test]
    async fn absent_strip_rejects_until_sighted() {
        let mut args = args();
        args.absent = true;
        let report = run_session(&args, config()).await.unwrap();

        assert!(!report.snapshots[0].connected);
        assert!(report.steps[1].outcome.starts_with("rejected"));
        assert!(report.steps.last().unwrap().outcome.starts_with("rejected"));
    }

    #[tokio::test]
    async fn options_change_reaches_colour_commands() {
        let mut args = args();
        args.no_color_correction = true;
        let report = run_session(&args, config()).await.unwrap();

        assert!(!report.color_correction);
        assert!(report.commands.iter().all(|c| !matches!(
            c,
            DeviceCommand::SetColor {
                color_correction: true,
                ..
            }
        )));
    }

    #[test]
    fn bad_colour_is_a_validation_error() {
        let mut args = args();
        args.rgb = Some("chartreuse".into());
        assert!(match first_request(&args) {
            Err(CliError::Validation { ref field, .. }) if field == "rgb" => true,
            _ => false,
        });
    }
}
