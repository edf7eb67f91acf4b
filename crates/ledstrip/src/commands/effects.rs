//! Effect table listing.

use serde::Serialize;
use tabled::Tabled;

use ledstrip_core::{Effect, EffectCode};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct EffectEntry {
    position: u8,
    name: &'static str,
    code: Option<EffectCode>,
}

impl From<Effect> for EffectEntry {
    fn from(effect: Effect) -> Self {
        Self {
            position: effect.position(),
            name: effect.name(),
            code: effect.code(),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EffectRow {
    #[tabled(rename = "#")]
    position: u8,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Code")]
    code: String,
}

impl From<&EffectEntry> for EffectRow {
    fn from(e: &EffectEntry) -> Self {
        Self {
            position: e.position,
            name: e.name,
            code: e.code.map_or_else(|| "-".into(), |c| c.to_string()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<EffectEntry> = Effect::all().map(EffectEntry::from).collect();
    let out = output::render_list(
        &global.output,
        &entries,
        |e| EffectRow::from(e),
        |e| e.name.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
