//! Effect-code and brightness conversions.

use serde::Serialize;

use ledstrip_core::model::brightness;
use ledstrip_core::{Effect, EffectCode, code_to_name, name_to_code};

use crate::cli::{BrightnessQuery, ConvertArgs, ConvertCommand, EffectQuery, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Which side of a conversion the user supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Direction {
    Decode,
    Encode,
}

#[derive(Debug, Serialize)]
struct EffectConversion {
    direction: Direction,
    name: String,
    code: Option<EffectCode>,
}

#[derive(Debug, Serialize)]
struct BrightnessConversion {
    direction: Direction,
    native: u8,
    presentation: u8,
}

fn convert_effect(query: &EffectQuery) -> Result<EffectConversion, CliError> {
    if let Some(code) = query.code {
        return Ok(EffectConversion {
            direction: Direction::Decode,
            name: code_to_name(Some(code)).to_owned(),
            code: Some(code),
        });
    }

    let name = query.name.as_deref().unwrap_or_default();
    if Effect::from_name(name).is_none() {
        return Err(CliError::UnknownEffect { name: name.into() });
    }
    Ok(EffectConversion {
        direction: Direction::Encode,
        name: name.into(),
        code: name_to_code(name),
    })
}

fn convert_brightness(query: &BrightnessQuery) -> BrightnessConversion {
    match (query.native, query.presentation) {
        (Some(native), _) => BrightnessConversion {
            direction: Direction::Encode,
            native,
            presentation: brightness::to_presentation(Some(native)).unwrap_or_default(),
        },
        (None, presentation) => {
            let presentation = presentation.unwrap_or_default();
            BrightnessConversion {
                direction: Direction::Decode,
                native: brightness::to_native(presentation),
                presentation,
            }
        }
    }
}

fn code_label(code: Option<EffectCode>) -> String {
    code.map_or_else(|| "none".into(), |c| c.to_string())
}

pub fn handle(args: ConvertArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.command {
        ConvertCommand::Effect(query) => {
            let conversion = convert_effect(&query)?;
            output::render_single(
                &global.output,
                &conversion,
                |c| format!("{} = {}", c.name, code_label(c.code)),
                |c| match c.direction {
                    Direction::Decode => c.name.clone(),
                    Direction::Encode => code_label(c.code),
                },
            )?
        }
        ConvertCommand::Brightness(query) => {
            let conversion = convert_brightness(&query);
            output::render_single(
                &global.output,
                &conversion,
                |c| format!("{}% = {}/255", c.native, c.presentation),
                |c| match c.direction {
                    Direction::Encode => c.presentation.to_string(),
                    Direction::Decode => c.native.to_string(),
                },
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
