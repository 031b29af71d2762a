//! Palette assembly: pick four primaries, resolve polarity, derive text and
//! accents for each primary.
//!
//! Selection strategies:
//! - `Priority` walks `Role::PRIORITY` and keeps the first four distinct
//!   colors. When the extractor reports fewer than four distinct colors the
//!   last one is repeated.
//! - `Roles` takes primary, secondary, tertiary and error verbatim (all four
//!   must be present) and uses the extractor's `on_<role>` colors for text
//!   when it supplies them.

use std::array;

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::color::{Color, Mode, ModeRequest};
use crate::extractor::{ExtractorOutput, Role};

use super::SchemeError;
use super::contrast::generate_text_color;
use super::curve::{PaletteStyle, generate_accents};
use super::descriptor::{PRIMARY_COUNT, PrimaryGroup, ThemeDescriptor};

/// Roles read by the `Roles` strategy, in group order.
const ROLE_GROUPS: [Role; PRIMARY_COUNT] =
    [Role::Primary, Role::Secondary, Role::Tertiary, Role::Error];

/// How primaries are chosen from the extractor's roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Priority,
    Roles,
}

/// A chosen primary plus the text color the extractor supplied for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Picked {
    color: Color,
    text: Option<Color>,
}

/// Build the full descriptor from extractor output.
pub fn assemble(
    output: &ExtractorOutput,
    style: PaletteStyle,
    request: ModeRequest,
    selection: Selection,
) -> Result<ThemeDescriptor, SchemeError> {
    let hint = request.explicit().or_else(|| output.reported_mode());

    let picked = match selection {
        Selection::Priority => select_by_priority(output, hint)?,
        Selection::Roles => select_by_role(output, hint)?,
    };

    let mode = resolve_mode(output, request, picked[0].color)?;
    info!(
        "Assembling {} palette in {} mode from {}",
        style,
        mode,
        picked
            .iter()
            .map(|p| p.color.hex())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let groups = picked.map(|p| PrimaryGroup {
        primary: p.color,
        text: p.text.unwrap_or_else(|| generate_text_color(p.color)),
        accents: generate_accents(p.color, style.curve(), mode),
    });

    Ok(ThemeDescriptor { mode, groups })
}

/// Explicit requests win. `Auto` classifies the extractor's background, then
/// falls back to the extractor's own verdict, then to the first primary.
pub fn resolve_mode(
    output: &ExtractorOutput,
    request: ModeRequest,
    first_primary: Color,
) -> Result<Mode, SchemeError> {
    if let Some(mode) = request.explicit() {
        return Ok(mode);
    }

    let reported = output.reported_mode();
    if let Some(hex) = output
        .colors
        .get(Role::Background)
        .and_then(|v| v.hex(reported))
    {
        let background = Color::from_hex(hex)?;
        debug!("Classifying background {background} for auto mode");
        return Ok(Mode::of(background));
    }

    if let Some(mode) = reported {
        debug!("No background role; using extractor's {mode} verdict");
        return Ok(mode);
    }

    warn!("No background role or mode flag; classifying primary {first_primary}");
    Ok(Mode::of(first_primary))
}

fn select_by_priority(
    output: &ExtractorOutput,
    hint: Option<Mode>,
) -> Result<[Picked; PRIMARY_COUNT], SchemeError> {
    let mut picked: Vec<Picked> = Vec::with_capacity(PRIMARY_COUNT);

    for role in Role::PRIORITY {
        if picked.len() == PRIMARY_COUNT {
            break;
        }
        let Some(hex) = output.colors.get(role).and_then(|v| v.hex(hint)) else {
            continue;
        };
        let color = Color::from_hex(hex)?;
        if picked.iter().any(|p| p.color == color) {
            debug!("Skipping duplicate {} ({color})", role.key());
            continue;
        }
        picked.push(Picked { color, text: None });
    }

    if picked.len() < PRIMARY_COUNT && !picked.is_empty() {
        info!(
            "Only {} distinct colors available; repeating the last one",
            picked.len()
        );
    }
    pad(picked)
}

fn select_by_role(
    output: &ExtractorOutput,
    hint: Option<Mode>,
) -> Result<[Picked; PRIMARY_COUNT], SchemeError> {
    let mut picked = Vec::with_capacity(PRIMARY_COUNT);

    for role in ROLE_GROUPS {
        let hex = output
            .colors
            .get(role)
            .and_then(|v| v.hex(hint))
            .ok_or_else(|| SchemeError::MissingColors(format!("role `{}` missing", role.key())))?;
        let text = output
            .colors
            .on(role)
            .and_then(|v| v.hex(hint))
            .map(Color::from_hex)
            .transpose()?;
        picked.push(Picked {
            color: Color::from_hex(hex)?,
            text,
        });
    }

    pad(picked)
}

/// Fill up to four entries by repeating the last one.
fn pad(picked: Vec<Picked>) -> Result<[Picked; PRIMARY_COUNT], SchemeError> {
    let Some(last) = picked.len().checked_sub(1) else {
        return Err(SchemeError::MissingColors(
            "no usable color roles".to_string(),
        ));
    };
    Ok(array::from_fn(|i| picked[i.min(last)]))
}
