//! Shared helpers for command handlers.

use std::str::FromStr;

use strum::IntoEnumIterator;

use blinky_core::dispatcher::color_by_name;
use blinky_core::{Controller, FanoutReport, Mode, Rgb, StripId};

use crate::error::CliError;

/// Resolve a strip identifier (id or display name) via snapshot lookup.
/// Names compare case-insensitively, matching voice-intent resolution.
pub fn resolve_strip_id(controller: &Controller, identifier: &str) -> Result<StripId, CliError> {
    let snap = controller.strips_snapshot();
    for strip in snap.iter() {
        let name_matches = strip
            .name()
            .is_some_and(|n| n.eq_ignore_ascii_case(identifier));
        if strip.id.as_str() == identifier || name_matches {
            return Ok(strip.id.clone());
        }
    }
    Err(CliError::NotFound {
        resource_type: "strip".into(),
        identifier: identifier.into(),
        list_command: "strips list".into(),
    })
}

/// Parse an animation mode, listing the valid set on failure.
pub fn parse_mode(value: &str) -> Result<Mode, CliError> {
    Mode::from_str(value).map_err(|_| CliError::Validation {
        field: "mode".into(),
        reason: format!(
            "unknown mode '{value}'. Valid modes: {}",
            Mode::iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}

/// Parse a color given as a name ("red") or an "R,G,B" triple.
pub fn parse_color(value: &str) -> Result<Rgb, CliError> {
    if let Some(rgb) = color_by_name(value) {
        return Ok(rgb);
    }

    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() == 3 {
        let channel = |s: &str| s.parse::<u8>().ok();
        if let (Some(red), Some(green), Some(blue)) =
            (channel(parts[0]), channel(parts[1]), channel(parts[2]))
        {
            return Ok(Rgb { red, green, blue });
        }
    }

    Err(CliError::Validation {
        field: "color".into(),
        reason: format!("'{value}' is neither a known color name nor an R,G,B triple"),
    })
}

/// Print per-member fan-out outcomes, then fail if any member failed.
pub fn report_fanout(report: FanoutReport, quiet: bool) -> Result<(), CliError> {
    if !quiet {
        for outcome in &report.outcomes {
            match &outcome.error {
                None => eprintln!("{}: ok", outcome.id),
                Some(err) => eprintln!("{}: FAILED ({err})", outcome.id),
            }
        }
    }
    report.into_result()?;
    Ok(())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    Ok(confirmed)
}
