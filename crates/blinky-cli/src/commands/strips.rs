//! Strip command handlers.

use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::Tabled;

use blinky_core::{
    Command as CoreCommand, CommandResult, ConfigField, Controller, Strip, SyncStatus,
};

use crate::cli::{GlobalOpts, SetArgs, StripsArgs, StripsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StripRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "On")]
    enabled: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn row(strip: &Arc<Strip>, color: bool) -> StripRow {
    // The desired config describes where the strip is headed; fall back
    // to the reported one for checkin-only strips.
    let config = strip.next.as_ref().or(strip.current.as_ref());
    let status = match strip.status() {
        SyncStatus::Settled if color => "settled".green().to_string(),
        SyncStatus::Pending if color => "pending".yellow().to_string(),
        other => other.to_string(),
    };

    StripRow {
        id: strip.id.to_string(),
        name: strip.name().unwrap_or_default().to_owned(),
        group: strip.group().unwrap_or_default().to_owned(),
        mode: config.map(|c| c.mode.to_string()).unwrap_or_default(),
        enabled: config
            .map(|c| if c.enabled { "yes" } else { "no" }.to_owned())
            .unwrap_or_default(),
        status,
        ip: strip
            .last_checkin
            .as_ref()
            .map(|c| c.ip.clone())
            .unwrap_or_default(),
        version: strip
            .last_checkin
            .as_ref()
            .and_then(|c| c.version.clone())
            .unwrap_or_default(),
    }
}

fn detail(strip: &Arc<Strip>) -> String {
    let mut lines = vec![
        format!("ID:      {}", strip.id),
        format!("Name:    {}", strip.name().unwrap_or("-")),
        format!("Group:   {}", strip.group().unwrap_or("-")),
        format!("Status:  {}", strip.status()),
        format!(
            "Desired: {}",
            strip
                .next
                .as_ref()
                .map_or_else(|| "-".into(), blinky_core::StripConfig::summary)
        ),
        format!(
            "Running: {}",
            strip
                .current
                .as_ref()
                .map_or_else(|| "-".into(), blinky_core::StripConfig::summary)
        ),
    ];
    match &strip.last_checkin {
        Some(checkin) => {
            lines.push(format!(
                "Checkin: {} from {} (MAC {}, {} dBm)",
                checkin.timestamp.to_rfc3339(),
                checkin.ip,
                checkin.mac,
                checkin.rssi,
            ));
            if let Some(version) = &checkin.version {
                lines.push(format!("Firmware: {version}"));
            }
        }
        None => lines.push("Checkin: never".into()),
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: StripsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StripsCommand::List { group } => {
            let all = controller.strips_snapshot();
            let strips: Vec<Arc<Strip>> = all
                .iter()
                .filter(|s| {
                    group
                        .as_deref()
                        .is_none_or(|g| s.group().is_some_and(|sg| sg.eq_ignore_ascii_case(g)))
                })
                .cloned()
                .collect();

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &strips,
                |s| row(s, color),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StripsCommand::Show { strip } => {
            let id = util::resolve_strip_id(controller, &strip)?;
            let found = controller
                .strip(&id)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "strip".into(),
                    identifier: strip,
                    list_command: "strips list".into(),
                })?;
            let out =
                output::render_single(&global.output, &found, detail, |s| s.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StripsCommand::Set(set) => {
            let field = field_from_args(&set)?;
            set_field(controller, set.selector, field, global).await
        }

        StripsCommand::Enable { selector } => {
            set_field(controller, selector, ConfigField::Enabled(true), global).await
        }

        StripsCommand::Disable { selector } => {
            set_field(controller, selector, ConfigField::Enabled(false), global).await
        }

        StripsCommand::Delete { strip } => {
            let id = util::resolve_strip_id(controller, &strip)?;
            if !util::confirm(
                &format!("Delete strip '{strip}' and its checkin history?"),
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteStrip { id })
                .await?;
            if !global.quiet {
                eprintln!("Strip deleted");
            }
            Ok(())
        }
    }
}

/// Fan a single-field edit out through a selector.
async fn set_field(
    controller: &Controller,
    selector: String,
    field: ConfigField,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller
        .execute(CoreCommand::SetField { selector, field })
        .await?;
    match result {
        CommandResult::Fanout(report) => util::report_fanout(report, global.quiet),
        _ => Ok(()),
    }
}

/// Turn the one present field flag into a `ConfigField`. Clap's arg
/// group guarantees exactly one is set.
fn field_from_args(args: &SetArgs) -> Result<ConfigField, CliError> {
    if let Some(mode) = &args.mode {
        return Ok(ConfigField::Mode(util::parse_mode(mode)?));
    }
    if let Some(enabled) = args.enabled {
        return Ok(ConfigField::Enabled(enabled));
    }
    if let Some(speed) = args.speed {
        return Ok(ConfigField::Speed(speed));
    }
    if let Some(brightness) = args.brightness {
        return Ok(ConfigField::Brightness(brightness));
    }
    if let Some(rate) = args.color_change {
        return Ok(ConfigField::ColorChange(rate));
    }
    if let Some(n) = args.num_pixels {
        return Ok(ConfigField::NumPixels(n));
    }
    if let Some(v) = args.red {
        return Ok(ConfigField::Red(v));
    }
    if let Some(v) = args.green {
        return Ok(ConfigField::Green(v));
    }
    if let Some(v) = args.blue {
        return Ok(ConfigField::Blue(v));
    }
    if let Some(color) = &args.rgb {
        return Ok(ConfigField::Color(util::parse_color(color)?));
    }
    if let Some(name) = &args.name {
        return Ok(ConfigField::Name(name.clone()));
    }
    if let Some(group) = &args.group {
        return Ok(ConfigField::Group(group.clone()));
    }
    if let Some(version) = &args.firmware {
        return Ok(ConfigField::Version(version.clone()));
    }
    Err(CliError::Validation {
        field: "set".into(),
        reason: "no field flag given".into(),
    })
}
