//! Fleet-wide command handlers.

use serde::Serialize;

use blinky_core::{Command as CoreCommand, CommandResult, Controller, SyncStatus};

use crate::cli::{FleetArgs, FleetCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct FleetStatus {
    all_enabled: bool,
    strips: usize,
    settled: usize,
    pending: usize,
    last_refresh: Option<String>,
}

fn status_detail(status: &FleetStatus) -> String {
    [
        format!(
            "Global switch: {}",
            if status.all_enabled { "on" } else { "off" }
        ),
        format!("Strips:        {}", status.strips),
        format!("Settled:       {}", status.settled),
        format!("Pending:       {}", status.pending),
        format!(
            "Refreshed:     {}",
            status.last_refresh.as_deref().unwrap_or("never")
        ),
    ]
    .join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: FleetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FleetCommand::EnableAll => set_all(controller, true, global).await,
        FleetCommand::DisableAll => set_all(controller, false, global).await,

        FleetCommand::Status => {
            let strips = controller.strips_snapshot();
            let settled = strips
                .iter()
                .filter(|s| s.status() == SyncStatus::Settled)
                .count();

            let status = FleetStatus {
                all_enabled: controller.globals().all_enabled,
                strips: strips.len(),
                settled,
                pending: strips.len() - settled,
                last_refresh: controller
                    .store()
                    .last_refresh()
                    .map(|t| t.to_rfc3339()),
            };

            let out = output::render_single(&global.output, &status, status_detail, |s| {
                format!("all_enabled={}", s.all_enabled)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn set_all(
    controller: &Controller,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller
        .execute(CoreCommand::SetAllEnabled(enabled))
        .await?;
    if let CommandResult::Fanout(report) = result {
        util::report_fanout(report, global.quiet)?;
    }
    if !global.quiet {
        let state = if enabled { "enabled" } else { "disabled" };
        eprintln!("Fleet {state}");
    }
    Ok(())
}
