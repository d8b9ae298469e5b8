//! Audit log command handlers.

use std::sync::Arc;

use tabled::Tabled;

use blinky_core::{Command as CoreCommand, Controller, LogEntry};

use crate::cli::{GlobalOpts, LogArgs, LogCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Actor")]
    actor: String,
    #[tabled(rename = "Text")]
    text: String,
}

impl From<&Arc<LogEntry>> for LogRow {
    fn from(entry: &Arc<LogEntry>) -> Self {
        Self {
            date: entry.date.to_rfc3339(),
            actor: entry.actor.clone(),
            text: entry.text.clone(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: LogArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LogCommand::Tail { limit } => {
            // Push keys sort chronologically, so the tail of the
            // snapshot is the newest slice of the log. Shown newest
            // first, like the dashboard.
            let snap = controller.log_snapshot();
            let start = snap.len().saturating_sub(limit);
            let entries: Vec<Arc<LogEntry>> = snap[start..].iter().rev().cloned().collect();

            let out = output::render_list(&global.output, &entries, |e| LogRow::from(e), |e| {
                format!("{} {} {}", e.date.to_rfc3339(), e.actor, e.text)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LogCommand::Add { text } => {
            controller.execute(CoreCommand::AppendLog { text }).await?;
            if !global.quiet {
                eprintln!("Log entry added");
            }
            Ok(())
        }
    }
}
