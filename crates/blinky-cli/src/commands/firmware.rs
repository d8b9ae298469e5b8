//! Firmware command handlers.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use blinky_core::{Command as CoreCommand, CommandResult, Controller, Firmware};

use crate::cli::{FirmwareArgs, FirmwareCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FirmwareRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Uploaded")]
    uploaded: String,
    #[tabled(rename = "Filename")]
    filename: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Arc<Firmware>> for FirmwareRow {
    fn from(fw: &Arc<Firmware>) -> Self {
        Self {
            version: fw.version.clone(),
            uploaded: fw.date_uploaded.to_rfc3339(),
            filename: fw.filename.clone(),
            url: fw.url.to_string(),
        }
    }
}

fn detail(fw: &Firmware) -> String {
    [
        format!("Version:  {}", fw.version),
        format!("Uploaded: {}", fw.date_uploaded.to_rfc3339()),
        format!("Filename: {}", fw.filename),
        format!("URL:      {}", fw.url),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: FirmwareArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FirmwareCommand::List => {
            let snap = controller.firmware_snapshot();
            let out = output::render_list(
                &global.output,
                &snap,
                |fw| FirmwareRow::from(fw),
                |fw| fw.version.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FirmwareCommand::Upload { file, name } => {
            let filename = match name {
                Some(n) => n,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| CliError::Validation {
                        field: "file".into(),
                        reason: format!("'{}' has no filename", file.display()),
                    })?,
            };
            let bytes = tokio::fs::read(&file).await?;

            let spinner = upload_spinner(global.quiet, &filename);
            let result = controller
                .execute(CoreCommand::UploadFirmware { filename, bytes })
                .await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            if let CommandResult::Firmware(fw) = result? {
                let out =
                    output::render_single(&global.output, &fw, detail, |fw| fw.version.clone());
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        FirmwareCommand::Delete { version } => {
            if !util::confirm(&format!("Delete firmware '{version}'?"), global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteFirmware { version })
                .await?;
            if !global.quiet {
                eprintln!("Firmware deleted");
            }
            Ok(())
        }
    }
}

fn upload_spinner(quiet: bool, filename: &str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("uploading {filename}"));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}
