// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to the sync or blob store, then
// updates the local FleetStore and appends an audit log entry.

use crate::error::CoreError;
use crate::model::{Firmware, StripId};
use crate::reconciler::{ConfigField, FanoutReport};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the fleet.
#[derive(Debug, Clone)]
pub enum Command {
    /// Apply a single-field edit to every strip a selector resolves to.
    SetField {
        selector: String,
        field: ConfigField,
    },

    /// Apply a single-field edit to one strip by id.
    SetFieldById {
        id: StripId,
        field: ConfigField,
    },

    /// Flip the fleet-wide switch, then fan the flag out to every strip.
    SetAllEnabled(bool),

    /// Delete a strip: its checkin record first, then its config.
    DeleteStrip {
        id: StripId,
    },

    /// Validate and upload a firmware binary, then record its metadata.
    UploadFirmware {
        filename: String,
        bytes: Vec<u8>,
    },

    /// Remove a firmware version's metadata. The blob stays behind --
    /// devices mid-update may still be fetching it.
    DeleteFirmware {
        version: String,
    },

    /// Append a free-form entry to the audit log.
    AppendLog {
        text: String,
    },
}

/// The result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    /// Per-member outcomes of a fan-out write.
    Fanout(FanoutReport),
    /// The firmware record created by an upload.
    Firmware(Firmware),
}
