// ── Domain model ──

mod config;
mod firmware;
mod log;
mod strip;

pub use config::{Mode, Rgb, StripConfig};
pub use firmware::Firmware;
pub use log::LogEntry;
pub use strip::{Checkin, Strip, StripId, SyncStatus};

use serde::{Deserialize, Serialize};

/// Fleet-wide switches. Independent of every strip's own `enabled` flag:
/// this is the "mute the whole fleet" control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Globals {
    pub all_enabled: bool,
}
