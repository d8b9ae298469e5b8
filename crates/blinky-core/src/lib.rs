// blinky-core: Reactive fleet layer between blinky-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod reconciler;
pub mod resolver;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{FleetConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use dispatcher::{Intent, IntentRequest};
pub use error::CoreError;
pub use reconciler::{ConfigField, FanoutOutcome, FanoutReport};
pub use resolver::{Resolution, resolve};
pub use store::FleetStore;
pub use stream::EntityStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Checkin, Firmware, Globals, LogEntry, Mode, Rgb, Strip, StripConfig, StripId, SyncStatus,
};
