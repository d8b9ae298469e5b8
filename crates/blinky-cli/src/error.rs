//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use blinky_config::ConfigError;
use blinky_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the sync store at {url}")]
    #[diagnostic(
        code(blinky::connection_failed),
        help(
            "Check that the store URL is correct and reachable.\n\
             URL: {url}\n\
             Try: blinky fleet status -v"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("The store rejected the write")]
    #[diagnostic(
        code(blinky::auth_failed),
        help(
            "Writes need a valid auth token.\n\
             Store one with: blinky config set-token --profile {profile}\n\
             Or set the BLINKY_TOKEN environment variable."
        )
    )]
    AuthFailed { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(blinky::not_found),
        help("Run: blinky {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Writes ───────────────────────────────────────────────────────

    #[error("Write failed for {failed}: {cause}")]
    #[diagnostic(
        code(blinky::partial_write),
        help(
            "Fan-out writes are not transactional: members not listed here\n\
             were written and stay written. Re-run to retry the failures."
        )
    )]
    PartialWrite { failed: String, cause: String },

    #[error("Store write failed: {message}")]
    #[diagnostic(code(blinky::store_error))]
    StoreError { message: String },

    // ── Firmware ─────────────────────────────────────────────────────

    #[error("'{filename}' does not look like a Blinky firmware binary")]
    #[diagnostic(
        code(blinky::malformed_firmware),
        help(
            "Blinky binaries embed a magic version marker at build time.\n\
             Nothing was uploaded. Check that you picked the right file."
        )
    )]
    MalformedFirmware { filename: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(blinky::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(blinky::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: blinky config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(blinky::no_config),
        help(
            "Create one with: blinky config init\n\
             Or pass the store URL directly: --database <URL>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(blinky::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(blinky::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(blinky::timeout),
        help("Increase timeout with --timeout or check store responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(blinky::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::MalformedFirmware { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Disconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                source: "The fleet connection was lost".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NoSuchSelector { token } => CliError::NotFound {
                resource_type: "strip or group".into(),
                identifier: token,
                list_command: "strips list".into(),
            },

            CoreError::StripNotFound { id } => CliError::NotFound {
                resource_type: "strip".into(),
                identifier: id.to_string(),
                list_command: "strips list".into(),
            },

            CoreError::UnknownMode { name } => CliError::Validation {
                field: "mode".into(),
                reason: format!("unknown mode '{name}'"),
            },

            CoreError::UnknownIntent { name } => CliError::Validation {
                field: "intent".into(),
                reason: format!("unknown intent '{name}'"),
            },

            CoreError::MissingSlot { intent, slot } => CliError::Validation {
                field: "slot".into(),
                reason: format!("intent '{intent}' needs the '{slot}' slot"),
            },

            // The store answers unauthorized writes with a permission
            // message rather than an HTTP auth challenge.
            CoreError::StoreWrite { message } => {
                if message.to_lowercase().contains("permission") {
                    CliError::AuthFailed {
                        profile: "current".into(),
                    }
                } else {
                    CliError::StoreError { message }
                }
            }

            CoreError::FanoutFailed {
                failed,
                first_cause,
            } => CliError::PartialWrite {
                failed: failed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                cause: first_cause,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::MalformedFirmware { filename } => {
                CliError::MalformedFirmware { filename }
            }

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Api { message } => CliError::StoreError { message },

            CoreError::Internal(message) => CliError::StoreError { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },

            ConfigError::NoSuchProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(run: blinky config profiles)".into(),
            },

            ConfigError::Io(e) => CliError::Io(e),

            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
