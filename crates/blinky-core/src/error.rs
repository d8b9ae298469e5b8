// ── Core error types ──
//
// User-facing errors from blinky-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<blinky_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

use crate::model::StripId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the sync store at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Not connected to the sync store")]
    Disconnected,

    #[error("Store operation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Resolution errors ────────────────────────────────────────────
    #[error("No such device or group: '{token}'")]
    NoSuchSelector { token: String },

    #[error("Strip not found: {id}")]
    StripNotFound { id: StripId },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Unknown mode: '{name}'")]
    UnknownMode { name: String },

    #[error("Unknown intent: '{name}'")]
    UnknownIntent { name: String },

    #[error("Intent '{intent}' is missing the '{slot}' slot")]
    MissingSlot { intent: String, slot: String },

    // ── Write errors ─────────────────────────────────────────────────
    /// The store rejected a write; message passed through verbatim.
    #[error("Store write failed: {message}")]
    StoreWrite { message: String },

    /// A fan-out write partially failed. Successfully written members
    /// are NOT rolled back; the failed ids are listed here.
    #[error("Write failed for {}: {first_cause}", failed_list(.failed))]
    FanoutFailed {
        failed: Vec<StripId>,
        first_cause: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Firmware errors ──────────────────────────────────────────────
    #[error("'{filename}' is missing the magic version string -- is this a Blinky binary?")]
    MalformedFirmware { filename: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Store error: {message}")]
    Api { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn failed_list(failed: &[StripId]) -> String {
    failed
        .iter()
        .map(StripId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<blinky_api::Error> for CoreError {
    fn from(err: blinky_api::Error) -> Self {
        match err {
            // Timeouts arrive as `Error::Timeout`; a Transport error here
            // is a connection-level or protocol-level failure.
            blinky_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            blinky_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            blinky_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            blinky_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            blinky_api::Error::Store { message, .. } => CoreError::StoreWrite { message },
            blinky_api::Error::Blob { name, message } => CoreError::StoreWrite {
                message: format!("blob '{name}': {message}"),
            },
            blinky_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
