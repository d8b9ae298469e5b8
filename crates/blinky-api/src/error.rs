use thiserror::Error;

/// Top-level error type for the `blinky-api` crate.
///
/// Covers every failure mode across both backends: the sync store REST
/// surface and the firmware blob store. `blinky-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Sync store ──────────────────────────────────────────────────
    /// The store rejected a read or write (permission, validation, ...).
    /// The message is passed through verbatim.
    #[error("Store error at '{path}' (HTTP {status}): {message}")]
    Store {
        path: String,
        status: u16,
        message: String,
    },

    // ── Blob store ──────────────────────────────────────────────────
    /// Blob upload or download failed.
    #[error("Blob store error for '{name}': {message}")]
    Blob { name: String, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify a reqwest failure, surfacing the configured timeout on
    /// deadline hits instead of the opaque transport error.
    pub(crate) fn transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Store { status: 404, .. } => true,
            _ => false,
        }
    }
}
