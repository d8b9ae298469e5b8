// ── Runtime connection configuration ──
//
// These types describe *how* to reach the sync and blob stores. They
// carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `FleetConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// System CA store (strict). Default: the stores live behind real certs.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-hosted stores behind self-signed certs).
    DangerAcceptInvalid,
}

impl PartialEq for TlsVerification {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SystemDefaults, Self::SystemDefaults) => true,
            (Self::CustomCa(a), Self::CustomCa(b)) => a == b,
            (Self::DangerAcceptInvalid, Self::DangerAcceptInvalid) => true,
            _ => false,
        }
    }
}

impl Eq for TlsVerification {}

/// Configuration for connecting to one fleet.
///
/// Built by the CLI, passed to `Controller` -- core never reads config
/// files.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Sync store root URL (e.g. `https://team-sidney.firebaseio.com`).
    pub database_url: Url,
    /// Blob store root URL for firmware binaries. Optional: everything
    /// except firmware upload/download works without it.
    pub blob_url: Option<Url>,
    /// Store auth token, attached to every request when present.
    pub auth_token: Option<SecretString>,
    /// Actor name recorded in log entries.
    pub actor: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            database_url: Url::parse("https://team-sidney.firebaseio.com")
                .expect("static URL parses"),
            blob_url: None,
            auth_token: None,
            actor: "blinky".into(),
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
            refresh_interval_secs: 300,
        }
    }
}
