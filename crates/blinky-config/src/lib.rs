//! Shared configuration for the Blinky CLI.
//!
//! TOML profiles, store token resolution (env + keyring + plaintext),
//! and translation to `blinky_core::FleetConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use blinky_core::{FleetConfig, TlsVerification};

/// Keyring service name for stored tokens.
const KEYRING_SERVICE: &str = "blinky";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}' in the config file")]
    NoSuchProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named fleet profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named fleet profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Sync store root URL (e.g. "https://team-sidney.firebaseio.com").
    pub database: String,

    /// Blob store root URL for firmware binaries.
    pub blob: Option<String>,

    /// Actor name recorded in log entries. Defaults to the OS username.
    pub actor: Option<String>,

    /// Store auth token (plaintext -- prefer keyring or env).
    pub auth_token: Option<String>,

    /// Environment variable name containing the auth token.
    pub auth_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (self-hosted stores behind self-signed certs).
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "teamsidney", "blinky").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("blinky");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from an explicit path + environment. Split out for tests.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BLINKY_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Pick a profile by explicit name, falling back to `default_profile`.
pub fn select_profile<'a>(
    config: &'a Config,
    name: Option<&str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let profile_name = name
        .map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    config
        .profiles
        .get_key_value(profile_name.as_str())
        .map(|(k, v)| (k.as_str(), v))
        .ok_or(ConfigError::NoSuchProfile {
            profile: profile_name,
        })
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the store auth token for a profile.
///
/// Chain: `BLINKY_TOKEN` env var, the profile's named env var, the
/// system keyring, then plaintext in the config file. A missing token
/// is not an error: the store allows unauthenticated reads.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Ok(val) = std::env::var("BLINKY_TOKEN") {
        return Some(SecretString::from(val));
    }

    if let Some(ref env_name) = profile.auth_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    profile
        .auth_token
        .as_ref()
        .map(|t| SecretString::from(t.clone()))
}

/// Store a token in the system keyring for a profile.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))?;
    entry.set_password(token)?;
    Ok(())
}

/// Remove a profile's token from the system keyring.
pub fn delete_token(profile_name: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))?;
    entry.delete_credential()?;
    Ok(())
}

// ── FleetConfig construction ────────────────────────────────────────

/// Build a `FleetConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_fleet_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<FleetConfig, ConfigError> {
    let database_url: url::Url =
        profile
            .database
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "database".into(),
                reason: format!("invalid URL: {}", profile.database),
            })?;

    let blob_url = profile
        .blob
        .as_ref()
        .map(|b| {
            b.parse().map_err(|_| ConfigError::Validation {
                field: "blob".into(),
                reason: format!("invalid URL: {b}"),
            })
        })
        .transpose()?;

    let auth_token = resolve_token(profile, profile_name);

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let actor = profile
        .actor
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "blinky".into());

    Ok(FleetConfig {
        database_url,
        blob_url,
        auth_token,
        actor,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
        refresh_interval_secs: 0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(database: &str) -> Profile {
        Profile {
            database: database.into(),
            blob: None,
            actor: Some("tester".into()),
            auth_token: None,
            auth_token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[profiles.home]
database = "https://team-sidney.firebaseio.com"
blob = "https://storage.example.com/blinky"
actor = "alice"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        let (name, profile) = select_profile(&config, None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(profile.database, "https://team-sidney.firebaseio.com");
        assert_eq!(profile.actor.as_deref(), Some("alice"));
    }

    #[test]
    fn missing_profile_is_an_error() {
        let config = Config::default();
        let err = select_profile(&config, Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::NoSuchProfile { profile } if profile == "nope"));
    }

    #[test]
    fn invalid_database_url_is_rejected() {
        let err = profile_to_fleet_config(&profile("not a url"), "home").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "database"));
    }

    #[test]
    fn fleet_config_carries_profile_settings() {
        let mut p = profile("https://store.example.com");
        p.timeout = Some(5);
        p.insecure = Some(true);

        let fleet = profile_to_fleet_config(&p, "home").unwrap();
        assert_eq!(fleet.database_url.as_str(), "https://store.example.com/");
        assert_eq!(fleet.actor, "tester");
        assert_eq!(fleet.timeout, Duration::from_secs(5));
        assert_eq!(fleet.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn config_round_trips_through_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config
            .profiles
            .insert("home".into(), profile("https://store.example.com"));
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert!(loaded.profiles.contains_key("home"));
    }
}
