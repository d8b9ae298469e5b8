//! Bridges the config file, environment, and CLI flags into a
//! [`FleetConfig`]. Flag overrides always win over the profile.

use std::time::Duration;

use secrecy::SecretString;

use blinky_config::{self as config_file, Config};
use blinky_core::{FleetConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The profile name in effect: `--profile` flag, then the config file's
/// `default_profile`, then "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the fleet configuration from the config file plus CLI overrides.
///
/// Works without any config file as long as `--database` (or
/// `BLINKY_DATABASE`) is given.
pub fn build_fleet_config(global: &GlobalOpts) -> Result<FleetConfig, CliError> {
    let cfg = config_file::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut fleet = if let Some(profile) = cfg.profiles.get(&profile_name) {
        config_file::profile_to_fleet_config(profile, &profile_name)?
    } else if let Some(database) = global.database.as_deref() {
        FleetConfig {
            database_url: parse_url("database", database)?,
            ..FleetConfig::default()
        }
    } else {
        return Err(CliError::NoConfig {
            path: config_file::config_path().display().to_string(),
        });
    };

    if let Some(database) = global.database.as_deref() {
        fleet.database_url = parse_url("database", database)?;
    }
    if let Some(blob) = global.blob.as_deref() {
        fleet.blob_url = Some(parse_url("blob", blob)?);
    }
    if let Some(token) = &global.token {
        fleet.auth_token = Some(SecretString::from(token.clone()));
    }
    if let Some(actor) = &global.actor {
        fleet.actor.clone_from(actor);
    }
    if global.insecure {
        fleet.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        fleet.timeout = Duration::from_secs(timeout);
    }

    // CLI invocations are one-shot; never spin up the periodic refresh.
    fleet.refresh_interval_secs = 0;
    Ok(fleet)
}

fn parse_url(field: &str, value: &str) -> Result<url::Url, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {value}"),
    })
}
