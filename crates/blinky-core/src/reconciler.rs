// ── Config reconciliation ──
//
// Field edits are read-modify-write against whole config records: fetch
// the desired config (falling back to the device's reported config, then
// to defaults), change exactly the named field, validate, and write the
// whole record back. Untouched fields always survive an edit.

use futures::future::join_all;
use tracing::{debug, warn};

use blinky_api::SyncClient;
use blinky_api::types::{ConfigRecord, LogRecord};

use crate::error::CoreError;
use crate::model::{Mode, Rgb, StripConfig, StripId};
use crate::resolver::{Resolution, resolve};
use crate::store::FleetStore;

/// A single-field edit to a strip configuration.
#[derive(Debug, Clone)]
pub enum ConfigField {
    Mode(Mode),
    Enabled(bool),
    Speed(u16),
    Brightness(u8),
    ColorChange(u8),
    NumPixels(u16),
    Red(u8),
    Green(u8),
    Blue(u8),
    /// Sets all three color channels at once.
    Color(Rgb),
    Name(String),
    Group(String),
    /// Firmware version tag ("current" means stay put).
    Version(String),
}

impl ConfigField {
    /// Apply this edit to a config. Touches only the named field.
    pub fn apply(&self, config: &mut StripConfig) {
        match self {
            ConfigField::Mode(mode) => config.mode = *mode,
            ConfigField::Enabled(enabled) => config.enabled = *enabled,
            ConfigField::Speed(speed) => config.speed = *speed,
            ConfigField::Brightness(brightness) => config.brightness = *brightness,
            ConfigField::ColorChange(rate) => config.color_change = *rate,
            ConfigField::NumPixels(n) => config.num_pixels = *n,
            ConfigField::Red(v) => config.red = *v,
            ConfigField::Green(v) => config.green = *v,
            ConfigField::Blue(v) => config.blue = *v,
            ConfigField::Color(rgb) => config.set_color(*rgb),
            ConfigField::Name(name) => config.name = name.clone(),
            ConfigField::Group(group) => config.group = group.clone(),
            ConfigField::Version(version) => config.version = version.clone(),
        }
    }

    /// Short human-readable description for log lines.
    pub fn describe(&self) -> String {
        match self {
            ConfigField::Mode(mode) => format!("mode={mode}"),
            ConfigField::Enabled(enabled) => format!("enabled={enabled}"),
            ConfigField::Speed(speed) => format!("speed={speed}"),
            ConfigField::Brightness(brightness) => format!("brightness={brightness}"),
            ConfigField::ColorChange(rate) => format!("colorChange={rate}"),
            ConfigField::NumPixels(n) => format!("numPixels={n}"),
            ConfigField::Red(v) => format!("red={v}"),
            ConfigField::Green(v) => format!("green={v}"),
            ConfigField::Blue(v) => format!("blue={v}"),
            ConfigField::Color(rgb) => {
                format!("color=({},{},{})", rgb.red, rgb.green, rgb.blue)
            }
            ConfigField::Name(name) => format!("name={name}"),
            ConfigField::Group(group) => format!("group={group}"),
            ConfigField::Version(version) => format!("version={version}"),
        }
    }
}

/// Outcome of one member of a fan-out write.
#[derive(Debug, Clone)]
pub struct FanoutOutcome {
    pub id: StripId,
    /// `None` on success; the error message otherwise.
    pub error: Option<String>,
}

/// Per-member results of a fan-out write.
///
/// A fan-out is not transactional: members that succeeded stay written
/// even when others fail. Callers decide whether a partial result is
/// acceptable.
#[derive(Debug, Clone, Default)]
pub struct FanoutReport {
    pub outcomes: Vec<FanoutOutcome>,
}

impl FanoutReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }

    pub fn failed(&self) -> Vec<&FanoutOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some()).collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Collapse into an error when any member failed.
    pub fn into_result(self) -> Result<(), CoreError> {
        let failed: Vec<StripId> = self
            .outcomes
            .iter()
            .filter(|o| o.error.is_some())
            .map(|o| o.id.clone())
            .collect();
        if failed.is_empty() {
            return Ok(());
        }
        let first_cause = self
            .outcomes
            .iter()
            .find_map(|o| o.error.clone())
            .unwrap_or_default();
        Err(CoreError::FanoutFailed {
            failed,
            first_cause,
        })
    }
}

// ── Write paths ──────────────────────────────────────────────────────

/// Apply a single-field edit to one strip.
///
/// Base record priority: desired config from the store, then the
/// device's last reported config, then defaults. The full record is
/// validated and written back, and the local store updated.
pub(crate) async fn set_field(
    client: &SyncClient,
    store: &FleetStore,
    actor: &str,
    id: &StripId,
    field: &ConfigField,
) -> Result<(), CoreError> {
    let base = match client.get_strip(id.as_str()).await? {
        Some(record) => StripConfig::try_from(record)?,
        None => store
            .strip(id)
            .and_then(|s| s.current.clone())
            .unwrap_or_default(),
    };

    let mut config = base;
    field.apply(&mut config);
    config.validate()?;

    let record = ConfigRecord::from(config.clone());
    client.set_strip(id.as_str(), &record).await?;
    store.apply_desired(id, config.clone());

    debug!(strip = %id, edit = %field.describe(), "wrote desired config");
    append_log(client, store, actor, format!("set {id} to {}", config.summary())).await;
    Ok(())
}

/// Resolve a selector and apply the edit to every member concurrently.
pub(crate) async fn set_field_fanout(
    client: &SyncClient,
    store: &FleetStore,
    actor: &str,
    selector: &str,
    field: &ConfigField,
) -> Result<FanoutReport, CoreError> {
    let snapshot = store.strips_snapshot();
    let resolution = resolve(selector, &snapshot)?;
    Ok(fanout(client, store, actor, resolution.ids(), field).await)
}

/// Apply the edit to a known list of strips concurrently.
pub(crate) async fn fanout(
    client: &SyncClient,
    store: &FleetStore,
    actor: &str,
    ids: Vec<StripId>,
    field: &ConfigField,
) -> FanoutReport {
    let writes = ids.into_iter().map(|id| async move {
        let result = set_field(client, store, actor, &id, field).await;
        FanoutOutcome {
            id,
            error: result.err().map(|e| e.to_string()),
        }
    });
    FanoutReport {
        outcomes: join_all(writes).await,
    }
}

/// Flip the fleet-wide switch, then push the flag to every strip known
/// at call time. The global write happens first: if it fails, nothing
/// else is touched.
pub(crate) async fn set_all_enabled(
    client: &SyncClient,
    store: &FleetStore,
    actor: &str,
    enabled: bool,
) -> Result<FanoutReport, CoreError> {
    let globals = crate::model::Globals {
        all_enabled: enabled,
    };
    client.set_globals(&globals.into()).await?;
    store.set_globals(globals);

    let ids = store.strip_ids();
    Ok(fanout(client, store, actor, ids, &ConfigField::Enabled(enabled)).await)
}

/// Append an audit log entry. Log failures are reported but never fail
/// the operation they describe.
pub(crate) async fn append_log(client: &SyncClient, store: &FleetStore, actor: &str, text: String) {
    let entry = LogRecord {
        date: chrono::Utc::now().to_rfc3339(),
        name: actor.to_owned(),
        text,
    };
    match client.append_log(&entry).await {
        Ok(key) => store.upsert_log_entry(key, entry.into()),
        Err(err) => warn!(%err, "log append failed (non-fatal)"),
    }
}

/// Resolve a selector against the store, for callers that need the
/// member list without writing anything.
pub(crate) fn resolve_selector(
    store: &FleetStore,
    selector: &str,
) -> Result<Resolution, CoreError> {
    let snapshot = store.strips_snapshot();
    resolve(selector, &snapshot)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn apply_touches_only_the_named_field() {
        let mut config = StripConfig {
            name: "porch".into(),
            group: "outside".into(),
            enabled: true,
            ..StripConfig::default()
        };
        ConfigField::Mode(Mode::Fire).apply(&mut config);

        assert_eq!(config.mode, Mode::Fire);
        assert_eq!(config.name, "porch");
        assert_eq!(config.group, "outside");
        assert!(config.enabled);
    }

    #[test]
    fn color_sets_all_three_channels() {
        let mut config = StripConfig::default();
        ConfigField::Color(Rgb {
            red: 1,
            green: 2,
            blue: 3,
        })
        .apply(&mut config);
        assert_eq!((config.red, config.green, config.blue), (1, 2, 3));
    }

    #[test]
    fn report_collapses_to_fanout_error() {
        let report = FanoutReport {
            outcomes: vec![
                FanoutOutcome {
                    id: StripId::from("a"),
                    error: None,
                },
                FanoutOutcome {
                    id: StripId::from("b"),
                    error: Some("boom".into()),
                },
            ],
        };
        assert!(!report.is_success());
        let err = report.into_result().unwrap_err();
        assert!(matches!(
            err,
            CoreError::FanoutFailed { failed, .. } if failed == vec![StripId::from("b")]
        ));
    }

    #[test]
    fn empty_report_is_success() {
        let report = FanoutReport::default();
        assert!(report.is_success());
        assert!(report.into_result().is_ok());
    }
}
