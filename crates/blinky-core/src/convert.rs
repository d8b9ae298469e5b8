// ── Wire <-> domain conversions ──
//
// The api crate preserves shape; this module enforces meaning. Rows that
// fail conversion (unknown mode, out-of-range slider, garbled timestamp)
// are rejected here so the rest of the crate only ever sees valid models.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use blinky_api::types::{CheckinRecord, ConfigRecord, FirmwareRecord, GlobalsRecord, LogRecord};

use crate::error::CoreError;
use crate::model::{Checkin, Firmware, Globals, LogEntry, Mode, StripConfig};

impl TryFrom<ConfigRecord> for StripConfig {
    type Error = CoreError;

    fn try_from(record: ConfigRecord) -> Result<Self, Self::Error> {
        let mode = Mode::from_str(&record.mode).map_err(|_| CoreError::UnknownMode {
            name: record.mode.clone(),
        })?;
        let config = StripConfig {
            version: record.version,
            name: record.name,
            group: record.group,
            mode,
            enabled: record.enabled,
            speed: record.speed,
            brightness: record.brightness,
            color_change: record.color_change,
            num_pixels: record.num_pixels,
            red: record.red,
            green: record.green,
            blue: record.blue,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<StripConfig> for ConfigRecord {
    fn from(config: StripConfig) -> Self {
        ConfigRecord {
            version: config.version,
            name: config.name,
            group: config.group,
            mode: config.mode.to_string(),
            enabled: config.enabled,
            speed: config.speed,
            brightness: config.brightness,
            color_change: config.color_change,
            num_pixels: config.num_pixels,
            red: config.red,
            green: config.green,
            blue: config.blue,
        }
    }
}

/// Split a checkin record into the telemetry envelope and the config the
/// device reports it is running. An unparsable embedded config is dropped
/// (treated as "device reported nothing") rather than failing the row.
pub fn split_checkin(record: CheckinRecord) -> (Checkin, Option<StripConfig>) {
    let reported = record.config.and_then(|c| match StripConfig::try_from(c) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(%err, "ignoring unparsable reported config in checkin");
            None
        }
    });
    let checkin = Checkin {
        ip: record.ip,
        rssi: record.rssi,
        timestamp: millis_to_datetime(record.timestamp),
        mac: record.mac,
        version: record.version,
    };
    (checkin, reported)
}

impl From<GlobalsRecord> for Globals {
    fn from(record: GlobalsRecord) -> Self {
        Globals {
            all_enabled: record.all_enabled,
        }
    }
}

impl From<Globals> for GlobalsRecord {
    fn from(globals: Globals) -> Self {
        GlobalsRecord {
            all_enabled: globals.all_enabled,
        }
    }
}

impl TryFrom<FirmwareRecord> for Firmware {
    type Error = CoreError;

    fn try_from(record: FirmwareRecord) -> Result<Self, Self::Error> {
        let url = record
            .url
            .parse()
            .map_err(|e| CoreError::Internal(format!("bad firmware URL: {e}")))?;
        Ok(Firmware {
            version: record.version,
            date_uploaded: millis_to_datetime(record.date_uploaded),
            filename: record.filename,
            url,
        })
    }
}

impl From<Firmware> for FirmwareRecord {
    fn from(fw: Firmware) -> Self {
        FirmwareRecord {
            version: fw.version,
            date_uploaded: fw.date_uploaded.timestamp_millis(),
            filename: fw.filename,
            url: fw.url.to_string(),
        }
    }
}

impl From<LogRecord> for LogEntry {
    fn from(record: LogRecord) -> Self {
        let date = DateTime::parse_from_rfc3339(&record.date)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_default();
        LogEntry {
            date,
            actor: record.name,
            text: record.text,
        }
    }
}

impl From<LogEntry> for LogRecord {
    fn from(entry: LogEntry) -> Self {
        LogRecord {
            date: entry.date.to_rfc3339(),
            name: entry.actor,
            text: entry.text,
        }
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(mode: &str) -> ConfigRecord {
        ConfigRecord {
            version: "current".into(),
            name: "porch".into(),
            group: "outside".into(),
            mode: mode.into(),
            enabled: true,
            speed: 120,
            brightness: 200,
            color_change: 50,
            num_pixels: 144,
            red: 10,
            green: 20,
            blue: 30,
        }
    }

    #[test]
    fn config_round_trips() {
        let wire = record("rainbow");
        let domain = StripConfig::try_from(wire.clone()).unwrap();
        assert_eq!(domain.mode, Mode::Rainbow);
        assert_eq!(ConfigRecord::from(domain), wire);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = StripConfig::try_from(record("disco")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownMode { name } if name == "disco"));
    }

    #[test]
    fn out_of_range_speed_is_rejected() {
        let mut wire = record("off");
        wire.speed = 999;
        assert!(StripConfig::try_from(wire).is_err());
    }

    #[test]
    fn checkin_keeps_telemetry_when_config_is_bad() {
        let rec = CheckinRecord {
            config: Some(record("nonsense")),
            ip: "10.0.0.7".into(),
            rssi: -61,
            timestamp: 1_700_000_000_000,
            mac: "AA:BB".into(),
            version: Some("__Bl!nky__ 1.0 ___".into()),
        };
        let (checkin, reported) = split_checkin(rec);
        assert!(reported.is_none());
        assert_eq!(checkin.ip, "10.0.0.7");
        assert_eq!(checkin.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn log_entry_parses_rfc3339_date() {
        let entry = LogEntry::from(LogRecord {
            date: "2024-05-01T12:00:00+00:00".into(),
            name: "alice".into(),
            text: "set 1234 to something".into(),
        });
        assert_eq!(entry.date.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        assert_eq!(entry.actor, "alice");
    }
}
