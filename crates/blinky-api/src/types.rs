// Wire types for the sync store.
//
// Field names mirror the database layout exactly (camelCase), so these
// records round-trip byte-for-byte against what the devices and the web
// dashboard read and write. Domain-level validation lives in blinky-core;
// this layer only preserves shape.

use serde::{Deserialize, Serialize};

/// A strip configuration record as stored under `strips/{id}`.
///
/// Writes always replace the whole record -- there is no partial update
/// on the wire. `name` and `group` default to empty for rows written by
/// older firmware that predates those fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
    pub mode: String,
    pub enabled: bool,
    pub speed: u16,
    pub brightness: u8,
    pub color_change: u8,
    pub num_pixels: u16,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// A telemetry checkin record as stored under `checkin/{id}`.
///
/// `config` is the device's own view of what it is currently running,
/// which may lag behind (or disagree with) the desired record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRecord {
    #[serde(default)]
    pub config: Option<ConfigRecord>,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub rssi: i32,
    /// Milliseconds since the Unix epoch (server timestamp).
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Fleet-wide switches stored under `globals/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalsRecord {
    pub all_enabled: bool,
}

/// Firmware metadata stored under `firmware/{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareRecord {
    pub version: String,
    /// Milliseconds since the Unix epoch.
    pub date_uploaded: i64,
    pub filename: String,
    pub url: String,
}

/// An append-only log entry stored under `log/{push-key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 timestamp string.
    pub date: String,
    /// Display name of the actor who performed the action.
    pub name: String,
    pub text: String,
}

/// Response body of a POST (push) to the store: `{"name": "<new key>"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PushResponse {
    pub name: String,
}
