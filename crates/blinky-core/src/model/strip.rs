// ── Strips and checkins ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StripConfig;

/// Opaque strip identifier. In practice this is the device's chip id,
/// but nothing in this crate depends on that.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StripId(String);

impl StripId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StripId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for StripId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The most recent report from a device: where it is, how it is doing,
/// and what it believes it is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkin {
    pub ip: String,
    pub rssi: i32,
    pub timestamp: DateTime<Utc>,
    pub mac: String,
    pub version: Option<String>,
}

/// Whether a strip has picked up its latest desired configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// Reported and desired configs are structurally equal.
    Settled,
    /// The device has not yet fetched the desired config.
    Pending,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Settled => f.write_str("settled"),
            SyncStatus::Pending => f.write_str("pending"),
        }
    }
}

/// A strip as the fleet sees it: the config the device last reported
/// (`current`), the config we want it to run (`next`), and its last
/// checkin. Either side may be absent: a freshly provisioned device
/// has a checkin but no desired config, and a config written before
/// the device's first report has no `current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strip {
    pub id: StripId,
    pub current: Option<StripConfig>,
    pub next: Option<StripConfig>,
    pub last_checkin: Option<Checkin>,
}

impl Strip {
    pub fn new(id: StripId) -> Self {
        Self {
            id,
            current: None,
            next: None,
            last_checkin: None,
        }
    }

    /// Pending iff the two sides differ. Absent-vs-absent is settled;
    /// absent-vs-present is pending.
    pub fn status(&self) -> SyncStatus {
        if self.current == self.next {
            SyncStatus::Settled
        } else {
            SyncStatus::Pending
        }
    }

    /// Display name: the desired config wins over the reported one,
    /// empty strings count as unset.
    pub fn name(&self) -> Option<&str> {
        [self.next.as_ref(), self.current.as_ref()]
            .into_iter()
            .flatten()
            .map(|c| c.name.as_str())
            .find(|n| !n.is_empty())
    }

    pub fn group(&self) -> Option<&str> {
        [self.next.as_ref(), self.current.as_ref()]
            .into_iter()
            .flatten()
            .map(|c| c.group.as_str())
            .find(|g| !g.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mode;

    fn strip(id: &str) -> Strip {
        Strip::new(StripId::from(id))
    }

    #[test]
    fn fresh_strip_is_settled() {
        assert_eq!(strip("a").status(), SyncStatus::Settled);
    }

    #[test]
    fn differing_configs_are_pending() {
        let mut s = strip("a");
        s.current = Some(StripConfig::default());
        s.next = Some(StripConfig {
            mode: Mode::Rainbow,
            ..StripConfig::default()
        });
        assert_eq!(s.status(), SyncStatus::Pending);
    }

    #[test]
    fn desired_without_report_is_pending() {
        let mut s = strip("a");
        s.next = Some(StripConfig::default());
        assert_eq!(s.status(), SyncStatus::Pending);
    }

    #[test]
    fn equal_configs_are_settled() {
        let mut s = strip("a");
        s.current = Some(StripConfig::default());
        s.next = Some(StripConfig::default());
        assert_eq!(s.status(), SyncStatus::Settled);
    }

    #[test]
    fn name_prefers_desired_config() {
        let mut s = strip("a");
        s.current = Some(StripConfig {
            name: "old".into(),
            ..StripConfig::default()
        });
        s.next = Some(StripConfig {
            name: "new".into(),
            ..StripConfig::default()
        });
        assert_eq!(s.name(), Some("new"));
    }

    #[test]
    fn name_falls_back_past_empty_strings() {
        let mut s = strip("a");
        s.current = Some(StripConfig {
            name: "porch".into(),
            ..StripConfig::default()
        });
        s.next = Some(StripConfig::default());
        assert_eq!(s.name(), Some("porch"));
        assert_eq!(s.group(), None);
    }
}
