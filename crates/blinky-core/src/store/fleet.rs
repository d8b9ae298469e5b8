// ── Central reactive fleet store ──
//
// Thread-safe storage for every Blinky domain entity. Mutations are
// broadcast to subscribers via `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::Collection;
use crate::model::{Checkin, Firmware, Globals, LogEntry, Strip, StripConfig, StripId};
use crate::stream::EntityStream;

/// Central reactive store for the fleet.
///
/// Strips are merged from two upstream nodes: the desired-config store
/// and the checkin store. Either side may arrive first; `merge` keys on
/// the strip id so interleavings cannot drop data.
pub struct FleetStore {
    strips: Collection<Strip>,
    firmware: Collection<Firmware>,
    log: Collection<LogEntry>,
    globals: watch::Sender<Globals>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl FleetStore {
    pub fn new() -> Self {
        let (globals, _) = watch::channel(Globals::default());
        let (last_refresh, _) = watch::channel(None);

        Self {
            strips: Collection::new(),
            firmware: Collection::new(),
            log: Collection::new(),
            globals,
            last_refresh,
        }
    }

    // ── Strip mutation ───────────────────────────────────────────────

    /// Record a device checkin: telemetry plus the config the device
    /// says it is running.
    pub fn apply_checkin(&self, id: &StripId, checkin: Checkin, reported: Option<StripConfig>) {
        let init_id = id.clone();
        self.strips.merge(
            id.as_str(),
            move || Strip::new(init_id),
            |strip| {
                strip.last_checkin = Some(checkin);
                strip.current = reported;
            },
        );
    }

    /// Record the desired config for a strip.
    pub fn apply_desired(&self, id: &StripId, config: StripConfig) {
        let init_id = id.clone();
        self.strips.merge(
            id.as_str(),
            move || Strip::new(init_id),
            |strip| {
                strip.next = Some(config);
            },
        );
    }

    /// Replace all strips with the union of a desired-config listing and
    /// a checkin listing, as returned by a full refresh.
    pub fn replace_strips(
        &self,
        desired: impl IntoIterator<Item = (StripId, StripConfig)>,
        checkins: impl IntoIterator<Item = (StripId, Checkin, Option<StripConfig>)>,
    ) {
        self.strips.clear();
        for (id, config) in desired {
            self.apply_desired(&id, config);
        }
        for (id, checkin, reported) in checkins {
            self.apply_checkin(&id, checkin, reported);
        }
    }

    pub fn remove_strip(&self, id: &StripId) -> Option<Arc<Strip>> {
        self.strips.remove(id.as_str())
    }

    // ── Strip access ─────────────────────────────────────────────────

    pub fn strip(&self, id: &StripId) -> Option<Arc<Strip>> {
        self.strips.get(id.as_str())
    }

    /// Snapshot of all strips, sorted by id.
    pub fn strips_snapshot(&self) -> Arc<Vec<Arc<Strip>>> {
        self.strips.snapshot()
    }

    pub fn strip_ids(&self) -> Vec<StripId> {
        self.strips.keys().into_iter().map(StripId::new).collect()
    }

    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    pub fn subscribe_strips(&self) -> EntityStream<Strip> {
        EntityStream::new(self.strips.subscribe())
    }

    // ── Firmware ─────────────────────────────────────────────────────

    pub fn upsert_firmware(&self, firmware: Firmware) {
        self.firmware.upsert(firmware.version.clone(), firmware);
    }

    pub fn replace_firmware(&self, items: impl IntoIterator<Item = Firmware>) {
        self.firmware.clear();
        for fw in items {
            self.upsert_firmware(fw);
        }
    }

    pub fn remove_firmware(&self, version: &str) -> Option<Arc<Firmware>> {
        self.firmware.remove(version)
    }

    pub fn firmware(&self, version: &str) -> Option<Arc<Firmware>> {
        self.firmware.get(version)
    }

    pub fn firmware_snapshot(&self) -> Arc<Vec<Arc<Firmware>>> {
        self.firmware.snapshot()
    }

    pub fn subscribe_firmware(&self) -> EntityStream<Firmware> {
        EntityStream::new(self.firmware.subscribe())
    }

    // ── Log ──────────────────────────────────────────────────────────

    /// Log entries are keyed by push key, which sorts chronologically.
    pub fn upsert_log_entry(&self, key: String, entry: LogEntry) {
        self.log.upsert(key, entry);
    }

    pub fn replace_log(&self, items: impl IntoIterator<Item = (String, LogEntry)>) {
        self.log.clear();
        for (key, entry) in items {
            self.log.upsert(key, entry);
        }
    }

    pub fn log_snapshot(&self) -> Arc<Vec<Arc<LogEntry>>> {
        self.log.snapshot()
    }

    pub fn subscribe_log(&self) -> EntityStream<LogEntry> {
        EntityStream::new(self.log.subscribe())
    }

    // ── Globals ──────────────────────────────────────────────────────

    pub fn globals(&self) -> Globals {
        *self.globals.borrow()
    }

    pub fn set_globals(&self, globals: Globals) {
        self.globals.send_modify(|g| *g = globals);
    }

    pub fn subscribe_globals(&self) -> watch::Receiver<Globals> {
        self.globals.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn mark_refreshed(&self) {
        self.last_refresh.send_modify(|t| *t = Some(Utc::now()));
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last full refresh occurred, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for FleetStore {
    fn default() -> Self {
        Self::new()
    }
}
