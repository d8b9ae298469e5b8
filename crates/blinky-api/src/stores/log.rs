// Log store: append-only operator log under `log/`.
//
// Entries are pushed with server-generated keys, which sort
// chronologically -- fetching the map in key order gives insertion order.

use std::collections::BTreeMap;

use crate::client::SyncClient;
use crate::error::Error;
use crate::types::LogRecord;

impl SyncClient {
    /// Fetch all log entries, keyed by push key (chronological order).
    pub async fn list_log(&self) -> Result<BTreeMap<String, LogRecord>, Error> {
        let map = self.get_node::<BTreeMap<String, LogRecord>>("log").await?;
        Ok(map.unwrap_or_default())
    }

    /// Append a log entry; returns the generated key. Entries are never
    /// mutated or deleted.
    pub async fn append_log(&self, entry: &LogRecord) -> Result<String, Error> {
        self.post_node("log", entry).await
    }
}
