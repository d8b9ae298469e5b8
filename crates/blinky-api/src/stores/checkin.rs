// Checkin store: device-reported telemetry under `checkin/`.

use std::collections::BTreeMap;

use crate::client::SyncClient;
use crate::error::Error;
use crate::types::CheckinRecord;

impl SyncClient {
    /// Fetch every checkin record, keyed by strip id.
    pub async fn list_checkins(&self) -> Result<BTreeMap<String, CheckinRecord>, Error> {
        let map = self
            .get_node::<BTreeMap<String, CheckinRecord>>("checkin")
            .await?;
        Ok(map.unwrap_or_default())
    }

    /// Remove a strip's checkin record (part of strip deletion).
    pub async fn remove_checkin(&self, id: &str) -> Result<(), Error> {
        self.delete_node(&format!("checkin/{id}")).await
    }
}
