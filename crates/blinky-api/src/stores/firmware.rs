// Firmware store: uploaded firmware metadata under `firmware/`.
//
// Keys are full version strings (magic delimiters included), which
// contain spaces -- the URL builder percent-escapes them.

use std::collections::BTreeMap;

use crate::client::SyncClient;
use crate::error::Error;
use crate::types::FirmwareRecord;

impl SyncClient {
    /// Fetch all known firmware versions, keyed by version string.
    pub async fn list_firmware(&self) -> Result<BTreeMap<String, FirmwareRecord>, Error> {
        let map = self
            .get_node::<BTreeMap<String, FirmwareRecord>>("firmware")
            .await?;
        Ok(map.unwrap_or_default())
    }

    /// Record metadata for an uploaded firmware version.
    pub async fn set_firmware(&self, version: &str, record: &FirmwareRecord) -> Result<(), Error> {
        self.put_node(&format!("firmware/{version}"), record).await
    }

    /// Remove a firmware version's metadata.
    pub async fn remove_firmware(&self, version: &str) -> Result<(), Error> {
        self.delete_node(&format!("firmware/{version}")).await
    }
}
