// Config store: desired strip configurations under `strips/`.

use std::collections::BTreeMap;

use crate::client::SyncClient;
use crate::error::Error;
use crate::types::ConfigRecord;

impl SyncClient {
    /// Fetch every desired config, keyed by strip id.
    ///
    /// An empty store answers `null`; that becomes an empty map.
    pub async fn list_strips(&self) -> Result<BTreeMap<String, ConfigRecord>, Error> {
        let map = self
            .get_node::<BTreeMap<String, ConfigRecord>>("strips")
            .await?;
        Ok(map.unwrap_or_default())
    }

    /// Fetch the desired config for a single strip, if present.
    pub async fn get_strip(&self, id: &str) -> Result<Option<ConfigRecord>, Error> {
        self.get_node(&format!("strips/{id}")).await
    }

    /// Replace the desired config for a strip. Whole-record write -- the
    /// caller is responsible for read-modify-write on field edits.
    pub async fn set_strip(&self, id: &str, config: &ConfigRecord) -> Result<(), Error> {
        self.put_node(&format!("strips/{id}"), config).await
    }

    /// Remove a strip's desired config.
    pub async fn remove_strip(&self, id: &str) -> Result<(), Error> {
        self.delete_node(&format!("strips/{id}")).await
    }
}
