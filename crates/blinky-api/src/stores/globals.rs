// Globals store: fleet-wide switches under `globals/`.

use crate::client::SyncClient;
use crate::error::Error;
use crate::types::GlobalsRecord;

impl SyncClient {
    /// Fetch the fleet-wide switches. An absent node yields the defaults
    /// (everything off).
    pub async fn get_globals(&self) -> Result<GlobalsRecord, Error> {
        let globals = self.get_node::<GlobalsRecord>("globals").await?;
        Ok(globals.unwrap_or_default())
    }

    /// Replace the fleet-wide switches.
    pub async fn set_globals(&self, globals: &GlobalsRecord) -> Result<(), Error> {
        self.put_node("globals", globals).await
    }
}
