use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// An uploaded firmware image. The binary itself lives in blob storage;
/// this is the catalog entry devices consult when told to update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firmware {
    /// Full magic string extracted from the binary, delimiters included.
    pub version: String,
    pub date_uploaded: DateTime<Utc>,
    pub filename: String,
    pub url: Url,
}
