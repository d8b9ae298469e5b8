// blinky-api: Async Rust client for the Team Sidney sync store (realtime
// database REST surface) and the firmware blob store.

pub mod blob;
pub mod client;
pub mod error;
pub mod stores;
pub mod transport;
pub mod types;
pub mod version;

pub use blob::BlobClient;
pub use client::SyncClient;
pub use error::Error;
pub use version::extract_version;
