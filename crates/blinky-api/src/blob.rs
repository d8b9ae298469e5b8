// Blob store client for firmware binaries.
//
// The blob store is an opaque HTTP surface keyed by filename: PUT uploads
// a binary, GET downloads it. The upload URL doubles as the download URL
// recorded in firmware metadata.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// HTTP client for the firmware blob store.
pub struct BlobClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl BlobClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Tls(format!(
                "blob store URL '{base_url}' cannot be used as a base URL"
            )));
        }
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Build the blob URL for a filename (percent-escaped as one segment).
    fn blob_url(&self, filename: &str) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("base URL validated in BlobClient::new")
            .push(filename);
        url
    }

    /// Upload a binary under the given filename; returns its content URL.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<Url, Error> {
        let url = self.blob_url(filename);
        debug!(filename, size = bytes.len(), "uploading blob");

        let resp = self
            .http
            .put(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::transport(e, self.timeout_secs))?;

        if !resp.status().is_success() {
            return Err(Error::Blob {
                name: filename.to_owned(),
                message: format!("upload failed with HTTP {}", resp.status().as_u16()),
            });
        }
        Ok(url)
    }

    /// Download a blob by its content URL.
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>, Error> {
        debug!(%url, "downloading blob");

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(e, self.timeout_secs))?;

        if !resp.status().is_success() {
            return Err(Error::Blob {
                name: url.path().to_owned(),
                message: format!("download failed with HTTP {}", resp.status().as_u16()),
            });
        }
        Ok(resp.bytes().await.map_err(|e| Error::transport(e, self.timeout_secs))?.to_vec())
    }
}
