// Sync store HTTP client
//
// Wraps `reqwest::Client` with store-specific URL construction and error
// unwrapping. The store exposes a Firebase-style REST surface: every node
// is addressable as `{base}/{path}.json`, GET returns the JSON value at
// the node (`null` if absent), PUT replaces it, POST pushes a new child
// with a server-generated key, DELETE removes it. All store surfaces
// (strips, checkin, globals, firmware, log) are implemented as inherent
// methods via separate files under `stores/` to keep this module focused
// on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::PushResponse;

/// Raw HTTP client for the sync store's REST surface.
///
/// Handles `.json` node addressing, optional `auth` token attachment,
/// and error-body unwrapping. Methods return the node payload -- callers
/// never see HTTP plumbing.
pub struct SyncClient {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<SecretString>,
    timeout_secs: u64,
}

impl SyncClient {
    /// Create a new sync client from a `TransportConfig`.
    ///
    /// `base_url` is the store root, e.g. `https://team-sidney.firebaseio.com`.
    pub fn new(
        base_url: Url,
        auth_token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Tls(format!(
                "store URL '{base_url}' cannot be used as a base URL"
            )));
        }
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            auth_token,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// The store base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build the REST URL for a node path: `{base}/{path}.json[?auth=...]`.
    ///
    /// Path components are pushed as segments so keys containing spaces
    /// (firmware version strings do) are percent-escaped correctly. The
    /// auth token rides in the query string, which is why request logging
    /// below prints the node path rather than the full URL.
    fn node_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("base URL validated in SyncClient::new");
            let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            let last = parts.len().saturating_sub(1);
            for (i, part) in parts.iter().enumerate() {
                if i == last {
                    segments.push(&format!("{part}.json"));
                } else {
                    segments.push(part);
                }
            }
        }
        if let Some(ref token) = self.auth_token {
            url.query_pairs_mut()
                .append_pair("auth", token.expose_secret());
        }
        url
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Read the value at a node. Returns `None` if the node is absent
    /// (the store answers `null`).
    pub(crate) async fn get_node<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, Error> {
        debug!("GET {path}");

        let resp = self
            .http
            .get(self.node_url(path))
            .send()
            .await
            .map_err(|e| Error::transport(e, self.timeout_secs))?;

        self.parse_body(path, resp).await
    }

    /// Replace the value at a node.
    pub(crate) async fn put_node(&self, path: &str, value: &impl Serialize) -> Result<(), Error> {
        debug!("PUT {path}");

        let resp = self
            .http
            .put(self.node_url(path))
            .json(value)
            .send()
            .await
            .map_err(|e| Error::transport(e, self.timeout_secs))?;

        self.check_status(path, resp).await?;
        Ok(())
    }

    /// Push a new child under a node; the store generates the key.
    pub(crate) async fn post_node(
        &self,
        path: &str,
        value: &impl Serialize,
    ) -> Result<String, Error> {
        debug!("POST {path}");

        let resp = self
            .http
            .post(self.node_url(path))
            .json(value)
            .send()
            .await
            .map_err(|e| Error::transport(e, self.timeout_secs))?;

        let pushed: Option<PushResponse> = self.parse_body(path, resp).await?;
        pushed.map(|p| p.name).ok_or_else(|| Error::Store {
            path: path.to_owned(),
            status: 200,
            message: "push returned no key".into(),
        })
    }

    /// Remove the value at a node. Removing an absent node is a no-op.
    pub(crate) async fn delete_node(&self, path: &str) -> Result<(), Error> {
        debug!("DELETE {path}");

        let resp = self
            .http
            .delete(self.node_url(path))
            .send()
            .await
            .map_err(|e| Error::transport(e, self.timeout_secs))?;

        self.check_status(path, resp).await?;
        Ok(())
    }

    /// Check the status and deserialize the response body, treating the
    /// literal `null` as an absent node.
    async fn parse_body<T: DeserializeOwned>(
        &self,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let body = self.check_status(path, resp).await?;

        serde_json::from_str::<Option<T>>(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Map non-2xx responses to [`Error::Store`], passing the store's
    /// error message through verbatim.
    async fn check_status(&self, path: &str, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::transport(e, self.timeout_secs))?;

        if status.is_success() {
            return Ok(body);
        }

        // Error bodies look like {"error": "Permission denied"}.
        let message = serde_json::from_str::<StoreErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.clone());

        Err(Error::Store {
            path: path.to_owned(),
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(serde::Deserialize)]
struct StoreErrorBody {
    error: String,
}
