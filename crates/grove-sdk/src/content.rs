//! Content-addressed storage: pinning JSON through the pin endpoint and
//! reading it back through an IPFS gateway.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::quest::QuestMetadata;

pub trait ContentStore: Send + Sync + 'static {
    /// Pin a JSON document and return its CID.
    fn pin(&self, body: Value) -> impl Future<Output = Result<String>> + Send;

    /// Fetch a pinned JSON document.
    fn fetch(&self, cid: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Response body of the pin endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Gateway URL for a CID. Accepts bare CIDs, `ipfs://` URIs and `/ipfs/` paths.
pub fn gateway_url(gateway: &str, cid: &str) -> String {
    let cid = cid.trim();
    let cid = cid
        .strip_prefix("ipfs://")
        .or_else(|| cid.strip_prefix("/ipfs/"))
        .unwrap_or(cid);
    format!("{}/{}", gateway.trim_end_matches('/'), cid.trim_start_matches('/'))
}

/// Pin any serializable value; an empty CID counts as a failed pin.
pub async fn pin_json<S, T>(store: &S, value: &T) -> Result<String>
where
    S: ContentStore,
    T: Serialize,
{
    let body = serde_json::to_value(value).map_err(|e| Error::Pin(e.to_string()))?;
    let cid = store.pin(body).await?;
    if cid.trim().is_empty() {
        return Err(Error::Pin("no cid returned".into()));
    }
    Ok(cid)
}

/// Best-effort metadata lookup. Failures are logged and swallowed.
pub async fn fetch_metadata<S: ContentStore>(store: &S, cid: &str) -> Option<QuestMetadata> {
    if cid.trim().is_empty() {
        return None;
    }
    let value = match store.fetch(cid).await {
        Ok(value) => value,
        Err(e) => {
            log::debug!("metadata {cid} unavailable: {e}");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(meta) => Some(meta),
        Err(e) => {
            log::debug!("metadata {cid} is not quest metadata: {e}");
            None
        }
    }
}

/// Pin endpoint + gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: reqwest::Client,
    pin_endpoint: String,
    gateway: String,
}

impl HttpContentStore {
    pub fn new(pin_endpoint: &str, gateway: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            pin_endpoint: pin_endpoint.to_string(),
            gateway: gateway.to_string(),
        }
    }

    pub fn url_for(&self, cid: &str) -> String {
        gateway_url(&self.gateway, cid)
    }
}

impl ContentStore for HttpContentStore {
    async fn pin(&self, body: Value) -> Result<String> {
        let resp = self
            .client
            .post(&self.pin_endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Pin(e.to_string()))?;
        let status = resp.status();
        let parsed: PinResponse = resp.json().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Pin(
                parsed
                    .error
                    .unwrap_or_else(|| format!("pin endpoint answered {status}")),
            ));
        }
        match parsed.cid {
            Some(cid) if !cid.trim().is_empty() => Ok(cid),
            _ => Err(Error::Pin(
                parsed.error.unwrap_or_else(|| "no cid returned".into()),
            )),
        }
    }

    async fn fetch(&self, cid: &str) -> Result<Value> {
        let url = self.url_for(cid);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Content(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Error::Content(format!("{url} answered {}", resp.status())));
        }
        resp.json()
            .await
            .map_err(|e| Error::Content(format!("{url}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_urls() {
        let gw = "https://gateway.pinata.cloud/ipfs/";
        assert_eq!(
            gateway_url(gw, "bafyabc"),
            "https://gateway.pinata.cloud/ipfs/bafyabc"
        );
        assert_eq!(
            gateway_url("https://ipfs.io/ipfs", "ipfs://bafyabc"),
            "https://ipfs.io/ipfs/bafyabc"
        );
        assert_eq!(
            gateway_url("https://ipfs.io/ipfs", "/ipfs/Qm123"),
            "https://ipfs.io/ipfs/Qm123"
        );
    }

    #[test]
    fn pin_response_shapes() {
        let ok: PinResponse = serde_json::from_str(r#"{"cid":"bafy1"}"#).unwrap();
        assert_eq!(ok.cid.as_deref(), Some("bafy1"));
        let err: PinResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("boom"));
        assert!(err.cid.is_none());
    }
}
