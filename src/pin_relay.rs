//! Server side of `POST /api/pin`: forwards a JSON body to Pinata and
//! answers with the resulting CID.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use grove_sdk::content::PinResponse;
use serde::Deserialize;
use serde_json::Value;

pub const PINATA_PIN_JSON_URL: &str = "https://api.pinata.cloud/pinning/pinJSONToIPFS";
pub const PIN_ROUTE: &str = "/api/pin";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("pinning is not configured")]
    NotConfigured,

    #[error("request body is not JSON: {0}")]
    BadRequest(String),

    #[error("pinning service unreachable: {0}")]
    Unreachable(String),

    #[error("pinning service answered {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unexpected pinning service response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinataResponse {
    ipfs_hash: String,
}

#[derive(Debug, Clone)]
pub struct PinRelay {
    client: reqwest::Client,
    upstream: String,
    jwt: Option<String>,
}

impl PinRelay {
    pub fn new(upstream: impl Into<String>, jwt: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream: upstream.into(),
            jwt: jwt.filter(|j| !j.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.jwt.is_some()
    }

    /// Pin `body` upstream and return its CID.
    pub async fn forward(&self, body: Value) -> Result<String, RelayError> {
        let jwt = self.jwt.as_deref().ok_or(RelayError::NotConfigured)?;
        let resp = self
            .client
            .post(&self.upstream)
            .bearer_auth(jwt)
            .json(&serde_json::json!({ "pinataContent": body }))
            .send()
            .await
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let pinned: PinataResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::BadResponse(e.to_string()))?;
        Ok(pinned.ipfs_hash)
    }
}

pub fn router(relay: PinRelay) -> Router {
    Router::new()
        .route(PIN_ROUTE, post(pin))
        .with_state(Arc::new(relay))
}

async fn pin(State(relay): State<Arc<PinRelay>>, body: Bytes) -> (StatusCode, Json<PinResponse>) {
    let result = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => relay.forward(value).await,
        Err(e) => Err(RelayError::BadRequest(e.to_string())),
    };
    match result {
        Ok(cid) => {
            log::info!("pinned {} bytes as {cid}", body.len());
            (
                StatusCode::OK,
                Json(PinResponse {
                    cid: Some(cid),
                    error: None,
                }),
            )
        }
        Err(e) => {
            log::warn!("pin failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PinResponse {
                    cid: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

pub async fn serve(addr: SocketAddr, relay: PinRelay) -> std::io::Result<()> {
    if !relay.is_configured() {
        log::warn!("PINATA_JWT is not set, every pin request will fail");
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("pin relay listening on http://{}{PIN_ROUTE}", listener.local_addr()?);
    axum::serve(listener, router(relay)).await
}
