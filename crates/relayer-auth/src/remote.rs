//! Attribution delegated to a remote signing service.
//!
//! POST {host} with `{method, path, body, timestamp?}`; the service answers
//! with the four builder header values.

use std::time::Duration;

use relayer_types::{RelayError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::local::normalize_timestamp;
use crate::{
    BuilderHeaders, HEADER_API_KEY, HEADER_PASSPHRASE, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Remote signer endpoint and its HTTP client.
#[derive(Clone)]
pub struct RemoteSignerConfig {
    pub host: String,
    pub token: Option<String>,
    client: reqwest::Client,
}

impl RemoteSignerConfig {
    pub fn new(host: impl Into<String>, token: Option<String>) -> Self {
        Self::with_timeout(host, token, None)
    }

    pub fn with_timeout(host: impl Into<String>, token: Option<String>, timeout_ms: Option<u64>) -> Self {
        let timeout = Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));
        Self {
            host: host.into(),
            token: token.filter(|t| !t.is_empty()),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.host.is_empty()
    }
}

impl std::fmt::Debug for RemoteSignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSignerConfig")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    method: &'a str,
    path: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
}

/// `POLY_BUILDER_API_KEY`, `poly_builder_api_key` and `Poly-Builder-Api-Key`
/// all name the same field.
fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

fn field(map: &Map<String, Value>, header: &str) -> Result<String> {
    let wanted = normalize_key(header);
    map.iter()
        .filter(|(k, _)| normalize_key(k) == wanted)
        .find_map(|(_, v)| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| {
            RelayError::Attribution(format!("invalid builder headers response: missing {header}"))
        })
}

pub(crate) async fn remote_headers(
    remote: &RemoteSignerConfig,
    method: &str,
    path: &str,
    body: Option<&str>,
    timestamp: i64,
    cancel: &CancellationToken,
) -> Result<BuilderHeaders> {
    if !remote.is_valid() {
        return Err(RelayError::InvalidCredentials("remote signer host is required".into()));
    }

    let payload = SignRequest {
        method,
        path,
        body: body.unwrap_or_default(),
        timestamp: (timestamp != 0).then(|| normalize_timestamp(timestamp)),
    };

    let mut request = remote.client.post(&remote.host).json(&payload);
    if let Some(token) = &remote.token {
        request = request.bearer_auth(token);
    }

    debug!(host = %remote.host, method, path, "requesting remote builder headers");
    let send = async {
        let resp = request
            .send()
            .await
            .map_err(|e| RelayError::Attribution(format!("builder request: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "remote builder signer rejected request");
            return Err(RelayError::Attribution(format!(
                "builder signer error: status {}",
                status.as_u16()
            )));
        }
        resp.json::<Map<String, Value>>()
            .await
            .map_err(|e| RelayError::Attribution(format!("decode builder headers: {e}")))
    };

    let map = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RelayError::Cancelled),
        res = send => res?,
    };

    Ok(BuilderHeaders {
        api_key: field(&map, HEADER_API_KEY)?,
        passphrase: field(&map, HEADER_PASSPHRASE)?,
        signature: field(&map, HEADER_SIGNATURE)?,
        timestamp: field(&map, HEADER_TIMESTAMP)?,
    })
}
