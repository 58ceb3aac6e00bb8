//! Builder attribution headers.
//!
//! Authenticated relayer endpoints carry four headers proving which
//! integrator submitted the request. They are computed either locally
//! (HMAC over the request) or by a remote signing service, and are bound to
//! method, path, body and timestamp, so they are never reused.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use relayer_types::{RelayError, Result};
use tokio_util::sync::CancellationToken;

pub mod local;
pub mod remote;

pub use local::{build_hmac_signature, normalize_timestamp};
pub use remote::RemoteSignerConfig;

pub const HEADER_API_KEY: &str = "POLY_BUILDER_API_KEY";
pub const HEADER_PASSPHRASE: &str = "POLY_BUILDER_PASSPHRASE";
pub const HEADER_SIGNATURE: &str = "POLY_BUILDER_SIGNATURE";
pub const HEADER_TIMESTAMP: &str = "POLY_BUILDER_TIMESTAMP";

/// Builder API key material. `secret` is base64.
#[derive(Clone, PartialEq, Eq)]
pub struct BuilderCredentials {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

impl BuilderCredentials {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty() && !self.passphrase.is_empty()
    }
}

impl std::fmt::Debug for BuilderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// The four attribution header values for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderHeaders {
    pub api_key: String,
    pub passphrase: String,
    pub signature: String,
    pub timestamp: String,
}

impl BuilderHeaders {
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            (HEADER_API_KEY, &self.api_key),
            (HEADER_PASSPHRASE, &self.passphrase),
            (HEADER_SIGNATURE, &self.signature),
            (HEADER_TIMESTAMP, &self.timestamp),
        ]
    }

    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(4);
        for (name, value) in self.pairs() {
            let value = HeaderValue::from_str(value).map_err(|e| {
                RelayError::Attribution(format!("{name} is not a valid header value: {e}"))
            })?;
            // Names are stored lowercased; the relayer matches them case-insensitively.
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RelayError::Attribution(format!("{name}: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// How attribution headers are produced.
#[derive(Debug, Clone)]
pub enum BuilderConfig {
    Local(BuilderCredentials),
    Remote(RemoteSignerConfig),
}

impl BuilderConfig {
    pub fn local(key: impl Into<String>, secret: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self::Local(BuilderCredentials::new(key, secret, passphrase))
    }

    pub fn remote(host: impl Into<String>, token: Option<String>) -> Self {
        Self::Remote(RemoteSignerConfig::new(host, token))
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::Local(creds) => creds.is_valid(),
            Self::Remote(remote) => remote.is_valid(),
        }
    }

    /// Headers for one request. `timestamp` is milliseconds, seconds, or 0
    /// for "now".
    pub async fn headers(
        &self,
        method: &str,
        path: &str,
        body: Option<&str>,
        timestamp: i64,
        cancel: &CancellationToken,
    ) -> Result<BuilderHeaders> {
        match self {
            Self::Local(creds) => local::local_headers(creds, method, path, body, timestamp),
            Self::Remote(remote) => {
                remote::remote_headers(remote, method, path, body, timestamp, cancel).await
            }
        }
    }

    /// Read builder configuration from the process environment.
    ///
    /// `BUILDER_REMOTE_HOST` (+ `BUILDER_REMOTE_TOKEN`) selects remote mode.
    /// Otherwise `BUILDER_API_KEY`, `BUILDER_SECRET` and `BUILDER_PASS_PHRASE`
    /// (or their `POLY_BUILDER_*` forms) select local mode.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |names: &[&str]| {
            names
                .iter()
                .filter_map(|n| lookup(n))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        if let Some(host) = get(&["BUILDER_REMOTE_HOST"]) {
            return Some(Self::remote(host, get(&["BUILDER_REMOTE_TOKEN"])));
        }

        let creds = BuilderCredentials::new(
            get(&["BUILDER_API_KEY", "POLY_BUILDER_API_KEY"]).unwrap_or_default(),
            get(&["BUILDER_SECRET", "POLY_BUILDER_SECRET"]).unwrap_or_default(),
            get(&["BUILDER_PASS_PHRASE", "POLY_BUILDER_PASSPHRASE"]).unwrap_or_default(),
        );
        creds.is_valid().then_some(Self::Local(creds))
    }
}
