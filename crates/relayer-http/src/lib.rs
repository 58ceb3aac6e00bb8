//! Retrying JSON transport for the relayer API.
//!
//! Transport errors, 5xx and 429 are retried with exponential backoff.
//! A 429 `Retry-After` header overrides the next delay. Every network
//! round-trip and every sleep races the caller's cancellation token.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use relayer_types::{HttpError, RelayError, Result};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

pub use reqwest::{header, Method};

/// Retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles per retry.
pub const BASE_DELAY: Duration = Duration::from_millis(500);

const MAX_BACKOFF_EXPONENT: u32 = 10;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Query parameters, extra headers and an optional JSON body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// One failed attempt.
struct AttemptError {
    error: RelayError,
    retryable: bool,
    /// Server-requested delay before the next attempt.
    retry_after: Option<Duration>,
}

impl AttemptError {
    fn transport(err: reqwest::Error) -> Self {
        Self {
            error: RelayError::Transport(err.to_string()),
            retryable: true,
            retry_after: None,
        }
    }
}

/// HTTP client with the relayer's retry policy.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpClient {
    pub fn new(timeout_ms: Option<u64>) -> Self {
        let timeout_ms = timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }

    /// Override the retry count and the first backoff delay.
    pub fn with_retry_policy(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty 2xx body decodes to `T::default()`.
    #[instrument(skip(self, options, cancel), fields(%method))]
    pub async fn execute<T: DeserializeOwned + Default>(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let mut retry = 0;
        loop {
            let failure = match self.attempt(&method, url, options, cancel).await? {
                Ok(body) => return decode(&body),
                Err(failure) => failure,
            };

            if !failure.retryable {
                return Err(failure.error);
            }
            if retry >= self.max_retries {
                error!(attempts = retry + 1, error = %failure.error, "giving up on request");
                return Err(RelayError::RetriesExhausted(Box::new(failure.error)));
            }

            retry += 1;
            let delay = failure.retry_after.unwrap_or_else(|| self.backoff(retry));
            warn!(
                retry,
                delay_ms = delay.as_millis() as u64,
                error = %failure.error,
                "retrying request"
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RelayError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// The outer `Result` carries cancellation only.
    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<std::result::Result<String, AttemptError>> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(options.headers.clone())
            .header(ACCEPT, "application/json");
        if !options.params.is_empty() {
            request = request.query(&options.params);
        }
        if let Some(body) = &options.body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        debug!(url, "sending request");
        let round_trip = async {
            let resp = request.send().await.map_err(AttemptError::transport)?;
            let status = resp.status();
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| parse_retry_after(v, Utc::now()));
            let body = resp.text().await.map_err(AttemptError::transport)?;
            if status.is_success() {
                return Ok::<_, AttemptError>(body);
            }

            let error = HttpError::new(status.as_u16(), body);
            Err(AttemptError {
                retryable: error.is_retryable(),
                retry_after: retry_after.filter(|_| status == StatusCode::TOO_MANY_REQUESTS),
                error: error.into(),
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RelayError::Cancelled),
            res = round_trip => Ok(res),
        }
    }
}

fn decode<T: DeserializeOwned + Default>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| RelayError::DecodeFailed(format!("{e}: {body}")))
}

/// Obsolete HTTP-date forms still accepted alongside RFC 1123.
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// An HTTP date in any of its three permitted forms, always UTC.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(value) {
        return Some(at.with_timezone(&Utc));
    }
    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// `Retry-After` as a delay: integer seconds or an HTTP date.
///
/// Non-positive seconds and past dates mean "retry now". Anything
/// unparseable yields `None` so the default schedule applies.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return Some(Duration::from_secs(secs.max(0) as u64));
    }
    let at = parse_http_date(value)?;
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
