//! Shared types for the builder relayer client.
//!
//! - `RelayError` and the workspace-wide `Result` alias
//! - Hex / numeric field parsing with field-aware errors
//! - Wire models exchanged with the relayer (`models`)
//! - Per-chain contract addresses (`contracts`)

use thiserror::Error;

pub mod contracts;
pub mod models;

pub use alloy_primitives::{Address, B256, U256};
pub use contracts::{ContractConfig, ProxyContractConfig, SafeContractConfig};
pub use models::*;

/// 0x-prefixed hex string (e.g. "0x1234...").
pub type Hex = String;

/// Coarse classification of a failed HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    BadRequest,
    Unauthorized,
    TooManyRequests,
    InternalServerError,
    Other,
}

impl HttpErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 | 403 => Self::Unauthorized,
            429 => Self::TooManyRequests,
            s if s >= 500 => Self::InternalServerError,
            _ => Self::Other,
        }
    }
}

/// A non-2xx response from the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("http error: status {status} body={body}")]
pub struct HttpError {
    pub status: u16,
    pub body: String,
    pub kind: HttpErrorKind,
}

impl HttpError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            kind: HttpErrorKind::from_status(status),
        }
    }

    /// 5xx and 429 are worth another attempt; every other status is final.
    pub fn is_retryable(&self) -> bool {
        self.status >= 500 || self.status == 429
    }
}

/// Relayer client error types.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("config is not supported on this chain: {0}")]
    ConfigUnsupported(String),

    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid builder credentials: {0}")]
    InvalidCredentials(String),

    #[error("builder attribution failed: {0}")]
    Attribution(String),

    #[error("missing capability: {0}")]
    MissingCapability(&'static str),

    #[error("safe already deployed")]
    AlreadyDeployed,

    #[error("safe not deployed")]
    NotDeployed,

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("max retries exceeded: {0}")]
    RetriesExhausted(Box<RelayError>),

    #[error("decode response: {0}")]
    DecodeFailed(String),

    #[error("transaction failed onchain: {transaction_hash}")]
    OnchainFailure { transaction_hash: String },

    #[error("transaction {transaction_id} not found or not in desired state after {attempts} polls")]
    Timeout { transaction_id: String, attempts: u32 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl RelayError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// The HTTP error behind this one, looking through retry exhaustion.
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::Http(e) => Some(e),
            Self::RetriesExhausted(inner) => inner.http_error(),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_error().map(|e| e.status)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a hex string to bytes. `0x` prefix optional.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = strip_hex_prefix(hex_str).unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| RelayError::InvalidHex(e.to_string()))
}

/// Convert bytes to a 0x-prefixed hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> Hex {
    format!("0x{}", hex::encode(bytes))
}

/// Decode the hex payload of a named field. Empty input is zero bytes.
pub fn decode_hex(field: &str, data: &str) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let raw = strip_hex_prefix(data).unwrap_or(data);
    hex::decode(raw).map_err(|e| RelayError::invalid_argument(field, e))
}

/// Parse an unsigned integer field: decimal, or hex when `0x`/`0X`-prefixed.
/// Empty input is zero.
pub fn parse_u256(field: &str, value: &str) -> Result<U256> {
    if value.is_empty() {
        return Ok(U256::ZERO);
    }
    let clean = value.trim();
    let (digits, radix) = match strip_hex_prefix(clean) {
        Some(rest) => (rest, 16),
        None => (clean, 10),
    };
    let valid = !digits.is_empty()
        && digits.chars().all(|c| match radix {
            16 => c.is_ascii_hexdigit(),
            _ => c.is_ascii_digit(),
        });
    if !valid {
        return Err(RelayError::invalid_argument(
            field,
            format!("invalid integer: {value}"),
        ));
    }
    U256::from_str_radix(digits, radix)
        .map_err(|e| RelayError::invalid_argument(field, format!("{value}: {e}")))
}

/// Parse a 20-byte address field.
pub fn parse_address(field: &str, value: &str) -> Result<Address> {
    let raw = strip_hex_prefix(value.trim()).unwrap_or(value.trim());
    let bytes = hex::decode(raw).map_err(|e| RelayError::invalid_argument(field, e))?;
    if bytes.len() != 20 {
        return Err(RelayError::invalid_argument(
            field,
            format!("expected 20 bytes, got {}", bytes.len()),
        ));
    }
    Ok(Address::from_slice(&bytes))
}

/// EIP-55 checksummed form of an address.
pub fn format_address(address: &Address) -> String {
    address.to_checksum(None)
}

/// Left-pad to 32 bytes, big-endian. Longer input keeps its low 32 bytes.
pub fn left_pad32(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    if bytes.len() >= 32 {
        out.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        out[32 - bytes.len()..].copy_from_slice(bytes);
    }
    out
}
