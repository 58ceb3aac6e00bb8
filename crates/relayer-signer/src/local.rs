//! secp256k1 signer over a raw private key.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use relayer_crypto::{eip191_hash, keccak256, TypedData};
use relayer_types::{hex_to_bytes, RelayError, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{GasEstimateRequest, GasEstimator, SignatureBytes, Signer};

/// Signs locally with deterministic (RFC 6979) ECDSA. `v` is 27 or 28.
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
    estimator: Option<Arc<dyn GasEstimator>>,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_of(&key);
        Self {
            key,
            address,
            estimator: None,
        }
    }

    /// Parse a 32-byte private key, `0x` prefix optional.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let bytes = hex_to_bytes(private_key.trim())?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| RelayError::invalid_argument("private_key", e))?;
        Ok(Self::new(key))
    }

    pub fn with_gas_estimator(mut self, estimator: Arc<dyn GasEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<SignatureBytes> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| RelayError::SigningFailed(e.to_string()))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte() + 27;
        Ok(out)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .field("estimator", &self.estimator.is_some())
            .finish()
    }
}

fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    // Uncompressed point is 0x04 ‖ X ‖ Y.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

fn ensure_live(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(RelayError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_message(
        &self,
        message: &[u8],
        cancel: &CancellationToken,
    ) -> Result<SignatureBytes> {
        ensure_live(cancel)?;
        if message.is_empty() {
            return Err(RelayError::invalid_argument("message", "message is required"));
        }
        debug!(signer = %self.address, len = message.len(), "signing personal message");
        self.sign_digest(&eip191_hash(message))
    }

    async fn sign_typed_data(
        &self,
        typed_data: &TypedData,
        cancel: &CancellationToken,
    ) -> Result<SignatureBytes> {
        ensure_live(cancel)?;
        debug!(signer = %self.address, primary_type = %typed_data.primary_type, "signing typed data");
        self.sign_digest(&typed_data.signing_hash())
    }

    async fn estimate_gas(
        &self,
        request: &GasEstimateRequest,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        match &self.estimator {
            Some(estimator) => estimator.estimate_gas(request, cancel).await,
            None => Err(RelayError::MissingCapability("gas estimator")),
        }
    }
}
