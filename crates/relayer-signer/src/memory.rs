//! Deterministic signer for testing.

use alloy_primitives::Address;
use async_trait::async_trait;
use relayer_crypto::TypedData;
use relayer_types::{RelayError, Result};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{GasEstimateRequest, SignatureBytes, Signer};

/// What `MemorySigner::estimate_gas` answers.
#[derive(Debug, Clone)]
pub enum GasAnswer {
    Fixed(u64),
    Fail(String),
    Unsupported,
}

/// Signer returning a fixed signature and recording everything it signs.
pub struct MemorySigner {
    address: Address,
    signature: SignatureBytes,
    gas: GasAnswer,
    messages: Mutex<Vec<Vec<u8>>>,
    typed_digests: Mutex<Vec<[u8; 32]>>,
    gas_requests: Mutex<Vec<GasEstimateRequest>>,
}

impl MemorySigner {
    pub fn new(address: Address, signature: SignatureBytes) -> Self {
        Self {
            address,
            signature,
            gas: GasAnswer::Unsupported,
            messages: Mutex::new(Vec::new()),
            typed_digests: Mutex::new(Vec::new()),
            gas_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gas(mut self, gas: GasAnswer) -> Self {
        self.gas = gas;
        self
    }

    /// Messages passed to `sign_message`, in call order.
    pub fn signed_messages(&self) -> Vec<Vec<u8>> {
        self.messages.lock().unwrap().clone()
    }

    /// EIP-712 digests passed to `sign_typed_data`, in call order.
    pub fn signed_typed_digests(&self) -> Vec<[u8; 32]> {
        self.typed_digests.lock().unwrap().clone()
    }

    pub fn gas_requests(&self) -> Vec<GasEstimateRequest> {
        self.gas_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Signer for MemorySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_message(
        &self,
        message: &[u8],
        cancel: &CancellationToken,
    ) -> Result<SignatureBytes> {
        if cancel.is_cancelled() {
            return Err(RelayError::Cancelled);
        }
        self.messages.lock().unwrap().push(message.to_vec());
        Ok(self.signature)
    }

    async fn sign_typed_data(
        &self,
        typed_data: &TypedData,
        cancel: &CancellationToken,
    ) -> Result<SignatureBytes> {
        if cancel.is_cancelled() {
            return Err(RelayError::Cancelled);
        }
        self.typed_digests
            .lock()
            .unwrap()
            .push(typed_data.signing_hash());
        Ok(self.signature)
    }

    async fn estimate_gas(
        &self,
        request: &GasEstimateRequest,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(RelayError::Cancelled);
        }
        self.gas_requests.lock().unwrap().push(request.clone());
        match &self.gas {
            GasAnswer::Fixed(gas) => Ok(*gas),
            GasAnswer::Fail(reason) => Err(RelayError::Other(reason.clone())),
            GasAnswer::Unsupported => Err(RelayError::MissingCapability("gas estimator")),
        }
    }
}
