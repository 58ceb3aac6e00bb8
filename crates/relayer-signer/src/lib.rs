//! Signing capability used by the request builders.
//!
//! Defines the `Signer` trait every key backend must implement, and the
//! `GasEstimator` trait a signer can delegate `estimate_gas` to.
//! Provides a `LocalSigner` over a raw secp256k1 key and a `MemorySigner`
//! for testing.

use alloy_primitives::Address;
use async_trait::async_trait;
use relayer_crypto::TypedData;
use relayer_types::Result;
use tokio_util::sync::CancellationToken;

pub mod local;
pub mod memory;

pub use local::LocalSigner;
pub use memory::{GasAnswer, MemorySigner};

/// A 65-byte `r ‖ s ‖ v` signature.
pub type SignatureBytes = [u8; 65];

/// Call whose gas usage a signer is asked to estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimateRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

/// Source of gas estimates (usually a JSON-RPC node).
#[async_trait]
pub trait GasEstimator: Send + Sync {
    async fn estimate_gas(
        &self,
        request: &GasEstimateRequest,
        cancel: &CancellationToken,
    ) -> Result<u64>;
}

/// Key holder that produces relayer-verifiable signatures.
///
/// All methods take the caller's cancellation token so remote backends can
/// abandon in-flight work.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> Address;

    /// EIP-191 personal-message signature over `message`.
    async fn sign_message(
        &self,
        message: &[u8],
        cancel: &CancellationToken,
    ) -> Result<SignatureBytes>;

    /// Signature over the EIP-712 digest of `typed_data`.
    async fn sign_typed_data(
        &self,
        typed_data: &TypedData,
        cancel: &CancellationToken,
    ) -> Result<SignatureBytes>;

    async fn estimate_gas(
        &self,
        request: &GasEstimateRequest,
        cancel: &CancellationToken,
    ) -> Result<u64>;
}
