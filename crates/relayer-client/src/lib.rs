//! Builder relayer client.
//!
//! Submits gasless transactions for a Safe or proxy wallet through the
//! relayer, attributing each submission to a builder:
//! - `RelayClient`: nonce / relay payload / deployment lookups, `execute`, `deploy`
//! - `SubmittedTransaction`: handle returned by a submission, with `wait`
//! - `poll`: polling a transaction until it reaches a terminal state

use relayer_types::{Address, ContractConfig, Result};

pub mod client;
pub mod endpoints;
pub mod poll;
pub mod response;

pub use client::RelayClient;
pub use response::SubmittedTransaction;

pub use relayer_auth::{BuilderConfig, BuilderCredentials, RemoteSignerConfig};
pub use relayer_http::{HttpClient, RequestOptions};
pub use relayer_signer::{GasEstimator, LocalSigner, Signer};
pub use relayer_types::{
    Call, RelayError, RelayerTransaction, RelayerTransactionState, TransactionType, WalletStyle,
};

/// Safe wallet address of `eoa` on `chain_id`.
pub fn derive_safe_address_for_chain(eoa: &Address, chain_id: u64) -> Result<Address> {
    let config = ContractConfig::for_chain(chain_id)?;
    relayer_crypto::derive_safe_address(eoa, config.safe.safe_factory.as_ref())
}

/// Proxy wallet address of `eoa` on `chain_id`.
pub fn derive_proxy_address_for_chain(eoa: &Address, chain_id: u64) -> Result<Address> {
    let config = ContractConfig::for_chain(chain_id)?;
    relayer_crypto::derive_proxy_address(eoa, config.proxy.proxy_factory.as_ref())
}
