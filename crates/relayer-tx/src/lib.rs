//! Signed relayer request builders.
//!
//! - Safe transactions: EIP-712 `SafeTx`, signed as a personal message, `v` repacked
//! - Safe creation: EIP-712 `CreateProxy` against the Safe factory
//! - Proxy transactions: `rlx:` relay-hub message, signed as a personal message

use relayer_types::RelayError;

pub mod proxy;
pub mod safe;

pub use proxy::{build_proxy_transaction_request, proxy_struct_hash, ProxyHashInput};
pub use safe::{
    build_safe_create_request, build_safe_transaction_request, safe_create_typed_data,
    safe_tx_typed_data,
};

/// Zero address as sent in signature params.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// EIP-712 domain name of the Safe factory.
pub const SAFE_FACTORY_NAME: &str = "Polymarket Contract Proxy Factory";

/// Gas limit used when the signer cannot estimate one.
pub const DEFAULT_GAS_LIMIT: u64 = 10_000_000;

/// Tag a signer failure with the request being signed. Cancellation stays as is.
pub(crate) fn signing_failed(context: &str, err: RelayError) -> RelayError {
    match err {
        RelayError::Cancelled => RelayError::Cancelled,
        RelayError::SigningFailed(reason) => {
            RelayError::SigningFailed(format!("{context}: {reason}"))
        }
        other => RelayError::SigningFailed(format!("{context}: {other}")),
    }
}
