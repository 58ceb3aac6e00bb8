//! Hashing and signature primitives for relayer requests.
//!
//! - `derive`: CREATE2 addresses of Safe and proxy wallets
//! - `eip712`: typed-data digests
//! - `signature`: recovery-byte normalization for Safe signatures

use sha3::{Digest, Keccak256};

pub mod derive;
pub mod eip712;
pub mod signature;

pub use derive::{derive_proxy_address, derive_safe_address};
pub use eip712::{TypedData, TypedDataDomain, TypedField, TypedValue};
pub use signature::{pack_safe_signature, split_signature};

/// keccak256 of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// keccak256 of the EIP-191 personal-message envelope around `message`.
///
/// `"\x19Ethereum Signed Message:\n" ‖ len(message) ‖ message`
pub fn eip191_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_eip191_prefix_changes_digest() {
        let msg = [0x11u8; 32];
        assert_ne!(eip191_hash(&msg), keccak256(msg));

        let mut envelope = b"\x19Ethereum Signed Message:\n32".to_vec();
        envelope.extend_from_slice(&msg);
        assert_eq!(eip191_hash(&msg), keccak256(&envelope));
    }
}
