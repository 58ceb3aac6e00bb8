//! Counterfactual wallet addresses via CREATE2.
//!
//! address = keccak256(0xff ‖ factory ‖ salt ‖ initCodeHash)[12..32]
//!
//! - Proxy salt: keccak256(eoa) over the raw 20 bytes
//! - Safe salt: keccak256(leftPad32(eoa))

use alloy_primitives::{b256, Address, B256};
use relayer_types::{left_pad32, RelayError, Result};

use crate::keccak256;

pub const SAFE_INIT_CODE_HASH: B256 =
    b256!("2bce2127ff07fb632d16c8347c4ebf501f4841168bed00d9e6ef715ddb6fcecf");

pub const PROXY_INIT_CODE_HASH: B256 =
    b256!("d21df8dc65880a8606f09fe0ce3df9b8869287ab0b058be05aa9e8af6330a00b");

/// CREATE2 address for `deployer`, `salt` and `init_code_hash`.
pub fn create2_address(deployer: &Address, salt: &[u8; 32], init_code_hash: &B256) -> Address {
    let mut bytes = Vec::with_capacity(1 + 20 + 32 + 32);
    bytes.push(0xff);
    bytes.extend_from_slice(deployer.as_slice());
    bytes.extend_from_slice(salt);
    bytes.extend_from_slice(init_code_hash.as_slice());

    let hash = keccak256(&bytes);
    Address::from_slice(&hash[12..])
}

/// Safe wallet address owned by `eoa`.
pub fn derive_safe_address(eoa: &Address, safe_factory: Option<&Address>) -> Result<Address> {
    let factory = safe_factory
        .ok_or_else(|| RelayError::ConfigUnsupported("safe factory not configured".into()))?;
    let salt = keccak256(left_pad32(eoa.as_slice()));
    Ok(create2_address(factory, &salt, &SAFE_INIT_CODE_HASH))
}

/// Proxy wallet address owned by `eoa`.
pub fn derive_proxy_address(eoa: &Address, proxy_factory: Option<&Address>) -> Result<Address> {
    let factory = proxy_factory
        .ok_or_else(|| RelayError::ConfigUnsupported("proxy factory not configured".into()))?;
    let salt = keccak256(eoa.as_slice());
    Ok(create2_address(factory, &salt, &PROXY_INIT_CODE_HASH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const EOA: Address = address!("1234567890123456789012345678901234567890");
    const SAFE_FACTORY: Address = address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b");
    const PROXY_FACTORY: Address = address!("aB45c5A4B0c941a2F231C04C3f49182e1A254052");

    #[test]
    fn test_safe_address_vector() {
        let safe = derive_safe_address(&EOA, Some(&SAFE_FACTORY)).unwrap();
        assert_eq!(safe.to_checksum(None), "0x2B8662B8De7996adFd6d782343e0157E805e6b36");
    }

    #[test]
    fn test_proxy_address_vector() {
        let proxy = derive_proxy_address(&EOA, Some(&PROXY_FACTORY)).unwrap();
        assert_eq!(proxy.to_checksum(None), "0xaEe8aa28f3F3dD7Fe83E6D2d5c0d64d2c2e2bEed");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_safe_address(&EOA, Some(&SAFE_FACTORY)).unwrap();
        let b = derive_safe_address(&EOA, Some(&SAFE_FACTORY)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_factory_changes_address() {
        let other = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        assert_ne!(
            derive_safe_address(&EOA, Some(&SAFE_FACTORY)).unwrap(),
            derive_safe_address(&EOA, Some(&other)).unwrap()
        );
        assert_ne!(
            derive_proxy_address(&EOA, Some(&PROXY_FACTORY)).unwrap(),
            derive_proxy_address(&EOA, Some(&other)).unwrap()
        );
    }

    #[test]
    fn test_styles_use_different_salts() {
        // Same factory, same owner: the padding convention alone separates the two.
        assert_ne!(
            derive_safe_address(&EOA, Some(&SAFE_FACTORY)).unwrap(),
            derive_proxy_address(&EOA, Some(&SAFE_FACTORY)).unwrap()
        );
    }

    #[test]
    fn test_missing_factory() {
        assert!(matches!(
            derive_safe_address(&EOA, None),
            Err(RelayError::ConfigUnsupported(_))
        ));
        assert!(matches!(
            derive_proxy_address(&EOA, None),
            Err(RelayError::ConfigUnsupported(_))
        ));
    }
}
