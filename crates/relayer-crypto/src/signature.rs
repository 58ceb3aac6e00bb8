//! Recovery-byte handling for 65-byte ECDSA signatures (r ‖ s ‖ v).

use relayer_types::{bytes_to_hex, Hex, RelayError, Result};
use tracing::debug;

pub const SIGNATURE_LENGTH: usize = 65;

/// Split a 65-byte signature into `(r, s, v)`.
pub fn split_signature(sig: &[u8]) -> Result<([u8; 32], [u8; 32], u8)> {
    if sig.len() != SIGNATURE_LENGTH {
        return Err(RelayError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            sig.len()
        )));
    }
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig[0..32]);
    s.copy_from_slice(&sig[32..64]);
    Ok((r, s, sig[64]))
}

/// Repack a signature for the Safe signature verifier.
///
/// Safe treats v ∈ {31, 32} as an `eth_sign` signature over the EIP-191
/// envelope of the transaction hash:
/// - 0/1 → 31/32
/// - 27/28 → 31/32
pub fn pack_safe_signature(sig: &[u8]) -> Result<Hex> {
    let (r, s, v) = split_signature(sig)?;
    let packed_v = match v {
        0 | 1 => v + 31,
        27 | 28 => v + 4,
        other => {
            return Err(RelayError::InvalidSignature(format!(
                "unexpected v value {other}"
            )))
        }
    };
    debug!(original_v = v, packed_v, "packed safe signature");

    let mut packed = Vec::with_capacity(SIGNATURE_LENGTH);
    packed.extend_from_slice(&r);
    packed.extend_from_slice(&s);
    packed.push(packed_v);
    Ok(bytes_to_hex(&packed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig_with_v(v: u8) -> Vec<u8> {
        let mut sig = vec![0xaa; 32];
        sig.extend_from_slice(&[0xbb; 32]);
        sig.push(v);
        sig
    }

    #[test]
    fn test_v_remap_table() {
        for (v, expected) in [(0u8, 31u8), (1, 32), (27, 31), (28, 32)] {
            let packed = pack_safe_signature(&sig_with_v(v)).unwrap();
            let bytes = relayer_types::hex_to_bytes(&packed).unwrap();
            assert_eq!(bytes.len(), 65);
            assert_eq!(bytes[64], expected, "v={v}");
            assert_eq!(&bytes[..32], &[0xaa; 32]);
            assert_eq!(&bytes[32..64], &[0xbb; 32]);
        }
    }

    #[test]
    fn test_unexpected_v_rejected() {
        for v in [2u8, 26, 29, 31, 255] {
            assert!(matches!(
                pack_safe_signature(&sig_with_v(v)),
                Err(RelayError::InvalidSignature(_))
            ));
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(matches!(
            pack_safe_signature(&[0u8; 64]),
            Err(RelayError::InvalidSignature(_))
        ));
    }
}
