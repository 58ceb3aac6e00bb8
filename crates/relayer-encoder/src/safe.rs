//! Safe multisend packing.
//!
//! Each call is packed with no separators:
//! operation (1) ‖ to (20) ‖ value (32) ‖ data length (32) ‖ data

use relayer_types::{decode_hex, left_pad32, parse_address, parse_u256, Result, SafeTransaction};

use crate::abi::word_usize;

/// Packed `transactions` argument of `multiSend(bytes)`.
pub fn pack_multisend(txns: &[SafeTransaction]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for txn in txns {
        let to = parse_address("to", &txn.to)?;
        let value = parse_u256("value", &txn.value)?;
        let data = decode_hex("data", &txn.data)?;

        out.push(u8::from(txn.operation));
        out.extend_from_slice(to.as_slice());
        out.extend_from_slice(&left_pad32(&value.to_be_bytes::<32>()));
        out.extend_from_slice(&word_usize(data.len()));
        out.extend_from_slice(&data);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayer_types::{OperationType, RelayError};

    fn txn(to: &str, value: &str, data: &str) -> SafeTransaction {
        SafeTransaction {
            to: to.into(),
            operation: OperationType::Call,
            data: data.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_layout() {
        let packed = pack_multisend(&[
            txn("0x1111111111111111111111111111111111111111", "0x10", "0xdeadbeef"),
            txn("0x2222222222222222222222222222222222222222", "", ""),
        ])
        .unwrap();

        // First record: 1 + 20 + 32 + 32 + 4 bytes.
        assert_eq!(packed.len(), 89 + 85);
        assert_eq!(packed[0], 0);
        assert_eq!(&packed[1..21], &[0x11; 20]);
        assert_eq!(packed[52], 0x10);
        assert_eq!(packed[84], 4);
        assert_eq!(&packed[85..89], &[0xde, 0xad, 0xbe, 0xef]);

        // Second record starts right after, zero value and empty data.
        assert_eq!(&packed[90..110], &[0x22; 20]);
        assert!(packed[110..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_delegatecall_operation_byte() {
        let mut t = txn("0x1111111111111111111111111111111111111111", "0", "0x");
        t.operation = OperationType::DelegateCall;
        assert_eq!(pack_multisend(&[t]).unwrap()[0], 1);
    }

    #[test]
    fn test_malformed_value_names_field() {
        let err = pack_multisend(&[txn(
            "0x1111111111111111111111111111111111111111",
            "12abc",
            "0x",
        )])
        .unwrap_err();
        match err {
            RelayError::InvalidArgument { field, .. } => assert_eq!(field, "value"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
