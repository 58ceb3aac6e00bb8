//! ABI encoding of `proxy((uint8,address,uint256,bytes)[])` arguments.

use alloy_primitives::{Address, U256};
use relayer_types::{decode_hex, parse_address, parse_u256, ProxyTransaction, RelayError, Result};

use crate::abi::{encode_bytes, word_address, word_u256, word_usize, WordReader, WORD};

/// One decoded `(typeCode, to, value, data)` tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCall {
    pub type_code: u8,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

impl TryFrom<&ProxyTransaction> for ProxyCall {
    type Error = RelayError;

    fn try_from(txn: &ProxyTransaction) -> Result<Self> {
        Ok(Self {
            type_code: u8::from(txn.type_code),
            to: parse_address("to", &txn.to)?,
            value: parse_u256("value", &txn.value)?,
            data: decode_hex("data", &txn.data)?,
        })
    }
}

impl ProxyCall {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 * WORD);
        out.extend_from_slice(&word_usize(self.type_code as usize));
        out.extend_from_slice(&word_address(&self.to));
        out.extend_from_slice(&word_u256(&self.value));
        // Tuple head is four words; `data` follows it.
        out.extend_from_slice(&word_usize(4 * WORD));
        out.extend_from_slice(&encode_bytes(&self.data));
        out
    }
}

/// Encoded arguments (no selector) for a `proxy(calls)` invocation.
pub fn encode_proxy_arguments(calls: &[ProxyCall]) -> Vec<u8> {
    let tuples: Vec<Vec<u8>> = calls.iter().map(ProxyCall::encode).collect();

    let mut out = Vec::new();
    out.extend_from_slice(&word_usize(WORD));
    out.extend_from_slice(&word_usize(calls.len()));

    let mut offset = calls.len() * WORD;
    for tuple in &tuples {
        out.extend_from_slice(&word_usize(offset));
        offset += tuple.len();
    }
    for tuple in tuples {
        out.extend_from_slice(&tuple);
    }
    out
}

/// Inverse of `encode_proxy_arguments`.
pub fn decode_proxy_arguments(args: &[u8]) -> Result<Vec<ProxyCall>> {
    let reader = WordReader::new(args);
    let array = reader.at(reader.read_usize(0)?)?;
    let count = array.read_usize(0)?;
    if count > args.len() / WORD {
        return Err(RelayError::invalid_argument(
            "data",
            format!("call count {count} exceeds input"),
        ));
    }

    let elements = array.at(WORD)?;
    let mut calls = Vec::with_capacity(count);
    for i in 0..count {
        let tuple = elements.at(elements.read_usize(i * WORD)?)?;
        calls.push(ProxyCall {
            type_code: tuple.read_u8(0)?,
            to: tuple.read_address(WORD)?,
            value: tuple.read_u256(2 * WORD)?,
            data: tuple.read_bytes(tuple.read_usize(3 * WORD)?)?,
        });
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_call_layout() {
        let call = ProxyCall {
            type_code: 1,
            to: Address::repeat_byte(0x33),
            value: U256::from(7u64),
            data: vec![0xaa, 0xbb],
        };
        let enc = encode_proxy_arguments(std::slice::from_ref(&call));

        // offset, length, element offset, 4 head words, bytes length, one data word
        assert_eq!(enc.len(), 9 * WORD);
        assert_eq!(enc[..WORD], word_usize(0x20));
        assert_eq!(enc[WORD..2 * WORD], word_usize(1));
        assert_eq!(enc[2 * WORD..3 * WORD], word_usize(0x20));
        assert_eq!(enc[4 * WORD - 1], 1);
        assert_eq!(enc[6 * WORD..7 * WORD], word_usize(0x80));
        assert_eq!(enc[7 * WORD..8 * WORD], word_usize(2));
        assert_eq!(&enc[8 * WORD..8 * WORD + 2], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_empty_batch() {
        let enc = encode_proxy_arguments(&[]);
        assert_eq!(enc.len(), 2 * WORD);
        assert!(decode_proxy_arguments(&enc).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let call = ProxyCall {
            type_code: 1,
            to: Address::ZERO,
            value: U256::ZERO,
            data: vec![1; 40],
        };
        let enc = encode_proxy_arguments(&[call]);
        assert!(decode_proxy_arguments(&enc[..enc.len() - 40]).is_err());
    }

    #[test]
    fn test_decode_rejects_absurd_count() {
        let mut enc = Vec::new();
        enc.extend_from_slice(&word_usize(WORD));
        enc.extend_from_slice(&word_usize(1 << 40));
        assert!(decode_proxy_arguments(&enc).is_err());
    }
}
