//! Minimal Solidity ABI plumbing: function selectors and 32-byte words.

use alloy_primitives::{Address, U256};
use relayer_crypto::keccak256;
use relayer_types::{left_pad32, RelayError, Result};

pub const WORD: usize = 32;

/// A function schema identified by its canonical signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAbi {
    signature: String,
    selector: [u8; 4],
}

impl FunctionAbi {
    /// `signature` is canonical, e.g. `multiSend(bytes)`.
    pub fn new(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash[..4]);
        Self {
            signature: signature.to_string(),
            selector,
        }
    }

    pub fn name(&self) -> &str {
        self.signature
            .split('(')
            .next()
            .unwrap_or(self.signature.as_str())
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// Calldata: selector ‖ encoded arguments.
    pub fn call(&self, encoded_args: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + encoded_args.len());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(encoded_args);
        out
    }

    /// Strip and check the selector, returning the argument bytes.
    pub fn arguments<'a>(&self, calldata: &'a [u8]) -> Result<&'a [u8]> {
        if calldata.len() < 4 || calldata[..4] != self.selector {
            return Err(RelayError::invalid_argument(
                "data",
                format!("not a {} call", self.name()),
            ));
        }
        Ok(&calldata[4..])
    }
}

pub fn word_usize(n: usize) -> [u8; 32] {
    U256::from(n).to_be_bytes::<32>()
}

pub fn word_u256(v: &U256) -> [u8; 32] {
    v.to_be_bytes::<32>()
}

pub fn word_address(a: &Address) -> [u8; 32] {
    left_pad32(a.as_slice())
}

/// `bytes` tail: length word, then data right-padded to a word boundary.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&word_usize(data.len()));
    out.extend_from_slice(data);
    out.resize(WORD + padded, 0);
    out
}

/// Bounds-checked reads over ABI-encoded arguments.
pub struct WordReader<'a> {
    buf: &'a [u8],
}

impl<'a> WordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn word(&self, offset: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(WORD)
            .and_then(|end| self.buf.get(offset..end))
            .ok_or_else(|| {
                RelayError::invalid_argument("data", format!("truncated at offset {offset}"))
            })
    }

    pub fn read_u256(&self, offset: usize) -> Result<U256> {
        Ok(U256::from_be_slice(self.word(offset)?))
    }

    fn read_u64(&self, offset: usize) -> Result<u64> {
        let word = self.word(offset)?;
        if word[..24].iter().any(|b| *b != 0) {
            return Err(RelayError::invalid_argument(
                "data",
                format!("integer at offset {offset} out of range"),
            ));
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[24..]);
        Ok(u64::from_be_bytes(low))
    }

    pub fn read_usize(&self, offset: usize) -> Result<usize> {
        let v = self.read_u64(offset)?;
        usize::try_from(v)
            .map_err(|_| RelayError::invalid_argument("data", format!("length {v} out of range")))
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        let v = self.read_u64(offset)?;
        u8::try_from(v)
            .map_err(|_| RelayError::invalid_argument("data", format!("{v} is not a uint8")))
    }

    pub fn read_address(&self, offset: usize) -> Result<Address> {
        let word = self.word(offset)?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(RelayError::invalid_argument(
                "data",
                format!("dirty address word at offset {offset}"),
            ));
        }
        Ok(Address::from_slice(&word[12..]))
    }

    /// `bytes` whose length word sits at `offset`.
    pub fn read_bytes(&self, offset: usize) -> Result<Vec<u8>> {
        let len = self.read_usize(offset)?;
        let start = offset + WORD;
        start
            .checked_add(len)
            .and_then(|end| self.buf.get(start..end))
            .map(|b| b.to_vec())
            .ok_or_else(|| RelayError::invalid_argument("data", "bytes run past end of input"))
    }

    /// Reader rebased at `offset`, for nested dynamic types.
    pub fn at(&self, offset: usize) -> Result<WordReader<'a>> {
        self.buf
            .get(offset..)
            .map(WordReader::new)
            .ok_or_else(|| RelayError::invalid_argument("data", "offset past end of input"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        assert_eq!(hex::encode(FunctionAbi::new("multiSend(bytes)").selector()), "8d80ff0a");
        assert_eq!(
            hex::encode(FunctionAbi::new("proxy((uint8,address,uint256,bytes)[])").selector()),
            "34ee9791"
        );
        assert_eq!(FunctionAbi::new("multiSend(bytes)").name(), "multiSend");
    }

    #[test]
    fn test_encode_bytes_padding() {
        assert_eq!(encode_bytes(&[]), word_usize(0).to_vec());

        let enc = encode_bytes(&[0xab; 33]);
        assert_eq!(enc.len(), 32 + 64);
        assert_eq!(enc[..32], word_usize(33));
        assert!(enc[32 + 33..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_reader_bounds() {
        let buf = word_usize(5);
        let reader = WordReader::new(&buf);
        assert_eq!(reader.read_usize(0).unwrap(), 5);
        assert!(reader.read_u256(1).is_err());
        assert!(reader.read_bytes(0).is_err());
        assert!(reader.read_u256(usize::MAX - 4).is_err());
    }

    #[test]
    fn test_arguments_checks_selector() {
        let abi = FunctionAbi::new("multiSend(bytes)");
        let data = abi.call(&[1, 2, 3]);
        assert_eq!(abi.arguments(&data).unwrap(), &[1u8, 2, 3]);
        assert!(abi.arguments(&[0, 0, 0, 0]).is_err());
        assert!(abi.arguments(&[0x8d]).is_err());
    }
}
