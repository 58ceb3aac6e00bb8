//! EIP-712 typed-data hashing for flat structs.
//!
//! digest = keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))
//!
//! Both relayer messages (`SafeTx`, `CreateProxy`) are flat: every member is an
//! atomic type or `bytes`/`string`, so no referenced struct types are needed.

use alloy_primitives::{Address, U256};
use relayer_types::left_pad32;

use crate::keccak256;

/// Member value of a typed-data struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Address(Address),
    Uint(U256),
    Bytes(Vec<u8>),
    String(String),
}

impl TypedValue {
    /// 32-byte `encodeData` word for this member.
    fn encode(&self) -> [u8; 32] {
        match self {
            Self::Address(a) => left_pad32(a.as_slice()),
            Self::Uint(v) => v.to_be_bytes::<32>(),
            Self::Bytes(b) => keccak256(b),
            Self::String(s) => keccak256(s.as_bytes()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedField {
    pub name: String,
    /// Solidity type as it appears in the type string, e.g. `uint8`.
    pub sol_type: String,
    pub value: TypedValue,
}

impl TypedField {
    pub fn new(name: &str, sol_type: &str, value: TypedValue) -> Self {
        Self {
            name: name.to_string(),
            sol_type: sol_type.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDataDomain {
    pub name: Option<String>,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl TypedDataDomain {
    fn fields(&self) -> Vec<TypedField> {
        let mut fields = Vec::with_capacity(3);
        if let Some(name) = &self.name {
            fields.push(TypedField::new("name", "string", TypedValue::String(name.clone())));
        }
        fields.push(TypedField::new(
            "chainId",
            "uint256",
            TypedValue::Uint(U256::from(self.chain_id)),
        ));
        fields.push(TypedField::new(
            "verifyingContract",
            "address",
            TypedValue::Address(self.verifying_contract),
        ));
        fields
    }

    pub fn separator(&self) -> [u8; 32] {
        hash_struct("EIP712Domain", &self.fields())
    }
}

/// A domain plus one flat primary struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
    pub domain: TypedDataDomain,
    pub primary_type: String,
    pub fields: Vec<TypedField>,
}

impl TypedData {
    pub fn encode_type(&self) -> String {
        encode_type(&self.primary_type, &self.fields)
    }

    pub fn struct_hash(&self) -> [u8; 32] {
        hash_struct(&self.primary_type, &self.fields)
    }

    /// The digest a signer signs.
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(66);
        buf.extend_from_slice(&[0x19, 0x01]);
        buf.extend_from_slice(&self.domain.separator());
        buf.extend_from_slice(&self.struct_hash());
        keccak256(&buf)
    }
}

fn encode_type(name: &str, fields: &[TypedField]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.sol_type, f.name))
        .collect();
    format!("{}({})", name, members.join(","))
}

fn hash_struct(name: &str, fields: &[TypedField]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(32 * (fields.len() + 1));
    buf.extend_from_slice(&keccak256(encode_type(name, fields).as_bytes()));
    for field in fields {
        buf.extend_from_slice(&field.value.encode());
    }
    keccak256(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_domain_type_string_with_and_without_name() {
        let mut domain = TypedDataDomain {
            name: Some("Factory".into()),
            chain_id: 137,
            verifying_contract: Address::ZERO,
        };
        assert_eq!(
            encode_type("EIP712Domain", &domain.fields()),
            "EIP712Domain(string name,uint256 chainId,address verifyingContract)"
        );
        domain.name = None;
        assert_eq!(
            encode_type("EIP712Domain", &domain.fields()),
            "EIP712Domain(uint256 chainId,address verifyingContract)"
        );
    }

    #[test]
    fn test_create_proxy_digest_vector() {
        let typed = TypedData {
            domain: TypedDataDomain {
                name: Some("Polymarket Contract Proxy Factory".into()),
                chain_id: 137,
                verifying_contract: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
            },
            primary_type: "CreateProxy".into(),
            fields: vec![
                TypedField::new("paymentToken", "address", TypedValue::Address(Address::ZERO)),
                TypedField::new("payment", "uint256", TypedValue::Uint(U256::ZERO)),
                TypedField::new("paymentReceiver", "address", TypedValue::Address(Address::ZERO)),
            ],
        };
        assert_eq!(
            typed.encode_type(),
            "CreateProxy(address paymentToken,uint256 payment,address paymentReceiver)"
        );
        assert_eq!(
            hex::encode(typed.signing_hash()),
            "563ac315294c5be01ab1f3b04a5abdfa39e8317a9d90679d4e63caf760b126a4"
        );
    }

    #[test]
    fn test_bytes_members_are_hashed() {
        let a = TypedValue::Bytes(vec![0x09, 0x5e, 0xa7, 0xb3]).encode();
        assert_eq!(a, keccak256([0x09u8, 0x5e, 0xa7, 0xb3]));
        assert_eq!(TypedValue::Bytes(vec![]).encode(), keccak256(b""));
    }
}
