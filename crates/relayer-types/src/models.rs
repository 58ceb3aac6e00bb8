//! Caller-facing calls and the JSON shapes exchanged with the relayer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Hex;

/// Smart-contract wallet architecture a client submits through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WalletStyle {
    #[default]
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "PROXY")]
    Proxy,
}

impl WalletStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Proxy => "PROXY",
        }
    }
}

/// Type tag of a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "PROXY")]
    Proxy,
    #[serde(rename = "SAFE-CREATE")]
    SafeCreate,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Proxy => "PROXY",
            Self::SafeCreate => "SAFE-CREATE",
        }
    }
}

/// One on-chain call requested by the caller.
///
/// `value` is decimal or `0x` hex; empty means zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub to: String,
    pub data: Hex,
    pub value: String,
}

impl Call {
    pub fn new(to: impl Into<String>, data: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            data: data.into(),
            value: value.into(),
        }
    }
}

/// Safe `operation` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OperationType {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl From<OperationType> for u8 {
    fn from(op: OperationType) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for OperationType {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(format!("unknown operation type {other}")),
        }
    }
}

/// Proxy-wallet call type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CallType {
    Invalid = 0,
    #[default]
    Call = 1,
    DelegateCall = 2,
}

impl From<CallType> for u8 {
    fn from(c: CallType) -> u8 {
        c as u8
    }
}

impl TryFrom<u8> for CallType {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Invalid),
            1 => Ok(Self::Call),
            2 => Ok(Self::DelegateCall),
            other => Err(format!("unknown call type {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub to: String,
    pub operation: OperationType,
    pub data: Hex,
    pub value: String,
}

impl From<&Call> for SafeTransaction {
    fn from(call: &Call) -> Self {
        Self {
            to: call.to.clone(),
            operation: OperationType::Call,
            data: call.data.clone(),
            value: non_empty_value(&call.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyTransaction {
    pub to: String,
    #[serde(rename = "typeCode")]
    pub type_code: CallType,
    pub data: Hex,
    pub value: String,
}

impl From<&Call> for ProxyTransaction {
    fn from(call: &Call) -> Self {
        Self {
            to: call.to.clone(),
            type_code: CallType::Call,
            data: call.data.clone(),
            value: non_empty_value(&call.value),
        }
    }
}

fn non_empty_value(value: &str) -> String {
    if value.is_empty() {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Inputs hashed for a Safe transaction signature.
#[derive(Debug, Clone)]
pub struct SafeTransactionArgs {
    pub from: String,
    pub nonce: String,
    pub chain_id: u64,
    pub transactions: Vec<SafeTransaction>,
}

/// Inputs hashed for a Safe deployment signature.
#[derive(Debug, Clone)]
pub struct SafeCreateTransactionArgs {
    pub from: String,
    pub chain_id: u64,
    pub payment_token: String,
    pub payment: String,
    pub payment_receiver: String,
}

/// Inputs hashed for a proxy-wallet relay signature.
#[derive(Debug, Clone, Default)]
pub struct ProxyTransactionArgs {
    pub from: String,
    pub nonce: String,
    pub gas_price: String,
    /// Empty or "0" asks the signer's gas estimator.
    pub gas_limit: String,
    pub data: Hex,
    pub relay: String,
}

/// Style-specific parameters the relayer needs to verify a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,

    // Proxy relay hub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relayer_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_hub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<String>,

    // Safe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_txn_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<String>,

    // Safe creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_receiver: Option<String>,
}

/// Signed request body for `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub from: String,
    pub to: String,
    #[serde(rename = "proxyWallet", skip_serializing_if = "Option::is_none")]
    pub proxy_wallet: Option<String>,
    pub data: Hex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub signature: Hex,
    #[serde(rename = "signatureParams")]
    pub signature_params: SignatureParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayerTransactionState {
    #[serde(rename = "STATE_NEW")]
    New,
    #[serde(rename = "STATE_EXECUTED")]
    Executed,
    #[serde(rename = "STATE_MINED")]
    Mined,
    #[serde(rename = "STATE_INVALID")]
    Invalid,
    #[serde(rename = "STATE_CONFIRMED")]
    Confirmed,
    #[serde(rename = "STATE_FAILED")]
    Failed,
}

/// Missing keys and JSON `null` both decode to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Relayer-owned record of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerTransaction {
    #[serde(rename = "transactionID", default, deserialize_with = "null_as_default")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transaction_hash: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proxy_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nonce: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    pub state: RelayerTransactionState,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub r#type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response to `POST /submit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerTransactionResponse {
    #[serde(rename = "transactionID", default, deserialize_with = "null_as_default")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(rename = "transactionHash", default, deserialize_with = "null_as_default")]
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoncePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nonce: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nonce: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub deployed: bool,
}
