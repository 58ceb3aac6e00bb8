//! Proxy-wallet requests relayed through the relay hub.
//!
//! The signed message is not EIP-712:
//!
//! keccak256("rlx:" ‖ from ‖ to ‖ data ‖ fee ‖ gasPrice ‖ gasLimit ‖ nonce ‖ relayHub ‖ relay)
//!
//! with addresses as raw 20 bytes and integers as 32-byte big-endian words.

use alloy_primitives::{Address, U256};
use relayer_crypto::{derive_proxy_address, keccak256};
use relayer_signer::{GasEstimateRequest, Signer};
use relayer_types::{
    bytes_to_hex, decode_hex, format_address, parse_address, parse_u256, ProxyContractConfig,
    ProxyTransactionArgs, RelayError, Result, SignatureParams, TransactionRequest,
    TransactionType,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{signing_failed, DEFAULT_GAS_LIMIT};

const RELAY_PREFIX: &[u8] = b"rlx:";

/// Fields hashed into a relay-hub message.
#[derive(Debug, Clone)]
pub struct ProxyHashInput {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
    pub relayer_fee: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub nonce: U256,
    pub relay_hub: Address,
    pub relay: Address,
}

pub fn proxy_struct_hash(input: &ProxyHashInput) -> [u8; 32] {
    let mut buf = Vec::with_capacity(RELAY_PREFIX.len() + 20 * 4 + 32 * 4 + input.data.len());
    buf.extend_from_slice(RELAY_PREFIX);
    buf.extend_from_slice(input.from.as_slice());
    buf.extend_from_slice(input.to.as_slice());
    buf.extend_from_slice(&input.data);
    buf.extend_from_slice(&input.relayer_fee.to_be_bytes::<32>());
    buf.extend_from_slice(&input.gas_price.to_be_bytes::<32>());
    buf.extend_from_slice(&input.gas_limit.to_be_bytes::<32>());
    buf.extend_from_slice(&input.nonce.to_be_bytes::<32>());
    buf.extend_from_slice(input.relay_hub.as_slice());
    buf.extend_from_slice(input.relay.as_slice());
    keccak256(&buf)
}

/// Caller's gas limit when nonzero, else the signer's estimate, else the default.
async fn resolve_gas_limit(
    signer: &dyn Signer,
    args: &ProxyTransactionArgs,
    request: GasEstimateRequest,
    cancel: &CancellationToken,
) -> Result<String> {
    if !args.gas_limit.is_empty() && args.gas_limit != "0" {
        return Ok(args.gas_limit.clone());
    }
    match signer.estimate_gas(&request, cancel).await {
        Ok(gas) => Ok(gas.to_string()),
        Err(RelayError::Cancelled) => Err(RelayError::Cancelled),
        Err(e) => {
            warn!(error = %e, fallback = DEFAULT_GAS_LIMIT, "gas estimation failed, using default gas limit");
            Ok(DEFAULT_GAS_LIMIT.to_string())
        }
    }
}

/// Sign and assemble a proxy-wallet request. The signature is sent raw.
#[instrument(skip_all, fields(from = %args.from, nonce = %args.nonce))]
pub async fn build_proxy_transaction_request(
    signer: &dyn Signer,
    args: &ProxyTransactionArgs,
    config: &ProxyContractConfig,
    metadata: Option<String>,
    cancel: &CancellationToken,
) -> Result<TransactionRequest> {
    let factory = config
        .proxy_factory
        .ok_or_else(|| RelayError::ConfigUnsupported("proxy factory not configured".into()))?;
    let relay_hub = config
        .relay_hub
        .ok_or_else(|| RelayError::ConfigUnsupported("relay hub not configured".into()))?;

    let from = parse_address("from", &args.from)?;
    let proxy_wallet = derive_proxy_address(&from, Some(&factory))?;
    let data = decode_hex("data", &args.data)?;

    let gas_request = GasEstimateRequest {
        from,
        to: factory,
        data: data.clone(),
    };
    let gas_limit = resolve_gas_limit(signer, args, gas_request, cancel).await?;

    // The wire carries the same decimal values that are hashed.
    let relayer_fee = "0";
    let gas_price = parse_u256("gas_price", &args.gas_price)?;
    let gas_limit = parse_u256("gas_limit", &gas_limit)?;
    let hash = proxy_struct_hash(&ProxyHashInput {
        from,
        to: factory,
        data,
        relayer_fee: parse_u256("relayer_fee", relayer_fee)?,
        gas_price,
        gas_limit,
        nonce: parse_u256("nonce", &args.nonce)?,
        relay_hub,
        relay: parse_address("relay", &args.relay)?,
    });

    let sig = signer
        .sign_message(&hash, cancel)
        .await
        .map_err(|e| signing_failed("sign proxy tx", e))?;
    debug!(proxy_wallet = %proxy_wallet, gas_limit = %gas_limit, "signed proxy transaction");

    Ok(TransactionRequest {
        r#type: TransactionType::Proxy,
        from: args.from.clone(),
        to: format_address(&factory),
        proxy_wallet: Some(format_address(&proxy_wallet)),
        data: args.data.clone(),
        nonce: Some(args.nonce.clone()),
        signature: bytes_to_hex(&sig),
        signature_params: SignatureParams {
            gas_price: Some(gas_price.to_string()),
            gas_limit: Some(gas_limit.to_string()),
            relayer_fee: Some(relayer_fee.to_string()),
            relay_hub: Some(format_address(&relay_hub)),
            relay: Some(args.relay.clone()),
            ..Default::default()
        },
        metadata,
    })
}
