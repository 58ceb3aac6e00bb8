//! Safe transaction and Safe creation requests.

use alloy_primitives::{Address, U256};
use relayer_crypto::{
    derive_safe_address, pack_safe_signature, TypedData, TypedDataDomain, TypedField, TypedValue,
};
use relayer_encoder::TransactionEncoder;
use relayer_signer::Signer;
use relayer_types::{
    bytes_to_hex, decode_hex, format_address, parse_address, parse_u256, RelayError, Result,
    SafeContractConfig, SafeCreateTransactionArgs, SafeTransaction, SafeTransactionArgs,
    SignatureParams, TransactionRequest, TransactionType,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{signing_failed, SAFE_FACTORY_NAME, ZERO_ADDRESS};

/// `SafeTx` typed data for `txn` executed by `safe`.
///
/// Gas and refund fields are always zero: the relayer pays.
pub fn safe_tx_typed_data(
    chain_id: u64,
    safe: Address,
    txn: &SafeTransaction,
    nonce: &str,
) -> Result<TypedData> {
    let zero = || TypedValue::Uint(U256::ZERO);
    Ok(TypedData {
        domain: TypedDataDomain {
            name: None,
            chain_id,
            verifying_contract: safe,
        },
        primary_type: "SafeTx".to_string(),
        fields: vec![
            TypedField::new("to", "address", TypedValue::Address(parse_address("to", &txn.to)?)),
            TypedField::new("value", "uint256", TypedValue::Uint(parse_u256("value", &txn.value)?)),
            TypedField::new("data", "bytes", TypedValue::Bytes(decode_hex("data", &txn.data)?)),
            TypedField::new(
                "operation",
                "uint8",
                TypedValue::Uint(U256::from(u8::from(txn.operation))),
            ),
            TypedField::new("safeTxGas", "uint256", zero()),
            TypedField::new("baseGas", "uint256", zero()),
            TypedField::new("gasPrice", "uint256", zero()),
            TypedField::new("gasToken", "address", TypedValue::Address(Address::ZERO)),
            TypedField::new("refundReceiver", "address", TypedValue::Address(Address::ZERO)),
            TypedField::new("nonce", "uint256", TypedValue::Uint(parse_u256("nonce", nonce)?)),
        ],
    })
}

/// Sign and assemble a Safe transaction request.
#[instrument(skip_all, fields(from = %args.from, nonce = %args.nonce, calls = args.transactions.len()))]
pub async fn build_safe_transaction_request(
    signer: &dyn Signer,
    encoder: &TransactionEncoder,
    args: &SafeTransactionArgs,
    config: &SafeContractConfig,
    metadata: Option<String>,
    cancel: &CancellationToken,
) -> Result<TransactionRequest> {
    let txn = encoder.aggregate_safe(&args.transactions, config.safe_multisend.as_ref())?;
    let from = parse_address("from", &args.from)?;
    let safe = derive_safe_address(&from, config.safe_factory.as_ref())?;

    let digest = safe_tx_typed_data(args.chain_id, safe, &txn, &args.nonce)?.signing_hash();
    let sig = signer
        .sign_message(&digest, cancel)
        .await
        .map_err(|e| signing_failed("sign safe tx", e))?;
    let signature = pack_safe_signature(&sig)?;
    debug!(safe = %safe, "signed safe transaction");

    let operation = u8::from(txn.operation).to_string();
    Ok(TransactionRequest {
        r#type: TransactionType::Safe,
        from: args.from.clone(),
        to: txn.to,
        proxy_wallet: Some(format_address(&safe)),
        data: txn.data,
        nonce: Some(args.nonce.clone()),
        signature,
        signature_params: SignatureParams {
            gas_price: Some("0".into()),
            operation: Some(operation),
            safe_txn_gas: Some("0".into()),
            base_gas: Some("0".into()),
            gas_token: Some(ZERO_ADDRESS.into()),
            refund_receiver: Some(ZERO_ADDRESS.into()),
            ..Default::default()
        },
        metadata,
    })
}

/// `CreateProxy` typed data against the Safe factory.
pub fn safe_create_typed_data(
    factory: Address,
    args: &SafeCreateTransactionArgs,
) -> Result<TypedData> {
    Ok(TypedData {
        domain: TypedDataDomain {
            name: Some(SAFE_FACTORY_NAME.to_string()),
            chain_id: args.chain_id,
            verifying_contract: factory,
        },
        primary_type: "CreateProxy".to_string(),
        fields: vec![
            TypedField::new(
                "paymentToken",
                "address",
                TypedValue::Address(parse_address("payment_token", &args.payment_token)?),
            ),
            TypedField::new(
                "payment",
                "uint256",
                TypedValue::Uint(parse_u256("payment", &args.payment)?),
            ),
            TypedField::new(
                "paymentReceiver",
                "address",
                TypedValue::Address(parse_address("payment_receiver", &args.payment_receiver)?),
            ),
        ],
    })
}

/// Sign and assemble a Safe deployment request. The signature is sent raw.
#[instrument(skip_all, fields(from = %args.from, chain_id = args.chain_id))]
pub async fn build_safe_create_request(
    signer: &dyn Signer,
    config: &SafeContractConfig,
    args: &SafeCreateTransactionArgs,
    cancel: &CancellationToken,
) -> Result<TransactionRequest> {
    let factory = config
        .safe_factory
        .ok_or_else(|| RelayError::ConfigUnsupported("safe factory not configured".into()))?;
    let typed = safe_create_typed_data(factory, args)?;
    let sig = signer
        .sign_typed_data(&typed, cancel)
        .await
        .map_err(|e| signing_failed("sign safe create", e))?;

    let from = parse_address("from", &args.from)?;
    let safe = derive_safe_address(&from, Some(&factory))?;
    debug!(safe = %safe, "signed safe creation");

    Ok(TransactionRequest {
        r#type: TransactionType::SafeCreate,
        from: args.from.clone(),
        to: format_address(&factory),
        proxy_wallet: Some(format_address(&safe)),
        data: "0x".to_string(),
        nonce: None,
        signature: bytes_to_hex(&sig),
        signature_params: SignatureParams {
            payment_token: Some(args.payment_token.clone()),
            payment: Some(args.payment.clone()),
            payment_receiver: Some(args.payment_receiver.clone()),
            ..Default::default()
        },
        metadata: None,
    })
}
