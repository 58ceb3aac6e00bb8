//! Aggregation and encoding of call batches.
//!
//! - Safe: one call passes through; several become a delegatecall to multisend
//! - Proxy: every batch, even a single call, becomes `proxy(calls[])` on the factory

use alloy_primitives::Address;
use relayer_types::{
    bytes_to_hex, decode_hex, format_address, Call, ContractConfig, Hex, OperationType,
    ProxyTransaction, RelayError, Result, SafeTransaction, WalletStyle,
};
use tracing::debug;

pub mod abi;
pub mod proxy;
pub mod safe;

pub use abi::FunctionAbi;
pub use proxy::ProxyCall;
pub use safe::pack_multisend;

pub const MULTISEND_SIGNATURE: &str = "multiSend(bytes)";
pub const PROXY_SIGNATURE: &str = "proxy((uint8,address,uint256,bytes)[])";

/// A batch reduced to the single call a wallet executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedTransaction {
    pub to: String,
    pub data: Hex,
    pub value: String,
    pub operation: OperationType,
}

impl From<SafeTransaction> for AggregatedTransaction {
    fn from(txn: SafeTransaction) -> Self {
        Self {
            to: txn.to,
            data: txn.data,
            value: txn.value,
            operation: txn.operation,
        }
    }
}

/// Holds the two function schemas the relayer understands.
#[derive(Debug, Clone)]
pub struct TransactionEncoder {
    multisend: FunctionAbi,
    proxy: FunctionAbi,
}

impl Default for TransactionEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionEncoder {
    pub fn new() -> Self {
        Self {
            multisend: FunctionAbi::new(MULTISEND_SIGNATURE),
            proxy: FunctionAbi::new(PROXY_SIGNATURE),
        }
    }

    pub fn multisend_abi(&self) -> &FunctionAbi {
        &self.multisend
    }

    pub fn proxy_abi(&self) -> &FunctionAbi {
        &self.proxy
    }

    /// `multiSend(packed)` as a delegatecall from the Safe, value 0.
    pub fn encode_multisend(
        &self,
        txns: &[SafeTransaction],
        multisend: &Address,
    ) -> Result<SafeTransaction> {
        let packed = pack_multisend(txns)?;
        let data = self.multisend.call(&abi::encode_bytes(&packed));
        Ok(SafeTransaction {
            to: format_address(multisend),
            operation: OperationType::DelegateCall,
            data: bytes_to_hex(&data),
            value: "0".to_string(),
        })
    }

    /// Reduce Safe transactions to the one the Safe executes.
    pub fn aggregate_safe(
        &self,
        txns: &[SafeTransaction],
        multisend: Option<&Address>,
    ) -> Result<SafeTransaction> {
        match txns {
            [] => Err(RelayError::invalid_argument("transactions", "empty batch")),
            [single] => Ok(single.clone()),
            many => {
                let multisend = multisend.ok_or_else(|| {
                    RelayError::ConfigUnsupported("safe multisend not configured".into())
                })?;
                debug!(count = many.len(), "packing safe batch into multisend");
                self.encode_multisend(many, multisend)
            }
        }
    }

    /// Calldata for `proxy(calls)`.
    pub fn encode_proxy(&self, txns: &[ProxyTransaction]) -> Result<Hex> {
        let calls = txns
            .iter()
            .map(ProxyCall::try_from)
            .collect::<Result<Vec<_>>>()?;
        let data = self.proxy.call(&proxy::encode_proxy_arguments(&calls));
        Ok(bytes_to_hex(&data))
    }

    /// Recover the call tuples from `proxy(calls)` calldata.
    pub fn decode_proxy(&self, data: &str) -> Result<Vec<ProxyCall>> {
        let raw = decode_hex("data", data)?;
        proxy::decode_proxy_arguments(self.proxy.arguments(&raw)?)
    }

    /// Reduce a caller batch for the given wallet style.
    pub fn aggregate(
        &self,
        calls: &[Call],
        style: WalletStyle,
        config: &ContractConfig,
    ) -> Result<AggregatedTransaction> {
        if calls.is_empty() {
            return Err(RelayError::invalid_argument("calls", "empty batch"));
        }
        match style {
            WalletStyle::Safe => {
                let txns: Vec<SafeTransaction> = calls.iter().map(SafeTransaction::from).collect();
                let txn = self.aggregate_safe(&txns, config.safe.safe_multisend.as_ref())?;
                Ok(txn.into())
            }
            WalletStyle::Proxy => {
                let factory = config.proxy.proxy_factory.ok_or_else(|| {
                    RelayError::ConfigUnsupported("proxy factory not configured".into())
                })?;
                let txns: Vec<ProxyTransaction> =
                    calls.iter().map(ProxyTransaction::from).collect();
                Ok(AggregatedTransaction {
                    to: format_address(&factory),
                    data: self.encode_proxy(&txns)?,
                    value: "0".to_string(),
                    operation: OperationType::Call,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use relayer_types::CallType;

    const USDC: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
    const CTF: &str = "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045";

    fn polygon() -> ContractConfig {
        ContractConfig::for_chain(137).unwrap()
    }

    #[test]
    fn test_safe_single_call_passes_through() {
        let enc = TransactionEncoder::new();
        let calls = vec![Call::new(USDC, "0x095ea7b3", "5")];
        let agg = enc.aggregate(&calls, WalletStyle::Safe, &polygon()).unwrap();
        assert_eq!(agg.to, USDC);
        assert_eq!(agg.data, "0x095ea7b3");
        assert_eq!(agg.value, "5");
        assert_eq!(agg.operation, OperationType::Call);
    }

    #[test]
    fn test_safe_batch_targets_multisend() {
        let enc = TransactionEncoder::new();
        let config = polygon();
        let calls = vec![Call::new(USDC, "0x095ea7b3", "0"), Call::new(CTF, "0x", "1")];
        let agg = enc.aggregate(&calls, WalletStyle::Safe, &config).unwrap();

        let multisend = config.safe.safe_multisend.unwrap();
        assert_eq!(agg.to, format_address(&multisend));
        assert_eq!(agg.operation, OperationType::DelegateCall);
        assert_eq!(agg.value, "0");
        assert!(agg.data.starts_with("0x8d80ff0a"));

        // selector ‖ offset ‖ length ‖ packed
        let raw = decode_hex("data", &agg.data).unwrap();
        let txns: Vec<SafeTransaction> = calls.iter().map(SafeTransaction::from).collect();
        let packed = pack_multisend(&txns).unwrap();
        assert_eq!(raw[4 + 63] as usize, packed.len());
        assert_eq!(&raw[4 + 64..4 + 64 + packed.len()], packed.as_slice());
    }

    #[test]
    fn test_safe_batch_needs_multisend() {
        let enc = TransactionEncoder::new();
        let calls = vec![Call::new(USDC, "0x", "0"), Call::new(CTF, "0x", "0")];
        let err = enc
            .aggregate(&calls, WalletStyle::Safe, &ContractConfig::default())
            .unwrap_err();
        assert!(matches!(err, RelayError::ConfigUnsupported(_)));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let enc = TransactionEncoder::new();
        for style in [WalletStyle::Safe, WalletStyle::Proxy] {
            match enc.aggregate(&[], style, &polygon()) {
                Err(RelayError::InvalidArgument { field, .. }) => assert_eq!(field, "calls"),
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[test]
    fn test_proxy_always_wraps() {
        let enc = TransactionEncoder::new();
        let config = polygon();
        let calls = vec![Call::new(USDC, "0x095ea7b3", "")];
        let agg = enc.aggregate(&calls, WalletStyle::Proxy, &config).unwrap();

        assert_eq!(agg.to, format_address(&config.proxy.proxy_factory.unwrap()));
        assert_eq!(agg.operation, OperationType::Call);
        assert_eq!(agg.value, "0");
        assert!(agg.data.starts_with("0x34ee9791"));
    }

    #[test]
    fn test_proxy_round_trip() {
        let enc = TransactionEncoder::new();
        let txns = vec![
            ProxyTransaction {
                to: USDC.into(),
                type_code: CallType::Call,
                data: "0x095ea7b3".into(),
                value: "0".into(),
            },
            ProxyTransaction {
                to: CTF.into(),
                type_code: CallType::DelegateCall,
                data: format!("0x{}", "ab".repeat(70)),
                value: "0x1000".into(),
            },
            ProxyTransaction {
                to: USDC.into(),
                type_code: CallType::Call,
                data: "".into(),
                value: "123456789012345678901234567890".into(),
            },
        ];

        let data = enc.encode_proxy(&txns).unwrap();
        let decoded = enc.decode_proxy(&data).unwrap();

        assert_eq!(decoded.len(), txns.len());
        for (call, txn) in decoded.iter().zip(&txns) {
            assert_eq!(call, &ProxyCall::try_from(txn).unwrap());
        }
        assert_eq!(decoded[1].type_code, 2);
        assert_eq!(decoded[1].value, U256::from(0x1000u64));
        assert_eq!(decoded[1].data.len(), 70);
        assert!(decoded[2].data.is_empty());
    }

    #[test]
    fn test_decode_proxy_rejects_other_selector() {
        let enc = TransactionEncoder::new();
        assert!(enc.decode_proxy("0x8d80ff0a").is_err());
    }

    #[test]
    fn test_proxy_malformed_value() {
        let enc = TransactionEncoder::new();
        let calls = vec![Call::new(USDC, "0x", "ten")];
        match enc.aggregate(&calls, WalletStyle::Proxy, &polygon()) {
            Err(RelayError::InvalidArgument { field, .. }) => assert_eq!(field, "value"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
