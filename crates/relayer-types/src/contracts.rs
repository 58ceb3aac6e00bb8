//! Per-chain contract addresses.
//!
//! - Polygon (137): proxy factory, relay hub, Safe factory, Safe multisend
//! - Amoy (80002): Safe contracts only

use alloy_primitives::{address, Address};

use crate::{RelayError, Result, WalletStyle};

pub const POLYGON_CHAIN_ID: u64 = 137;
pub const AMOY_CHAIN_ID: u64 = 80002;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyContractConfig {
    pub proxy_factory: Option<Address>,
    pub relay_hub: Option<Address>,
}

impl ProxyContractConfig {
    pub fn is_valid(&self) -> bool {
        self.proxy_factory.is_some() && self.relay_hub.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafeContractConfig {
    pub safe_factory: Option<Address>,
    pub safe_multisend: Option<Address>,
}

impl SafeContractConfig {
    pub fn is_valid(&self) -> bool {
        self.safe_factory.is_some() && self.safe_multisend.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractConfig {
    pub proxy: ProxyContractConfig,
    pub safe: SafeContractConfig,
}

const SAFE_FACTORY: Address = address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b");
const SAFE_MULTISEND: Address = address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761");

const POLYGON: ContractConfig = ContractConfig {
    proxy: ProxyContractConfig {
        proxy_factory: Some(address!("aB45c5A4B0c941a2F231C04C3f49182e1A254052")),
        relay_hub: Some(address!("D216153c06E857cD7f72665E0aF1d7D82172F494")),
    },
    safe: SafeContractConfig {
        safe_factory: Some(SAFE_FACTORY),
        safe_multisend: Some(SAFE_MULTISEND),
    },
};

const AMOY: ContractConfig = ContractConfig {
    proxy: ProxyContractConfig {
        proxy_factory: None,
        relay_hub: None,
    },
    safe: SafeContractConfig {
        safe_factory: Some(SAFE_FACTORY),
        safe_multisend: Some(SAFE_MULTISEND),
    },
};

impl ContractConfig {
    /// Look up the contracts deployed on `chain_id`.
    pub fn for_chain(chain_id: u64) -> Result<Self> {
        match chain_id {
            POLYGON_CHAIN_ID => Ok(POLYGON),
            AMOY_CHAIN_ID => Ok(AMOY),
            other => Err(RelayError::ConfigUnsupported(format!("chain id {other}"))),
        }
    }

    pub fn supports(&self, style: WalletStyle) -> bool {
        match style {
            WalletStyle::Safe => self.safe.is_valid(),
            WalletStyle::Proxy => self.proxy.is_valid(),
        }
    }
}
