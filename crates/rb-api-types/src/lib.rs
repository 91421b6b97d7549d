use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The deployed contracts a session talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    TokenV1,
    TokenV2,
    Swap,
    Faucet,
}

impl ContractRole {
    pub fn label(self) -> &'static str {
        match self {
            ContractRole::TokenV1 => "rebV1",
            ContractRole::TokenV2 => "rebV2",
            ContractRole::Swap => "swap",
            ContractRole::Faucet => "faucet",
        }
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interface descriptors served alongside the page. Both tokens share one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Token,
    Swap,
    Faucet,
}

impl InterfaceKind {
    pub fn descriptor_path(self) -> &'static str {
        match self {
            InterfaceKind::Token => "abi/erc20.abi.json",
            InterfaceKind::Swap => "abi/rebased-swap.abi.json",
            InterfaceKind::Faucet => "abi/rebased-test-faucet.abi.json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractSpec {
    pub role: ContractRole,
    pub interface: InterfaceKind,
}

/// Contract wiring. Each row is fetched, bound and addressed the same way.
pub const CONTRACTS: [ContractSpec; 4] = [
    ContractSpec {
        role: ContractRole::TokenV1,
        interface: InterfaceKind::Token,
    },
    ContractSpec {
        role: ContractRole::TokenV2,
        interface: InterfaceKind::Token,
    },
    ContractSpec {
        role: ContractRole::Swap,
        interface: InterfaceKind::Swap,
    },
    ContractSpec {
        role: ContractRole::Faucet,
        interface: InterfaceKind::Faucet,
    },
];

/// Method names exposed by the deployed interfaces.
pub mod methods {
    pub const BALANCE_OF: &str = "balanceOf";
    pub const ALLOWANCE: &str = "allowance";
    pub const APPROVE: &str = "approve";
    pub const GET_OUTPUT_AMOUNT: &str = "getOutputAmount";
    pub const SWAP: &str = "swap";
    pub const REQUEST_TOKENS: &str = "requestTokens";
}

/// Contract addresses valid on one chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    #[serde(rename = "rebV1Address")]
    pub reb_v1_address: Address,
    #[serde(rename = "rebV2Address")]
    pub reb_v2_address: Address,
    pub swap_address: Address,
    pub faucet_address: Address,
}

impl ChainConfig {
    pub fn address(&self, role: ContractRole) -> Address {
        match role {
            ContractRole::TokenV1 => self.reb_v1_address,
            ContractRole::TokenV2 => self.reb_v2_address,
            ContractRole::Swap => self.swap_address,
            ContractRole::Faucet => self.faucet_address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractEntry {
    pub role: ContractRole,
    pub address: Address,
    pub descriptor_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownChainInfo {
    pub chain_id: u64,
    pub name: String,
    pub contracts: Vec<ContractEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfigResponse {
    pub chains: Vec<KnownChainInfo>,
    pub token_decimals: u8,
}
