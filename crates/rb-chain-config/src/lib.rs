use alloy_primitives::address;
use rb_api_types::{
    CONTRACTS, ChainConfig, ChainConfigResponse, ContractEntry, KnownChainInfo,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAINNET_ID: u64 = 1;
pub const ROPSTEN_ID: u64 = 3;

/// Base-unit decimals of both rebased tokens.
pub const TOKEN_DECIMALS: u8 = 9;

/// Ropsten deployment of the rebased token pair, swap and test faucet.
pub const ROPSTEN: ChainConfig = ChainConfig {
    chain_id: ROPSTEN_ID,
    reb_v1_address: address!("0xfF96067060626Ea33AF23Eb5b188aaA6763E88d6"),
    reb_v2_address: address!("0x9611E3336fb5c84e038a32F6Ad31A25c2D9D0820"),
    swap_address: address!("0x969f3129813738241E9103dbCc0f8837973CD005"),
    faucet_address: address!("0xC84F2c6a2d49951681236abd1A05886b8FB6380D"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported network: chain id {chain_id} has no deployed contracts")]
pub struct UnsupportedNetwork {
    pub chain_id: u64,
}

/// Lookup table from chain id to the contract set deployed there.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainConfig>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChainRegistry {
    pub fn empty() -> Self {
        Self {
            chains: BTreeMap::new(),
        }
    }

    /// Every chain this build ships addresses for. Mainnet is intentionally absent.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ROPSTEN);
        registry
    }

    pub fn register(&mut self, config: ChainConfig) {
        self.chains.insert(config.chain_id, config);
    }

    pub fn resolve(&self, chain_id: u64) -> Result<ChainConfig, UnsupportedNetwork> {
        match self.chains.get(&chain_id) {
            Some(config) => {
                debug!(chain_id, name = chain_name(chain_id), "resolved chain config");
                Ok(*config)
            }
            None => {
                warn!(chain_id, name = chain_name(chain_id), "no contracts configured for chain");
                Err(UnsupportedNetwork { chain_id })
            }
        }
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }

    /// Public description of the table, as served at `/chain/config`.
    pub fn describe(&self) -> ChainConfigResponse {
        let chains = self
            .chains
            .values()
            .map(|config| KnownChainInfo {
                chain_id: config.chain_id,
                name: chain_name(config.chain_id).to_owned(),
                contracts: CONTRACTS
                    .iter()
                    .map(|spec| ContractEntry {
                        role: spec.role,
                        address: config.address(spec.role),
                        descriptor_path: spec.interface.descriptor_path().to_owned(),
                    })
                    .collect(),
            })
            .collect();

        ChainConfigResponse {
            chains,
            token_decimals: TOKEN_DECIMALS,
        }
    }
}

/// Display name for the network label.
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        MAINNET_ID => "Ethereum",
        ROPSTEN_ID => "Ropsten",
        4 => "Rinkeby",
        5 => "Goerli",
        42 => "Kovan",
        11155111 => "Sepolia",
        17000 => "Holesky",
        _ => "Unknown",
    }
}
