//! Session lifecycle for the rebased swap page.
//!
//! Owns the wallet connection, contract wiring and the approve/swap/faucet
//! flows. Rendering goes through [`SessionView`] so the same controller
//! drives the browser and the tests.

mod controller;
pub mod display;
pub mod policy;
mod view;

#[cfg(test)]
mod testing;

pub use controller::{Action, Balances, Session, SessionController};
pub use policy::{ActionState, ApprovalPolicy, UnknownPolicy, actions_for};
pub use view::{Notice, Region, SessionView};

use rb_chain_client::{ChainError, DEFAULT_POLL_INTERVAL};
use rb_chain_config::{TOKEN_DECIMALS, UnsupportedNetwork};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    ConnectingWallet,
    NetworkCheck,
    ConfiguringContracts,
    AccountBound,
    BalancesLoaded,
    WalletMissing,
    UnsupportedNetwork,
    UserRejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no wallet extension detected")]
    WalletUnavailable,
    #[error(transparent)]
    UnsupportedNetwork(#[from] UnsupportedNetwork),
    #[error("contract call failed: {0}")]
    Call(String),
    #[error("request rejected in wallet")]
    UserRejected,
    #[error("could not load {path}: {reason}")]
    NetworkFetch { path: String, reason: String },
    #[error("token balance is zero")]
    ZeroBalance,
    #[error("no account connected")]
    NotConnected,
    #[error("contracts are not configured")]
    NotConfigured,
}

impl From<ChainError> for SessionError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::WalletUnavailable => SessionError::WalletUnavailable,
            ChainError::UserRejected => SessionError::UserRejected,
            ChainError::DescriptorFetch { path, reason } => SessionError::NetworkFetch { path, reason },
            ChainError::MissingDescriptor { .. } => SessionError::NotConfigured,
            ChainError::NoAccount { .. } => SessionError::NotConnected,
            other => SessionError::Call(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub token_decimals: u8,
    pub approval_policy: ApprovalPolicy,
    pub receipt_poll_interval: Duration,
    /// Prefix for descriptor paths, e.g. `"/static/"`. Empty means page-relative.
    pub descriptor_base: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_decimals: TOKEN_DECIMALS,
            approval_policy: ApprovalPolicy::default(),
            receipt_poll_interval: DEFAULT_POLL_INTERVAL,
            descriptor_base: String::new(),
        }
    }
}
