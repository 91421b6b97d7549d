//! Wallet-facing side of the swap front-end.
//!
//! `WalletProvider` is the seam to whatever injects accounts and signs
//! transactions (an EIP-1193 extension in the browser, a mock in tests).
//! `ContractProxy` and `TransactionSubmitter` are built on top of it.

mod proxy;
mod submit;

pub use proxy::{ContractDescriptor, ContractProxy, PendingTx};
pub use submit::{DEFAULT_POLL_INTERVAL, TransactionSubmitter};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use rb_api_types::ContractRole;
use std::time::Duration;
use thiserror::Error;

pub type TxHash = B256;

/// EIP-1193 code for a request the user declined in the wallet UI.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("no wallet provider detected")]
    WalletUnavailable,
    #[error("request rejected in wallet")]
    UserRejected,
    #[error("wallet request {method} failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("call failed: {0}")]
    Call(String),
    #[error("{role} contract has no descriptor")]
    MissingDescriptor { role: ContractRole },
    #[error("no account bound to {role} contract")]
    NoAccount { role: ContractRole },
    #[error("{method} is not part of the {role} interface")]
    UnknownMethod { role: ContractRole, method: String },
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },
    #[error("fetching {path} failed: {reason}")]
    DescriptorFetch { path: String, reason: String },
}

impl ChainError {
    /// Classify a raw wallet error code.
    pub fn from_rpc(method: &str, code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            return ChainError::UserRejected;
        }
        ChainError::Rpc {
            method: method.to_owned(),
            code,
            message: message.into(),
        }
    }
}

#[async_trait(?Send)]
pub trait WalletProvider {
    fn is_available(&self) -> bool;
    /// Accounts the user already authorized; never prompts.
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ChainError>;
    /// Prompts the user to connect.
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError>;
    async fn chain_id(&self) -> Result<u64, ChainError>;
    async fn call(&self, request: TxRequest) -> Result<Bytes, ChainError>;
    async fn send_transaction(&self, request: TxRequest) -> Result<TxHash, ChainError>;
    /// `None` while the transaction is still pending.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainError>;
    async fn pause(&self, interval: Duration);
}

/// Where contract interface definitions come from.
#[async_trait(?Send)]
pub trait DescriptorSource {
    async fn fetch(&self, path: &str) -> Result<JsonAbi, ChainError>;
}
