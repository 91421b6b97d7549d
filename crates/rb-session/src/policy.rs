use alloy_primitives::U256;
use std::str::FromStr;
use thiserror::Error;

/// When the approve action takes over from swap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApprovalPolicy {
    /// Allowance does not cover the whole token balance.
    #[default]
    BelowBalance,
    /// No allowance granted at all.
    ZeroOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown approval policy {0:?}, expected below-balance or zero-only")]
pub struct UnknownPolicy(pub String);

impl FromStr for ApprovalPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "below-balance" => Ok(ApprovalPolicy::BelowBalance),
            "zero-only" => Ok(ApprovalPolicy::ZeroOnly),
            other => Err(UnknownPolicy(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    pub approve: bool,
    pub swap: bool,
    pub faucet: bool,
}

impl ActionState {
    pub const LOCKED: ActionState = ActionState {
        approve: false,
        swap: false,
        faucet: false,
    };
}

/// Approve and swap are never enabled together; faucet is always available.
pub fn actions_for(allowance: U256, balance: U256, policy: ApprovalPolicy) -> ActionState {
    let needs_approval = match policy {
        ApprovalPolicy::BelowBalance => allowance < balance,
        ApprovalPolicy::ZeroOnly => allowance.is_zero(),
    };

    ActionState {
        approve: needs_approval,
        swap: !needs_approval,
        faucet: true,
    }
}
