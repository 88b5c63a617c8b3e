//! Events for the POCM mining pool (CEP-88 compliant)

use odra::casper_types::{PublicKey, U512};
use odra::prelude::*;

/// Emitted when a user deposits CSPR into the mining pool
#[odra::event]
pub struct DepositDetail {
    pub user: Address,
    pub attached: U512,
    pub principal_added: U512,
    pub refunded: U512,
    pub block: u64,
}

/// Emitted when a user withdraws principal
#[odra::event]
pub struct Withdrawn {
    pub user: Address,
    pub amount: U512,
    pub remaining_principal: U512,
}

/// Emitted when a user withdraws principal and forfeits pending rewards
#[odra::event]
pub struct EmergencyWithdrawn {
    pub user: Address,
    pub amount: U512,
}

/// Emitted when mining rewards are paid under a time lock
#[odra::event]
pub struct RewardPaid {
    pub user: Address,
    pub amount: U512,
    pub unlock_at: u64,
}

/// Emitted when the accepting-deposits flag changes
#[odra::event]
pub struct AcceptingDepositsChanged {
    pub accepting: bool,
    pub reward_balance: U512,
}

/// Emitted when the reward supply cap is raised
#[odra::event]
pub struct RewardSupplyIncreased {
    pub old_cap: U512,
    pub new_cap: U512,
}

/// Emitted when CSPR is added to the native reward reserve
#[odra::event]
pub struct NativeRewardsFunded {
    pub from: Address,
    pub amount: U512,
    pub reserve: U512,
}

/// Emitted when matured native reward grants are released
#[odra::event]
pub struct LockedRewardsReleased {
    pub user: Address,
    pub amount: U512,
}

/// Emitted when admin is transferred
#[odra::event]
pub struct AdminTransferred {
    pub old_admin: Address,
    pub new_admin: Address,
}

// ============ CONSENSUS EVENTS ============

/// Emitted when consensus delegation is switched on
#[odra::event]
pub struct ConsensusEnabled {
    pub registry: Address,
    pub min_join_deposit: U512,
}

/// Emitted when a consensus agent is registered with the pool
#[odra::event]
pub struct AgentRegistered {
    pub agent: PublicKey,
    pub depositor: Address,
    pub node_value: U512,
    pub reward_eligible: bool,
}

/// Emitted when a consensus agent is removed from the pool
#[odra::event]
pub struct AgentRemoved {
    pub agent: PublicKey,
    pub depositor: Address,
    pub emergency: bool,
}

/// Emitted when idle funds are delegated to an agent
#[odra::event]
pub struct FundsDelegated {
    pub agent: PublicKey,
    pub amount: U512,
}

/// Emitted when delegated funds are released from an agent
#[odra::event]
pub struct FundsUndelegated {
    pub agent: PublicKey,
    pub amount: U512,
}

/// Emitted when the registry credits a block reward
#[odra::event]
pub struct ConsensusAwardCredited {
    pub amount: U512,
    pub available_award: U512,
}

/// Emitted when the accumulated consensus award is paid out
#[odra::event]
pub struct ConsensusAwardTransferred {
    pub beneficiary: Address,
    pub amount: U512,
}

// ============ TOKEN EVENTS ============

/// Emitted when reward tokens are moved into a time lock
#[odra::event]
pub struct TokensLocked {
    pub from: Address,
    pub to: Address,
    pub amount: U512,
    pub unlock_at: u64,
}

/// Emitted when matured locked tokens return to their owner
#[odra::event]
pub struct TokensReleased {
    pub owner: Address,
    pub amount: U512,
}
