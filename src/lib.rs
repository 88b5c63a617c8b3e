//! POCM - Proof-of-Contribution Mining for Casper Network
//!
//! This crate provides a mining pool where users can:
//! - Lock CSPR and mine a reward asset pro rata to their stake
//! - Receive rewards as time-locked grants (native CSPR or a CEP-18 token)
//! - Have idle principal delegated to registered consensus agents
//! - Let the pool collect consensus block rewards in a separate ledger

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod accrual;
pub mod consensus;
pub mod consensus_registry;
pub mod errors;
pub mod events;
pub mod pool;
pub mod reward_source;
pub mod reward_token;
pub mod stake;
pub mod total_deposit;

// Re-export main types for external use
pub use accrual::{PoolState, ACC_PRECISION};
pub use consensus::AgentRecord;
pub use consensus_registry::AgentInfo;
pub use errors::*;
pub use events::*;
pub use pool::PocmPool;
pub use reward_source::{LockedReward, RewardAsset};
pub use reward_token::PocmToken;
pub use stake::UserStake;

// Re-export generated types only when not building for wasm32 target
#[cfg(not(target_arch = "wasm32"))]
pub use pool::{PocmPoolHostRef, PocmPoolInitArgs};
#[cfg(not(target_arch = "wasm32"))]
pub use reward_token::{PocmTokenHostRef, PocmTokenInitArgs};
