//! Consensus registry interface
//!
//! The registry owns the consensus nodes (agents) the pool may delegate idle
//! principal to. It reports each node's operator and own bonded value,
//! accepts delegations up to a per-node capacity, releases undelegated funds
//! back to the caller, and forwards block rewards to the pool through
//! `PocmPool::credit_block_reward`.

use odra::casper_types::{PublicKey, U512};
use odra::prelude::*;

/// Registry view of a consensus node
#[odra::odra_type]
pub struct AgentInfo {
    /// Operator that created the node
    pub depositor: Address,
    /// Value the operator bonded to the node
    pub node_value: U512,
}

/// External contract interface of the consensus registry
#[odra::external_contract]
pub trait ConsensusRegistry {
    /// Node details, `None` if the registry does not know `agent`
    fn agent_info(&self, agent: PublicKey) -> Option<AgentInfo>;

    /// How much more the node can accept from the pool
    fn remaining_capacity(&self, agent: PublicKey) -> U512;

    /// Delegate the attached value to `agent`
    ///
    /// # Returns
    /// Amount accepted; any excess attached value is refunded to the caller
    fn delegate(&mut self, agent: PublicKey, amount: U512) -> U512;

    /// Release `amount` of the caller's delegation to `agent` back to the caller
    fn undelegate(&mut self, agent: PublicKey, amount: U512);
}
