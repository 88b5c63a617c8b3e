//! Mock consensus registry for testing
//!
//! Nodes are registered by the test with a fixed capacity. Delegations are
//! held by the mock and paid back to the caller on undelegate, unless the
//! registry has been frozen.

use odra::casper_types::{PublicKey, U512};
use odra::prelude::*;
use odra::ContractRef;

use pocm::consensus_registry::AgentInfo;
use pocm::pool::PocmPoolContractRef;

#[odra::odra_type]
pub struct MockNode {
    pub depositor: Address,
    pub node_value: U512,
    pub capacity: U512,
}

#[odra::module]
pub struct MockConsensusRegistry {
    nodes: Mapping<PublicKey, Option<MockNode>>,
    delegated: Mapping<PublicKey, U512>,
    frozen: Var<bool>,
}

#[odra::module]
impl MockConsensusRegistry {
    pub fn init(&mut self) {
        self.frozen.set(false);
    }

    // Test helper to create a node
    pub fn register_node(
        &mut self,
        agent: PublicKey,
        depositor: Address,
        node_value: U512,
        capacity: U512,
    ) {
        self.nodes.set(
            &agent,
            Some(MockNode {
                depositor,
                node_value,
                capacity,
            }),
        );
    }

    pub fn agent_info(&self, agent: PublicKey) -> Option<AgentInfo> {
        self.nodes.get(&agent).flatten().map(|node| AgentInfo {
            depositor: node.depositor,
            node_value: node.node_value,
        })
    }

    pub fn remaining_capacity(&self, agent: PublicKey) -> U512 {
        match self.nodes.get(&agent).flatten() {
            Some(node) => node
                .capacity
                .saturating_sub(self.delegated.get(&agent).unwrap_or_default()),
            None => U512::zero(),
        }
    }

    /// Accepts up to the remaining capacity and refunds the rest
    #[odra(payable)]
    pub fn delegate(&mut self, agent: PublicKey, amount: U512) -> U512 {
        let attached = self.env().attached_value();
        let offered = if amount < attached { amount } else { attached };
        let remaining = self.remaining_capacity(agent.clone());
        let accepted = if offered < remaining { offered } else { remaining };

        let current = self.delegated.get(&agent).unwrap_or_default();
        self.delegated.set(&agent, current + accepted);

        let refund = attached - accepted;
        if !refund.is_zero() {
            self.env().transfer_tokens(&self.env().caller(), &refund);
        }
        accepted
    }

    pub fn undelegate(&mut self, agent: PublicKey, amount: U512) {
        let current = self.delegated.get(&agent).unwrap_or_default();
        self.delegated.set(&agent, current.saturating_sub(amount));
        if !self.frozen.get_or_default() {
            self.env().transfer_tokens(&self.env().caller(), &amount);
        }
    }

    // Test helper: keep undelegated funds instead of paying them back
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen.set(frozen);
    }

    // Test helper: forward the attached value to the pool as a block reward
    #[odra(payable)]
    pub fn distribute_reward(&mut self, pool: Address) {
        let amount = self.env().attached_value();
        PocmPoolContractRef::new(self.env(), pool)
            .with_tokens(amount)
            .credit_block_reward();
    }

    pub fn delegated_to(&self, agent: PublicKey) -> U512 {
        self.delegated.get(&agent).unwrap_or_default()
    }
}
