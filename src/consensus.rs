//! Consensus delegation sub-ledger
//!
//! Idle principal is pooled in `available_amount` and, once it reaches
//! `min_join_deposit`, delegated to registered agents in registration order,
//! each filled up to its remaining capacity. Withdrawals drain the most
//! recently registered agent first. Block rewards credited by the registry
//! accumulate in a separate award ledger.
//!
//! Funds tracked here always satisfy
//! `available_amount + total_delegated() <= TotalDepositLedger::total()`.

use alloc::vec::Vec;
use core::cmp::min;
use odra::casper_types::{PublicKey, U512};
use odra::prelude::*;
use odra::ContractRef;

use crate::consensus_registry::{AgentInfo, ConsensusRegistryContractRef};
use crate::errors::Error;
use crate::events::{FundsDelegated, FundsUndelegated};

/// A consensus agent registered with the pool
#[odra::odra_type]
pub struct AgentRecord {
    /// Node operator; unique across all registered agents
    pub depositor: Address,
    pub node_value: U512,
    pub reward_eligible: bool,
    pub registered_at_block: u64,
}

#[odra::module]
pub struct ConsensusDelegation {
    enabled: Var<bool>,
    registry: Var<Address>,

    available_amount: Var<U512>,
    min_join_deposit: Var<U512>,

    // Registration order, oldest first
    agents: Var<Vec<PublicKey>>,
    records: Mapping<PublicKey, Option<AgentRecord>>,
    agent_of_depositor: Mapping<Address, Option<PublicKey>>,
    delegated: Mapping<PublicKey, U512>,

    available_award: Var<U512>,
    transferred_award: Var<U512>,
}

#[odra::module]
impl ConsensusDelegation {
    /// One-way switch; once enabled the sub-ledger is never torn down
    pub fn enable(&mut self, registry: Address, min_join_deposit: U512) {
        if self.enabled.get_or_default() {
            self.env().revert(Error::ConsensusAlreadyEnabled);
        }
        if min_join_deposit.is_zero() {
            self.env().revert(Error::InvalidParameter);
        }
        self.enabled.set(true);
        self.registry.set(registry);
        self.min_join_deposit.set(min_join_deposit);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get_or_default()
    }

    pub fn require_enabled(&self) {
        if !self.enabled.get_or_default() {
            self.env().revert(Error::ConsensusNotEnabled);
        }
    }

    // ============ AGENTS ============

    /// Ask the registry about `agent`
    pub fn agent_info(&self, agent: PublicKey) -> AgentInfo {
        self.registry_ref()
            .agent_info(agent)
            .unwrap_or_revert_with(&self.env(), Error::UnknownAgent)
    }

    /// Record `agent`, rejecting duplicates and depositor clashes
    pub fn insert_agent(&mut self, agent: PublicKey, record: AgentRecord) {
        if self.records.get(&agent).flatten().is_some() {
            self.env().revert(Error::AgentAlreadyRegistered);
        }
        if self.agent_of_depositor.get(&record.depositor).flatten().is_some() {
            self.env().revert(Error::DepositorConflict);
        }

        self.agent_of_depositor.set(&record.depositor, Some(agent.clone()));
        self.records.set(&agent, Some(record));
        self.delegated.set(&agent, U512::zero());

        let mut agents = self.agents.get_or_default();
        agents.push(agent);
        self.agents.set(agents);
    }

    pub fn agent_record(&self, agent: PublicKey) -> Option<AgentRecord> {
        self.records.get(&agent).flatten()
    }

    /// Forget `agent`, pulling its delegation back into the idle pool
    pub fn remove_agent(&mut self, agent: PublicKey) -> AgentRecord {
        let record = self
            .records
            .get(&agent)
            .flatten()
            .unwrap_or_revert_with(&self.env(), Error::UnknownAgent);

        let delegated = self.delegated.get(&agent).unwrap_or_default();
        self.records.set(&agent, None);
        self.agent_of_depositor.set(&record.depositor, None);
        self.delegated.set(&agent, U512::zero());
        let agents: Vec<PublicKey> = self
            .agents
            .get_or_default()
            .into_iter()
            .filter(|registered| registered != &agent)
            .collect();
        self.agents.set(agents);

        if !delegated.is_zero() {
            let available = self.available_amount.get_or_default();
            self.available_amount.set(available + delegated);
            self.registry_ref().undelegate(agent.clone(), delegated);
            self.env().emit_event(FundsUndelegated {
                agent,
                amount: delegated,
            });
        }

        if self.available_amount.get_or_default() >= self.min_join_deposit.get_or_default() {
            self.delegate_available();
        }
        record
    }

    pub fn agents(&self) -> Vec<PublicKey> {
        self.agents.get_or_default()
    }

    pub fn delegated_to(&self, agent: PublicKey) -> U512 {
        self.delegated.get(&agent).unwrap_or_default()
    }

    pub fn total_delegated(&self) -> U512 {
        self.agents
            .get_or_default()
            .iter()
            .fold(U512::zero(), |total, agent| {
                total + self.delegated.get(agent).unwrap_or_default()
            })
    }

    // ============ FUNDS ============

    /// Add `value` to the idle pool and delegate it once the threshold is met
    pub fn pool_idle_funds(&mut self, value: U512) -> U512 {
        let available = self.available_amount.get_or_default() + value;
        self.available_amount.set(available);
        if available >= self.min_join_deposit.get_or_default() {
            self.delegate_available()
        } else {
            U512::zero()
        }
    }

    /// Delegate idle funds on demand
    pub fn deposit_manually(&mut self) -> U512 {
        if self.available_amount.get_or_default() < self.min_join_deposit.get_or_default() {
            self.env().revert(Error::BelowMinJoinDeposit);
        }
        if self.agents.get_or_default().is_empty() {
            self.env().revert(Error::NoAgentsRegistered);
        }
        let accepted = self.delegate_available();
        if accepted.is_zero() {
            self.env().revert(Error::AgentsFullyDelegated);
        }
        accepted
    }

    /// Make `value` spendable by the contract for a principal withdrawal.
    ///
    /// Idle funds are used first; the shortfall is undelegated, newest agent
    /// first. Reverts when idle plus delegated funds cannot cover `value`.
    pub fn withdraw_up_to(&mut self, value: U512) {
        let available = self.available_amount.get_or_default();
        if available >= value {
            self.available_amount.set(available - value);
            return;
        }

        let shortfall = value - available;
        if shortfall > self.total_delegated() {
            self.env().revert(Error::InsufficientConsensusFunds);
        }
        self.available_amount.set(U512::zero());
        self.undelegate_newest_first(shortfall);
    }

    /// Undelegate `value` back into the idle pool
    pub fn withdraw_specified(&mut self, value: U512) {
        if value.is_zero() {
            self.env().revert(Error::AmountMustBePositive);
        }
        if value > self.total_delegated() {
            self.env().revert(Error::InsufficientConsensusFunds);
        }
        let available = self.available_amount.get_or_default();
        self.available_amount.set(available + value);
        self.undelegate_newest_first(value);
    }

    pub fn available_amount(&self) -> U512 {
        self.available_amount.get_or_default()
    }

    pub fn min_join_deposit(&self) -> U512 {
        self.min_join_deposit.get_or_default()
    }

    pub fn set_min_join_deposit(&mut self, value: U512) {
        if value.is_zero() {
            self.env().revert(Error::InvalidParameter);
        }
        self.min_join_deposit.set(value);
    }

    // ============ AWARD LEDGER ============

    pub fn credit_award(&mut self, amount: U512) -> U512 {
        let award = self.available_award.get_or_default() + amount;
        self.available_award.set(award);
        award
    }

    /// Move the whole available award into the transferred total
    pub fn take_award(&mut self) -> U512 {
        let award = self.available_award.get_or_default();
        if award.is_zero() {
            self.env().revert(Error::NoConsensusAward);
        }
        self.available_award.set(U512::zero());
        let transferred = self.transferred_award.get_or_default();
        self.transferred_award.set(transferred + award);
        award
    }

    pub fn available_award(&self) -> U512 {
        self.available_award.get_or_default()
    }

    pub fn transferred_award(&self) -> U512 {
        self.transferred_award.get_or_default()
    }

    // ============ INTERNAL ============

    /// Fill agents in registration order; returns the amount accepted
    fn delegate_available(&mut self) -> U512 {
        let mut remaining = self.available_amount.get_or_default();
        let mut accepted_total = U512::zero();

        for agent in self.agents.get_or_default() {
            if remaining.is_zero() {
                break;
            }
            let capacity = self.registry_ref().remaining_capacity(agent.clone());
            let offer = min(capacity, remaining);
            if offer.is_zero() {
                continue;
            }

            let accepted = self
                .registry_ref()
                .with_tokens(offer)
                .delegate(agent.clone(), offer);
            let accepted = min(accepted, offer);
            if accepted.is_zero() {
                continue;
            }
            let delegated = self.delegated.get(&agent).unwrap_or_default();
            self.delegated.set(&agent, delegated + accepted);
            remaining -= accepted;
            accepted_total += accepted;
            self.env().emit_event(FundsDelegated {
                agent,
                amount: accepted,
            });
        }

        self.available_amount.set(remaining);
        accepted_total
    }

    fn undelegate_newest_first(&mut self, value: U512) {
        let mut remaining = value;

        for agent in self.agents.get_or_default().into_iter().rev() {
            if remaining.is_zero() {
                break;
            }
            let delegated = self.delegated.get(&agent).unwrap_or_default();
            let take = min(delegated, remaining);
            if take.is_zero() {
                continue;
            }
            self.delegated.set(&agent, delegated - take);
            remaining -= take;
            self.registry_ref().undelegate(agent.clone(), take);
            self.env().emit_event(FundsUndelegated { agent, amount: take });
        }
    }

    fn registry_ref(&self) -> ConsensusRegistryContractRef {
        let registry = self
            .registry
            .get()
            .unwrap_or_revert_with(&self.env(), Error::RegistryNotSet);
        ConsensusRegistryContractRef::new(self.env(), registry)
    }
}
