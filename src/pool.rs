//! PocmPool - proof-of-contribution mining pool
//!
//! Users lock CSPR and mine a reward asset in proportion to their share of
//! the pool. When consensus delegation is enabled, idle principal is delegated
//! to registered consensus agents and their block rewards are collected in a
//! separate award ledger.
//!
//! Every entry point settles the pool first, applies all ledger mutations and
//! writes them to storage, and only then calls out to transfer rewards or
//! principal (CEI pattern).

use alloc::vec::Vec;
use core::cmp::min;
use odra::casper_types::{PublicKey, U512};
use odra::prelude::*;

use crate::accrual::PoolState;
use crate::consensus::{AgentRecord, ConsensusDelegation};
use crate::errors::Error;
use crate::events::{
    AcceptingDepositsChanged, AdminTransferred, AgentRegistered, AgentRemoved,
    ConsensusAwardCredited, ConsensusAwardTransferred, ConsensusEnabled, DepositDetail,
    EmergencyWithdrawn, LockedRewardsReleased, NativeRewardsFunded, RewardPaid,
    RewardSupplyIncreased, Withdrawn,
};
use crate::reward_source::{LockedReward, RewardAsset, RewardDistributor};
use crate::stake::UserStake;
use crate::total_deposit::TotalDepositLedger;

// Constants
const ONE_CSPR: u64 = 1_000_000_000; // in motes
const MIN_REFUND_AMOUNT: u64 = 10_000_000; // 0.01 CSPR

/// PocmPool - mining pool contract
#[odra::module]
pub struct PocmPool {
    // Accrual
    state: Var<PoolState>,
    block_interval_ms: Var<u64>,

    // Stakes
    users: Mapping<Address, Option<UserStake>>,
    depositor_count: Var<u32>,
    total_deposit: SubModule<TotalDepositLedger>,

    // Reward asset
    reward: SubModule<RewardDistributor>,
    reward_funded: Var<bool>,
    accepting_deposits: Var<bool>,

    // Consensus
    consensus: SubModule<ConsensusDelegation>,
    award_node_providers: Var<bool>,

    // Admin
    admin: Var<Address>,
}

#[odra::module]
impl PocmPool {
    /// Initialize the pool
    ///
    /// # Arguments
    /// * `reward_token` - `LockedTransferToken` contract, or `None` to pay rewards in CSPR
    /// * `duration_blocks` - number of blocks rewards accrue for, counted from deployment
    /// * `block_interval_ms` - block time length used to derive block numbers
    /// * `lock_duration_ms` - how long paid rewards stay locked
    /// * `award_node_providers` - whether registered agents earn mining rewards
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        admin: Address,
        reward_token: Option<Address>,
        reward_per_block: U512,
        reward_supply_cap: U512,
        duration_blocks: u64,
        block_interval_ms: u64,
        lock_duration_ms: u64,
        min_stake: U512,
        max_stake: U512,
        award_node_providers: bool,
    ) {
        if reward_per_block.is_zero() || reward_supply_cap.is_zero() {
            self.env().revert(Error::InvalidParameter);
        }
        if duration_blocks == 0 || block_interval_ms == 0 {
            self.env().revert(Error::InvalidParameter);
        }
        if min_stake.is_zero() || min_stake > max_stake {
            self.env().revert(Error::InvalidParameter);
        }

        self.block_interval_ms.set(block_interval_ms);
        let start_block = self.current_block();
        self.state.set(PoolState {
            acc_per_share: U512::zero(),
            last_reward_block: start_block,
            end_block: start_block + duration_blocks,
            reward_per_block,
            total_staked: U512::zero(),
            reward_supply_cap,
            allocated_amount: U512::zero(),
            min_stake,
            max_stake,
            lock_duration_ms,
        });
        self.reward.init(reward_token);
        self.admin.set(admin);
        self.award_node_providers.set(award_node_providers);
        self.reward_funded.set(false);
        self.accepting_deposits.set(false);
        self.depositor_count.set(0);
    }

    // ============ STAKING ============

    /// Lock the attached CSPR and start mining
    ///
    /// Principal is taken in whole CSPR; a fractional remainder worth a
    /// transfer is refunded, a smaller one is kept as principal.
    #[odra(payable)]
    pub fn deposit(&mut self) -> U512 {
        self.require_reward_distributable();

        let caller = self.env().caller();
        let attached = self.env().attached_value();
        let (amount, refund) = split_dust(attached);

        let block = self.current_block();
        let mut state = self.load_state();
        if amount < state.min_stake {
            self.env().revert(Error::BelowMinimumStake);
        }
        if amount > state.max_stake {
            self.env().revert(Error::AboveMaximumStake);
        }

        let existing = self.load_user(caller);
        let mut user = existing.clone().unwrap_or_else(|| UserStake::new(block));
        if user.principal + amount > state.max_stake {
            self.env().revert(Error::AboveMaximumStake);
        }

        state.update_pool(block);
        let payout = match existing {
            Some(ref stake) => self.settle(&mut state, stake),
            None => U512::zero(),
        };

        user.principal += amount;
        user.last_stake_block = block;
        state.total_staked += amount;
        user.reward_debt = state.reward_debt_for(&user);

        self.state.set(state);
        self.save_user(caller, user);
        self.total_deposit.add(amount);

        if self.consensus.is_enabled() {
            self.consensus.pool_idle_funds(amount);
        }

        self.pay_reward(caller, payout);
        if !refund.is_zero() {
            self.env().transfer_tokens(&caller, &refund);
        }

        self.env().emit_event(DepositDetail {
            user: caller,
            attached,
            principal_added: amount,
            refunded: refund,
            block,
        });

        amount
    }

    /// Withdraw `amount` of principal, settling pending rewards first
    pub fn withdraw(&mut self, amount: U512) {
        let caller = self.env().caller();
        self.withdraw_for(caller, amount);
    }

    /// Withdraw the caller's whole principal, settling pending rewards first
    pub fn quit(&mut self) {
        let caller = self.env().caller();
        let principal = self.require_user(caller).principal;
        self.withdraw_for(caller, principal);
    }

    /// Withdraw the whole principal without settling; pending rewards are forfeited
    pub fn emergency_withdraw(&mut self) {
        let caller = self.env().caller();
        let mut user = self.require_user(caller);
        let amount = user.principal;
        if amount.is_zero() {
            self.env().revert(Error::NothingToWithdraw);
        }

        let mut state = self.load_state();
        state.update_pool(self.current_block());

        user.principal = U512::zero();
        state.total_staked -= amount;
        user.reward_debt = state.reward_debt_for(&user);

        self.state.set(state);
        self.save_user(caller, user);
        self.release_principal(amount);

        self.env().transfer_tokens(&caller, &amount);
        self.env().emit_event(EmergencyWithdrawn {
            user: caller,
            amount,
        });
    }

    /// Settle and pay the caller's pending rewards
    pub fn claim(&mut self) -> U512 {
        let caller = self.env().caller();
        let mut user = self.require_user(caller);

        let mut state = self.load_state();
        state.update_pool(self.current_block());
        let payout = self.settle(&mut state, &user);
        user.reward_debt = state.reward_debt_for(&user);

        self.state.set(state);
        self.save_user(caller, user);
        self.pay_reward(caller, payout);
        payout
    }

    /// Pay out matured native reward grants
    pub fn release_locked_rewards(&mut self) -> U512 {
        let caller = self.env().caller();
        let amount = self.reward.release_native(caller);
        self.env().emit_event(LockedRewardsReleased {
            user: caller,
            amount,
        });
        amount
    }

    // ============ REWARD ASSET ============

    /// Add the attached CSPR to the native reward reserve
    #[odra(payable)]
    pub fn fund_native_rewards(&mut self) {
        let amount = self.env().attached_value();
        if amount.is_zero() {
            self.env().revert(Error::AmountMustBePositive);
        }
        let reserve = self.reward.fund_native(amount);
        self.env().emit_event(NativeRewardsFunded {
            from: self.env().caller(),
            amount,
            reserve,
        });
    }

    /// Accept deposits again if there is any reward balance left
    pub fn refresh_accepting_deposits(&mut self) -> bool {
        let balance = self.reward.balance();
        let accepting = !balance.is_zero();
        self.set_accepting(accepting, balance);
        accepting
    }

    // ============ CONSENSUS ============

    /// Switch on consensus delegation; idle principal is pooled immediately
    pub fn enable_consensus(&mut self, registry: Address, min_join_deposit: U512) {
        self.require_admin();
        self.consensus.enable(registry, min_join_deposit);

        let idle = self.total_deposit.total();
        if !idle.is_zero() {
            self.consensus.pool_idle_funds(idle);
        }

        self.env().emit_event(ConsensusEnabled {
            registry,
            min_join_deposit,
        });
    }

    /// Register a consensus agent known to the registry
    ///
    /// The agent's operator becomes a stake participant; its node value counts
    /// towards `total_staked` only while node providers are rewarded.
    pub fn register_agent(&mut self, agent: PublicKey) {
        self.require_admin();
        self.consensus.require_enabled();
        self.require_reward_distributable();

        let info = self.consensus.agent_info(agent.clone());
        let eligible = self.award_node_providers.get_or_default();
        let block = self.current_block();
        self.consensus.insert_agent(
            agent.clone(),
            AgentRecord {
                depositor: info.depositor,
                node_value: info.node_value,
                reward_eligible: eligible,
                registered_at_block: block,
            },
        );

        let mut state = self.load_state();
        state.update_pool(block);

        let existing = self.load_user(info.depositor);
        let mut user = existing.clone().unwrap_or_else(|| UserStake::new(block));
        let payout = match existing {
            Some(ref stake) => self.settle(&mut state, stake),
            None => U512::zero(),
        };

        user.agent_amount = info.node_value;
        user.agent_reward_eligible = eligible;
        if eligible {
            state.total_staked += info.node_value;
        }
        user.reward_debt = state.reward_debt_for(&user);

        self.state.set(state);
        self.save_user(info.depositor, user);
        self.pay_reward(info.depositor, payout);

        self.env().emit_event(AgentRegistered {
            agent,
            depositor: info.depositor,
            node_value: info.node_value,
            reward_eligible: eligible,
        });
    }

    /// Remove a registered agent
    ///
    /// `emergency` skips reward settlement for the operator, for nodes that
    /// are faulty or when the reward asset has run dry.
    pub fn remove_agent(&mut self, agent: PublicKey, emergency: bool) {
        self.require_admin();
        self.consensus.require_enabled();

        let record = self
            .consensus
            .agent_record(agent.clone())
            .unwrap_or_revert_with(&self.env(), Error::UnknownAgent);
        let depositor = record.depositor;

        let mut state = self.load_state();
        state.update_pool(self.current_block());

        let mut payout = U512::zero();
        if let Some(mut user) = self.load_user(depositor) {
            if !emergency {
                payout = self.settle(&mut state, &user);
            }
            if user.agent_reward_eligible {
                state.total_staked -= user.agent_amount;
            }
            user.agent_amount = U512::zero();
            user.agent_reward_eligible = false;
            user.reward_debt = state.reward_debt_for(&user);
            self.save_user(depositor, user);
        }
        self.state.set(state);

        self.consensus.remove_agent(agent.clone());
        self.pay_reward(depositor, payout);

        self.env().emit_event(AgentRemoved {
            agent,
            depositor,
            emergency,
        });
    }

    /// Delegate idle funds to agents now rather than on the next deposit
    pub fn deposit_consensus_manually(&mut self) -> U512 {
        self.consensus.require_enabled();
        self.consensus.deposit_manually()
    }

    /// Undelegate `value` back into the idle pool
    pub fn withdraw_consensus_specified(&mut self, value: U512) {
        self.require_admin();
        self.consensus.require_enabled();
        self.consensus.withdraw_specified(value);
    }

    /// Block reward forwarded by the consensus registry
    #[odra(payable)]
    pub fn credit_block_reward(&mut self) {
        self.consensus.require_enabled();
        let amount = self.env().attached_value();
        let available_award = self.consensus.credit_award(amount);
        self.env().emit_event(ConsensusAwardCredited {
            amount,
            available_award,
        });
    }

    /// Pay the whole available consensus award to `beneficiary`
    pub fn transfer_consensus_reward(&mut self, beneficiary: Address) -> U512 {
        self.require_admin();
        self.consensus.require_enabled();
        let amount = self.consensus.take_award();
        self.env().transfer_tokens(&beneficiary, &amount);
        self.env().emit_event(ConsensusAwardTransferred {
            beneficiary,
            amount,
        });
        amount
    }

    // ============ VIEW FUNCTIONS ============

    /// Reward the user would receive if they claimed in this block
    pub fn pending_reward(&self, user: Address) -> U512 {
        let stake = self.require_user(user);
        self.load_state().pending_at(&stake, self.current_block())
    }

    pub fn total_staked(&self) -> U512 {
        self.load_state().total_staked
    }

    pub fn total_deposit(&self) -> U512 {
        self.total_deposit.total()
    }

    pub fn get_user_stake(&self, user: Address) -> Option<UserStake> {
        self.load_user(user)
    }

    pub fn depositor_count(&self) -> u32 {
        self.depositor_count.get_or_default()
    }

    pub fn pool_state(&self) -> PoolState {
        self.load_state()
    }

    pub fn current_block(&self) -> u64 {
        self.env().get_block_time() / self.block_interval_ms.get_or_default().max(1)
    }

    pub fn allocated_amount(&self) -> U512 {
        self.load_state().allocated_amount
    }

    pub fn reward_supply_cap(&self) -> U512 {
        self.load_state().reward_supply_cap
    }

    /// Reward balance still held by the pool
    pub fn unallocated_reward(&self) -> U512 {
        self.reward.balance()
    }

    pub fn reward_asset(&self) -> RewardAsset {
        self.reward.asset()
    }

    pub fn locked_rewards(&self, owner: Address) -> Vec<LockedReward> {
        self.reward.native_locks_of(owner)
    }

    pub fn is_accepting_deposits(&self) -> bool {
        self.accepting_deposits.get_or_default()
    }

    pub fn is_consensus_enabled(&self) -> bool {
        self.consensus.is_enabled()
    }

    pub fn available_consensus_award(&self) -> U512 {
        self.consensus.require_enabled();
        self.consensus.available_award()
    }

    /// Awarded so far, transferred or not
    pub fn total_consensus_award(&self) -> U512 {
        self.consensus.require_enabled();
        self.consensus.available_award() + self.consensus.transferred_award()
    }

    /// Idle principal waiting to be delegated
    pub fn free_consensus_amount(&self) -> U512 {
        self.consensus.require_enabled();
        self.consensus.available_amount()
    }

    pub fn min_join_deposit(&self) -> U512 {
        self.consensus.require_enabled();
        self.consensus.min_join_deposit()
    }

    pub fn get_agents(&self) -> Vec<PublicKey> {
        self.consensus.agents()
    }

    pub fn delegated_to(&self, agent: PublicKey) -> U512 {
        self.consensus.delegated_to(agent)
    }

    pub fn get_agent_record(&self, agent: PublicKey) -> Option<AgentRecord> {
        self.consensus.agent_record(agent)
    }

    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    // ============ ADMIN FUNCTIONS ============

    pub fn set_node_provider_award(&mut self, enabled: bool) {
        self.require_admin();
        self.award_node_providers.set(enabled);
    }

    pub fn add_reward_supply(&mut self, amount: U512) {
        self.require_admin();
        if amount.is_zero() {
            self.env().revert(Error::AmountMustBePositive);
        }
        let mut state = self.load_state();
        let old_cap = state.reward_supply_cap;
        state.reward_supply_cap = old_cap + amount;
        self.state.set(state);
        self.env().emit_event(RewardSupplyIncreased {
            old_cap,
            new_cap: old_cap + amount,
        });
    }

    pub fn set_min_join_deposit(&mut self, value: U512) {
        self.require_admin();
        self.consensus.require_enabled();
        self.consensus.set_min_join_deposit(value);
    }

    /// Approve `spender` on the reward token (token rewards only)
    pub fn approve_reward_spender(&mut self, spender: Address, amount: U512) {
        self.require_admin();
        self.reward.approve(spender, amount);
    }

    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        let old_admin = self.admin.get().unwrap_or_revert_with(&self.env(), Error::AdminNotSet);
        self.admin.set(new_admin);
        self.env().emit_event(AdminTransferred {
            old_admin,
            new_admin,
        });
    }
}

// ============ INTERNAL FUNCTIONS ============

impl PocmPool {
    fn withdraw_for(&mut self, caller: Address, amount: U512) {
        if amount.is_zero() {
            self.env().revert(Error::AmountMustBePositive);
        }
        let mut user = self.require_user(caller);
        if amount > user.principal {
            self.env().revert(Error::InsufficientPrincipal);
        }

        let mut state = self.load_state();
        state.update_pool(self.current_block());
        let payout = self.settle(&mut state, &user);

        user.principal -= amount;
        state.total_staked -= amount;
        user.reward_debt = state.reward_debt_for(&user);
        let remaining_principal = user.principal;

        self.state.set(state);
        self.save_user(caller, user);
        self.release_principal(amount);

        self.pay_reward(caller, payout);
        self.env().transfer_tokens(&caller, &amount);
        self.env().emit_event(Withdrawn {
            user: caller,
            amount,
            remaining_principal,
        });
    }

    /// Settle `user` against `state` and return the amount to pay.
    ///
    /// Aborts when the pool holds no reward at all or the supply cap is
    /// spent. A pending reward larger than the balance is clamped and pauses
    /// new deposits. `allocated_amount` is updated here; the transfer happens
    /// later in `pay_reward`.
    fn settle(&mut self, state: &mut PoolState, user: &UserStake) -> U512 {
        let balance = self.reward.balance();
        if balance.is_zero() {
            self.env().revert(Error::RewardBalanceExhausted);
        }
        if state.allocated_amount >= state.reward_supply_cap {
            self.env().revert(Error::RewardSupplyExhausted);
        }

        let pending = state.pending_for(user);
        if pending.is_zero() {
            return U512::zero();
        }

        let mut amount = pending;
        if balance < pending {
            amount = balance;
            self.set_accepting(false, balance);
        }
        amount = min(amount, state.remaining_supply());

        state.allocated_amount += amount;
        amount
    }

    fn pay_reward(&mut self, to: Address, amount: U512) {
        if amount.is_zero() {
            return;
        }
        let lock_duration_ms = self.load_state().lock_duration_ms;
        let unlock_at = self.reward.transfer_locked(to, amount, lock_duration_ms);
        self.env().emit_event(RewardPaid {
            user: to,
            amount,
            unlock_at,
        });
    }

    /// Make `amount` of principal spendable and take it off the deposit ledger
    fn release_principal(&mut self, amount: U512) {
        if self.consensus.is_enabled() {
            self.consensus.withdraw_up_to(amount);
        }
        let reserved = self.reward.native_held() + self.consensus.available_award();
        if !self.total_deposit.subtract(amount, reserved) {
            self.env().revert(Error::InsufficientContractBalance);
        }
    }

    /// Deposits need a reward asset funded up to the cap at least once and
    /// not yet drained.
    fn require_reward_distributable(&mut self) {
        let state = self.load_state();
        if !self.reward_funded.get_or_default() {
            let balance = self.reward.balance();
            if balance >= state.reward_supply_cap {
                self.reward_funded.set(true);
                self.set_accepting(true, balance);
            }
        }
        if !self.reward_funded.get_or_default() {
            self.env().revert(Error::RewardNotFunded);
        }
        if !self.accepting_deposits.get_or_default() {
            self.env().revert(Error::DepositsPaused);
        }
        if state.allocated_amount >= state.reward_supply_cap {
            self.env().revert(Error::RewardSupplyExhausted);
        }
    }

    fn set_accepting(&mut self, accepting: bool, reward_balance: U512) {
        if self.accepting_deposits.get_or_default() == accepting {
            return;
        }
        self.accepting_deposits.set(accepting);
        self.env().emit_event(AcceptingDepositsChanged {
            accepting,
            reward_balance,
        });
    }

    fn load_state(&self) -> PoolState {
        self.state
            .get()
            .unwrap_or_revert_with(&self.env(), Error::PoolNotInitialized)
    }

    fn load_user(&self, user: Address) -> Option<UserStake> {
        self.users.get(&user).flatten()
    }

    fn require_user(&self, user: Address) -> UserStake {
        self.load_user(user)
            .unwrap_or_revert_with(&self.env(), Error::UserNotFound)
    }

    /// Store `stake`, deleting the record once it holds nothing
    fn save_user(&mut self, user: Address, stake: UserStake) {
        let existed = self.load_user(user).is_some();
        let count = self.depositor_count.get_or_default();
        if stake.is_empty() {
            if existed {
                self.users.set(&user, None);
                self.depositor_count.set(count.saturating_sub(1));
            }
        } else {
            if !existed {
                self.depositor_count.set(count + 1);
            }
            self.users.set(&user, Some(stake));
        }
    }

    fn require_admin(&self) {
        let admin = self.admin.get().unwrap_or_revert_with(&self.env(), Error::AdminNotSet);
        if self.env().caller() != admin {
            self.env().revert(Error::NotAdmin);
        }
    }
}

/// Split an attached deposit into whole-CSPR principal and a refund.
///
/// Remainders too small to be worth a transfer stay in the principal.
fn split_dust(attached: U512) -> (U512, U512) {
    let remainder = attached % U512::from(ONE_CSPR);
    if remainder < U512::from(MIN_REFUND_AMOUNT) {
        (attached, U512::zero())
    } else {
        (attached - remainder, remainder)
    }
}
