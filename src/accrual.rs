//! Reward accrual engine
//!
//! Rewards are distributed with a global accumulator: every block adds
//! `reward_per_block * 1e12 / total_staked` to `acc_per_share`, and a user's
//! entitlement is `earning * acc_per_share / 1e12 - reward_debt`. Division
//! always floors, so the only loss is a few units of dust per settlement.

use core::cmp::min;
use odra::casper_types::U512;

use crate::stake::UserStake;

/// Fixed-point scale of `acc_per_share`
pub const ACC_PRECISION: u64 = 1_000_000_000_000; // 1e12

/// Global mining pool state
#[odra::odra_type]
pub struct PoolState {
    /// Accumulated reward per unit of stake, scaled by 1e12. Never decreases.
    pub acc_per_share: U512,
    pub last_reward_block: u64,
    /// No reward accrues past this block
    pub end_block: u64,
    pub reward_per_block: U512,
    /// Sum of principal plus reward-eligible agent amounts
    pub total_staked: U512,
    pub reward_supply_cap: U512,
    /// Rewards paid out so far, never above `reward_supply_cap`
    pub allocated_amount: U512,
    pub min_stake: U512,
    pub max_stake: U512,
    pub lock_duration_ms: u64,
}

impl PoolState {
    /// Accumulator value as of `current_block`, without mutating state
    pub fn projected_acc_per_share(&self, current_block: u64) -> U512 {
        let effective_block = min(current_block, self.end_block);
        if effective_block <= self.last_reward_block || self.total_staked.is_zero() {
            return self.acc_per_share;
        }
        let blocks = U512::from(effective_block - self.last_reward_block);
        let reward = blocks * self.reward_per_block;
        self.acc_per_share + reward * U512::from(ACC_PRECISION) / self.total_staked
    }

    /// Advance the accumulator to `current_block`.
    ///
    /// With nothing staked only `last_reward_block` moves, so blocks without
    /// stakers are never credited to whoever stakes next.
    pub fn update_pool(&mut self, current_block: u64) {
        let effective_block = min(current_block, self.end_block);
        if effective_block <= self.last_reward_block {
            return;
        }
        self.acc_per_share = self.projected_acc_per_share(current_block);
        self.last_reward_block = effective_block;
    }

    pub fn reward_debt_for(&self, stake: &UserStake) -> U512 {
        accumulated(stake.earning_amount(), self.acc_per_share)
    }

    /// Reward owed to `stake` at the current accumulator
    pub fn pending_for(&self, stake: &UserStake) -> U512 {
        accumulated(stake.earning_amount(), self.acc_per_share).saturating_sub(stake.reward_debt)
    }

    /// Reward owed to `stake` if the pool were updated to `current_block`
    pub fn pending_at(&self, stake: &UserStake, current_block: u64) -> U512 {
        let acc = self.projected_acc_per_share(current_block);
        accumulated(stake.earning_amount(), acc).saturating_sub(stake.reward_debt)
    }

    pub fn remaining_supply(&self) -> U512 {
        self.reward_supply_cap.saturating_sub(self.allocated_amount)
    }
}

fn accumulated(amount: U512, acc_per_share: U512) -> U512 {
    amount * acc_per_share / U512::from(ACC_PRECISION)
}
