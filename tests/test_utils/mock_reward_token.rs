//! Mock reward token that reads the pool back while a reward is paid
//!
//! `transfer_locked` records what the pool reports about its own ledgers at
//! the moment of the outgoing call, so tests can check that every mutation
//! was stored before the transfer happened.
//!
//! Entry-point argument names match `LockedTransferToken`, since contract
//! calls pass arguments by name.

use odra::casper_types::{U256, U512};
use odra::prelude::*;
use odra::ContractRef;

use pocm::pool::PocmPoolContractRef;
use pocm::stake::UserStake;

#[odra::odra_type]
pub struct PoolSnapshot {
    pub total_staked: U512,
    pub total_deposit: U512,
    pub allocated_amount: U512,
    pub recipient_stake: Option<UserStake>,
    pub amount: U512,
}

#[odra::module]
pub struct ReentrantRewardToken {
    pool: Var<Address>,
    balance: Var<U512>,
    snapshots: Var<Vec<PoolSnapshot>>,
}

#[odra::module]
impl ReentrantRewardToken {
    pub fn init(&mut self, balance: U512) {
        self.balance.set(balance);
    }

    pub fn set_pool(&mut self, pool: Address) {
        self.pool.set(pool);
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        let _ = owner;
        U256::from(self.balance.get_or_default().as_u128())
    }

    pub fn transfer_locked(&mut self, to: Address, amount: U512, unlock_at: u64) {
        let _ = unlock_at;
        let balance = self.balance.get_or_default();
        self.balance.set(balance.saturating_sub(amount));

        if let Some(pool) = self.pool.get() {
            let pool = PocmPoolContractRef::new(self.env(), pool);
            let snapshot = PoolSnapshot {
                total_staked: pool.total_staked(),
                total_deposit: pool.total_deposit(),
                allocated_amount: pool.allocated_amount(),
                recipient_stake: pool.get_user_stake(to),
                amount,
            };
            let mut snapshots = self.snapshots.get_or_default();
            snapshots.push(snapshot);
            self.snapshots.set(snapshots);
        }
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let _ = (spender, amount);
    }

    pub fn snapshots(&self) -> Vec<PoolSnapshot> {
        self.snapshots.get_or_default()
    }
}
