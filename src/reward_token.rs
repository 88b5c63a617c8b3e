//! POCM reward token - CEP-18 token with time-locked transfers
//!
//! The mining pool pays rewards with `transfer_locked`: the amount leaves the
//! sender's balance immediately and is re-credited to the recipient by
//! `release_locked` once the lock has expired.

use alloc::vec::Vec;
use odra::casper_types::{U256, U512};
use odra::prelude::*;
use odra_modules::cep18_token::Cep18;

use crate::errors::TokenError;
use crate::events::{TokensLocked, TokensReleased};
use crate::reward_source::{u512_to_u256, LockedReward};

#[odra::module]
pub struct PocmToken {
    /// CEP-18 token implementation
    cep18: SubModule<Cep18>,
    /// Pending locks per recipient
    locks: Mapping<Address, Vec<LockedReward>>,
    total_locked: Var<U512>,
}

#[odra::module]
impl PocmToken {
    /// Initialize the token, minting `initial_supply` to `owner`
    pub fn init(&mut self, name: String, symbol: String, decimals: u8, initial_supply: U256, owner: Address) {
        self.cep18.init(symbol, name, decimals, U256::zero());
        self.cep18.raw_mint(&owner, &initial_supply);
        self.total_locked.set(U512::zero());
    }

    /// Lock `amount` of the caller's tokens for `to` until `unlock_at`
    pub fn transfer_locked(&mut self, to: Address, amount: U512, unlock_at: u64) {
        if amount.is_zero() {
            self.env().revert(TokenError::AmountMustBePositive);
        }
        let units = u512_to_u256(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::AmountOverflow);
        let from = self.env().caller();
        self.cep18.raw_burn(&from, &units);

        let mut locks = self.locks.get(&to).unwrap_or_default();
        locks.push(LockedReward { amount, unlock_at });
        self.locks.set(&to, locks);
        let total = self.total_locked.get_or_default();
        self.total_locked.set(total + amount);

        self.env().emit_event(TokensLocked {
            from,
            to,
            amount,
            unlock_at,
        });
    }

    /// Credit every expired lock back to the caller's balance
    pub fn release_locked(&mut self) -> U512 {
        let owner = self.env().caller();
        let now = self.env().get_block_time();
        let (matured, pending): (Vec<LockedReward>, Vec<LockedReward>) = self
            .locks
            .get(&owner)
            .unwrap_or_default()
            .into_iter()
            .partition(|lock| lock.unlock_at <= now);

        let amount = matured
            .iter()
            .fold(U512::zero(), |total, lock| total + lock.amount);
        if amount.is_zero() {
            self.env().revert(TokenError::NothingToRelease);
        }

        self.locks.set(&owner, pending);
        let total = self.total_locked.get_or_default();
        self.total_locked.set(total.saturating_sub(amount));
        let units = u512_to_u256(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::AmountOverflow);
        self.cep18.raw_mint(&owner, &units);

        self.env().emit_event(TokensReleased { owner, amount });
        amount
    }

    /// Locks still held for `owner`
    pub fn locks_of(&self, owner: Address) -> Vec<LockedReward> {
        self.locks.get(&owner).unwrap_or_default()
    }

    pub fn locked_balance_of(&self, owner: Address) -> U512 {
        self.locks
            .get(&owner)
            .unwrap_or_default()
            .iter()
            .fold(U512::zero(), |total, lock| total + lock.amount)
    }

    pub fn total_locked(&self) -> U512 {
        self.total_locked.get_or_default()
    }

    /// Transfer tokens - standard CEP-18 passthrough
    pub fn transfer(&mut self, to: Address, amount: U256) {
        self.cep18.transfer(&to, &amount);
    }

    /// Approve spender - standard CEP-18 passthrough
    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.cep18.approve(&spender, &amount);
    }

    /// Transfer from - standard CEP-18 passthrough
    pub fn transfer_from(&mut self, owner: Address, to: Address, amount: U256) {
        self.cep18.transfer_from(&owner, &to, &amount);
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.cep18.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.cep18.allowance(&owner, &spender)
    }

    pub fn total_supply(&self) -> U256 {
        self.cep18.total_supply()
    }

    pub fn name(&self) -> String {
        self.cep18.name()
    }

    pub fn symbol(&self) -> String {
        self.cep18.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.cep18.decimals()
    }
}
