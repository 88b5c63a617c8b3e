//! Reward asset distribution
//!
//! The mined reward is either native CSPR held in an in-contract reserve or an
//! external token that supports time-locked transfers. The variant is chosen
//! once at construction; only this module branches on it.

use alloc::vec::Vec;
use odra::casper_types::{U256, U512};
use odra::prelude::*;
use odra::ContractRef;

use crate::errors::Error;

/// Which asset the pool pays rewards in
#[odra::odra_type]
pub enum RewardAsset {
    Native,
    Token,
}

/// A reward grant that becomes spendable at `unlock_at` (block time, ms)
#[odra::odra_type]
pub struct LockedReward {
    pub amount: U512,
    pub unlock_at: u64,
}

/// External interface of a reward token that supports locked transfers.
///
/// `PocmToken` in this crate implements it.
#[odra::external_contract]
pub trait LockedTransferToken {
    /// CEP-18 balance of `owner`
    fn balance_of(&self, owner: Address) -> U256;

    /// Move `amount` from the caller into a lock owned by `to` until `unlock_at`
    fn transfer_locked(&mut self, to: Address, amount: U512, unlock_at: u64);

    /// CEP-18 approve
    fn approve(&mut self, spender: Address, amount: U256);
}

/// Widen a CEP-18 balance to the pool's integer width
pub fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

/// Narrow a pool amount to a CEP-18 balance, `None` if it does not fit
pub fn u512_to_u256(value: U512) -> Option<U256> {
    if value.bits() > 256 {
        return None;
    }
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    Some(U256::from_little_endian(&bytes[..32]))
}

#[odra::module]
pub struct RewardDistributor {
    asset: Var<RewardAsset>,
    token: Var<Address>,
    native_reserve: Var<U512>,
    // Paid native grants not yet released
    native_locked: Var<U512>,
    native_locks: Mapping<Address, Vec<LockedReward>>,
}

#[odra::module]
impl RewardDistributor {
    /// `Some(token)` selects the token variant, `None` the native reserve
    pub fn init(&mut self, token: Option<Address>) {
        match token {
            Some(address) => {
                self.asset.set(RewardAsset::Token);
                self.token.set(address);
            }
            None => {
                self.asset.set(RewardAsset::Native);
                self.native_reserve.set(U512::zero());
            }
        }
    }

    pub fn asset(&self) -> RewardAsset {
        self.asset
            .get()
            .unwrap_or_revert_with(&self.env(), Error::RewardAssetNotSet)
    }

    /// Reward balance the pool can still hand out
    pub fn balance(&self) -> U512 {
        match self.asset() {
            RewardAsset::Native => self.native_reserve.get_or_default(),
            RewardAsset::Token => {
                u256_to_u512(self.token_ref().balance_of(self.env().self_address()))
            }
        }
    }

    /// Pay `amount` to `to`, spendable once `lock_duration_ms` has elapsed.
    ///
    /// Returns the unlock timestamp.
    pub fn transfer_locked(&mut self, to: Address, amount: U512, lock_duration_ms: u64) -> u64 {
        let unlock_at = self.env().get_block_time() + lock_duration_ms;
        match self.asset() {
            RewardAsset::Native => {
                let reserve = self.native_reserve.get_or_default();
                self.native_reserve.set(reserve.saturating_sub(amount));
                let locked = self.native_locked.get_or_default();
                self.native_locked.set(locked + amount);
                let mut locks = self.native_locks.get(&to).unwrap_or_default();
                locks.push(LockedReward { amount, unlock_at });
                self.native_locks.set(&to, locks);
            }
            RewardAsset::Token => {
                self.token_ref().transfer_locked(to, amount, unlock_at);
            }
        }
        unlock_at
    }

    pub fn approve(&mut self, spender: Address, amount: U512) {
        match self.asset() {
            RewardAsset::Native => self.env().revert(Error::TokenRewardOnly),
            RewardAsset::Token => {
                let amount = u512_to_u256(amount)
                    .unwrap_or_revert_with(&self.env(), Error::RewardAmountOverflow);
                self.token_ref().approve(spender, amount);
            }
        }
    }

    pub fn fund_native(&mut self, amount: U512) -> U512 {
        self.require_native();
        let reserve = self.native_reserve.get_or_default() + amount;
        self.native_reserve.set(reserve);
        reserve
    }

    /// CSPR held by the contract on behalf of the native reward asset:
    /// the undistributed reserve plus unreleased grants. Zero for tokens.
    pub fn native_held(&self) -> U512 {
        match self.asset() {
            RewardAsset::Native => {
                self.native_reserve.get_or_default() + self.native_locked.get_or_default()
            }
            RewardAsset::Token => U512::zero(),
        }
    }

    pub fn native_locks_of(&self, owner: Address) -> Vec<LockedReward> {
        self.native_locks.get(&owner).unwrap_or_default()
    }

    /// Pay out every matured native grant of `owner`
    pub fn release_native(&mut self, owner: Address) -> U512 {
        self.require_native();
        let now = self.env().get_block_time();
        let (matured, pending): (Vec<LockedReward>, Vec<LockedReward>) = self
            .native_locks
            .get(&owner)
            .unwrap_or_default()
            .into_iter()
            .partition(|lock| lock.unlock_at <= now);

        let amount = matured
            .iter()
            .fold(U512::zero(), |total, lock| total + lock.amount);
        if amount.is_zero() {
            self.env().revert(Error::NoMaturedRewards);
        }

        self.native_locks.set(&owner, pending);
        let locked = self.native_locked.get_or_default();
        self.native_locked.set(locked.saturating_sub(amount));
        self.env().transfer_tokens(&owner, &amount);
        amount
    }

    fn require_native(&self) {
        if let RewardAsset::Token = self.asset() {
            self.env().revert(Error::NativeRewardOnly);
        }
    }

    fn token_ref(&self) -> LockedTransferTokenContractRef {
        let token = self
            .token
            .get()
            .unwrap_or_revert_with(&self.env(), Error::RewardAssetNotSet);
        LockedTransferTokenContractRef::new(self.env(), token)
    }
}
