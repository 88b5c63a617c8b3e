//! Aggregate principal owed back to depositors

use odra::casper_types::U512;
use odra::prelude::*;

/// Tracks outstanding principal and gates withdrawals against the
/// contract's spendable balance.
#[odra::module]
pub struct TotalDepositLedger {
    total_deposit: Var<U512>,
}

#[odra::module]
impl TotalDepositLedger {
    pub fn total(&self) -> U512 {
        self.total_deposit.get_or_default()
    }

    pub fn add(&mut self, amount: U512) {
        let total = self.total_deposit.get_or_default();
        self.total_deposit.set(total + amount);
    }

    /// Subtracts `amount` and reports whether the contract can actually pay it.
    ///
    /// `reserved` is CSPR held by the contract that is not principal (native
    /// reward funds, the consensus award) and must stay untouched.
    ///
    /// The ledger is updated even when this returns `false`; callers must
    /// revert so the mutation does not persist.
    pub fn subtract(&mut self, amount: U512, reserved: U512) -> bool {
        let total = self.total_deposit.get_or_default();
        self.total_deposit.set(total.saturating_sub(amount));
        total >= amount && self.env().self_balance() >= amount + reserved
    }
}
