//! Per-user stake record

use odra::casper_types::U512;

/// A depositor's position in the mining pool.
///
/// Created on first deposit (or agent registration) and deleted once both
/// `principal` and `agent_amount` are zero.
#[odra::odra_type]
pub struct UserStake {
    /// CSPR locked by the user and owed back on withdrawal
    pub principal: U512,
    /// Reward already accounted for at the last settlement
    pub reward_debt: U512,
    /// Block of the most recent deposit
    pub last_stake_block: u64,
    /// Node value of the consensus agent registered by this user
    pub agent_amount: U512,
    /// Whether `agent_amount` earns mining rewards
    pub agent_reward_eligible: bool,
}

impl UserStake {
    pub fn new(block: u64) -> Self {
        Self {
            principal: U512::zero(),
            reward_debt: U512::zero(),
            last_stake_block: block,
            agent_amount: U512::zero(),
            agent_reward_eligible: false,
        }
    }

    /// Stake that counts towards the pool's total staked amount
    pub fn earning_amount(&self) -> U512 {
        if self.agent_reward_eligible {
            self.principal + self.agent_amount
        } else {
            self.principal
        }
    }

    pub fn is_empty(&self) -> bool {
        self.principal.is_zero() && self.agent_amount.is_zero()
    }
}
