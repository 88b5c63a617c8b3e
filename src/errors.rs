//! Error definitions for the POCM mining pool

use odra::prelude::*;

/// Mining pool errors
#[odra::odra_error]
pub enum Error {
    /// Deposit amount is below the configured minimum stake
    BelowMinimumStake = 1,
    /// Deposit would push the principal above the configured maximum stake
    AboveMaximumStake = 2,
    /// Amount must be greater than zero
    AmountMustBePositive = 3,
    /// Caller has no stake record
    UserNotFound = 4,
    /// Withdrawal exceeds the caller's principal
    InsufficientPrincipal = 5,
    /// Caller has no principal to withdraw
    NothingToWithdraw = 6,
    /// Reward asset has never been funded up to the supply cap
    RewardNotFunded = 7,
    /// New deposits are paused until the reward asset is refilled
    DepositsPaused = 8,
    /// No distributable reward balance left in the pool
    RewardBalanceExhausted = 9,
    /// Allocated rewards have reached the reward supply cap
    RewardSupplyExhausted = 10,
    /// Contract balance cannot cover the principal being returned
    InsufficientContractBalance = 11,
    /// Caller is not admin
    NotAdmin = 12,
    /// Admin address not set
    AdminNotSet = 13,
    /// Invalid construction or configuration parameter
    InvalidParameter = 14,
    /// Pool state missing, contract was not initialized
    PoolNotInitialized = 15,

    /// Consensus delegation has not been enabled
    ConsensusNotEnabled = 20,
    /// Consensus delegation is already enabled
    ConsensusAlreadyEnabled = 21,
    /// Consensus registry address not set
    RegistryNotSet = 22,
    /// Agent is unknown to the registry or not registered with the pool
    UnknownAgent = 23,
    /// Agent is already registered with the pool
    AgentAlreadyRegistered = 24,
    /// Another registered agent shares the same depositor address
    DepositorConflict = 25,
    /// Available plus delegated funds cannot cover the requested amount
    InsufficientConsensusFunds = 26,
    /// Idle funds are below the minimum join deposit
    BelowMinJoinDeposit = 27,
    /// No consensus agents registered
    NoAgentsRegistered = 28,
    /// Every registered agent is at capacity
    AgentsFullyDelegated = 29,
    /// No consensus award available to transfer
    NoConsensusAward = 30,

    /// Operation requires the native reward asset
    NativeRewardOnly = 40,
    /// Operation requires a token reward asset
    TokenRewardOnly = 41,
    /// No locked reward has matured yet
    NoMaturedRewards = 42,
    /// Reward asset variant not set
    RewardAssetNotSet = 43,
    /// Amount does not fit the reward token's 256-bit balances
    RewardAmountOverflow = 44,
}

/// Reward token errors
#[odra::odra_error]
pub enum TokenError {
    /// Amount must be greater than zero
    AmountMustBePositive = 100,
    /// Nothing unlocked for the caller yet
    NothingToRelease = 101,
    /// Amount does not fit a 256-bit token balance
    AmountOverflow = 102,
}
