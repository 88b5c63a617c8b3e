//! Test utilities and helpers for POCM pool tests

#![allow(dead_code, unused_imports)]

pub mod mock_registry;
pub mod mock_reward_token;

pub use mock_registry::{MockConsensusRegistry, MockConsensusRegistryHostRef};
pub use mock_reward_token::{
    PoolSnapshot, ReentrantRewardToken, ReentrantRewardTokenHostRef, ReentrantRewardTokenInitArgs,
};

use odra::casper_types::{PublicKey, SecretKey, U256, U512};
use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
use odra::prelude::*;

use pocm::pool::{PocmPool, PocmPoolHostRef, PocmPoolInitArgs};
use pocm::reward_token::{PocmToken, PocmTokenHostRef, PocmTokenInitArgs};

/// Constants for testing
pub const CSPR: u64 = 1_000_000_000; // 1 CSPR in motes (9 decimals)
pub const TOKEN: u64 = 1_000_000_000; // 1 POCM (9 decimals)
pub const BLOCK_MS: u64 = 1_000;
pub const DURATION_BLOCKS: u64 = 1_000;
pub const LOCK_MS: u64 = 60 * 60 * 1000; // 1 hour
pub const MIN_STAKE: u64 = 10 * CSPR;
pub const MAX_STAKE: u64 = 10_000 * CSPR;
pub const REWARD_PER_BLOCK: u64 = 10 * TOKEN;
pub const SUPPLY_CAP: u64 = 1_000_000 * TOKEN;
pub const INITIAL_SUPPLY: u64 = 2 * SUPPLY_CAP;
pub const MIN_JOIN_DEPOSIT: u64 = 100 * CSPR;

/// Deterministic consensus agent key
pub fn agent_key(seed: u8) -> PublicKey {
    let secret_key = SecretKey::ed25519_from_bytes([seed; 32]).unwrap();
    PublicKey::from(&secret_key)
}

pub fn cspr(amount: u64) -> U512 {
    U512::from(amount * CSPR)
}

pub fn tokens(amount: u64) -> U512 {
    U512::from(amount * TOKEN)
}

/// Move block time forward by whole blocks
pub fn advance_blocks(env: &HostEnv, blocks: u64) {
    env.advance_block_time(blocks * BLOCK_MS);
}

/// Default pool arguments; callers override fields as needed
pub fn pool_args(admin: Address, reward_token: Option<Address>) -> PocmPoolInitArgs {
    PocmPoolInitArgs {
        admin,
        reward_token,
        reward_per_block: U512::from(REWARD_PER_BLOCK),
        reward_supply_cap: U512::from(SUPPLY_CAP),
        duration_blocks: DURATION_BLOCKS,
        block_interval_ms: BLOCK_MS,
        lock_duration_ms: LOCK_MS,
        min_stake: U512::from(MIN_STAKE),
        max_stake: U512::from(MAX_STAKE),
        award_node_providers: true,
    }
}

pub fn deploy_token(env: &HostEnv, owner: Address) -> PocmTokenHostRef {
    PocmToken::deploy(
        env,
        PocmTokenInitArgs {
            name: "POCM Reward".to_string(),
            symbol: "POCM".to_string(),
            decimals: 9,
            initial_supply: U256::from(INITIAL_SUPPLY),
            owner,
        },
    )
}

/// Send the full supply cap of reward tokens to the pool
pub fn fund_pool(env: &HostEnv, token: &mut PocmTokenHostRef, pool: &PocmPoolHostRef, admin: Address) {
    env.set_caller(admin);
    token.transfer(pool.address(), U256::from(SUPPLY_CAP));
}

/// Token-rewarded pool, funded and ready for deposits
pub fn setup_token_pool() -> (HostEnv, PocmPoolHostRef, PocmTokenHostRef, Address) {
    let env = odra_test::env();
    let admin = env.get_account(0);

    let mut token = deploy_token(&env, admin);
    let pool = PocmPool::deploy(&env, pool_args(admin, Some(token.address())));
    fund_pool(&env, &mut token, &pool, admin);

    (env, pool, token, admin)
}

/// Token-rewarded pool with consensus delegation enabled
pub fn setup_consensus_pool() -> (
    HostEnv,
    PocmPoolHostRef,
    PocmTokenHostRef,
    MockConsensusRegistryHostRef,
    Address,
) {
    let (env, mut pool, token, admin) = setup_token_pool();
    let registry = MockConsensusRegistry::deploy(&env, NoArgs);

    env.set_caller(admin);
    pool.enable_consensus(registry.address(), U512::from(MIN_JOIN_DEPOSIT));

    (env, pool, token, registry, admin)
}

/// Register a node on the mock registry and with the pool
pub fn add_agent(
    env: &HostEnv,
    pool: &mut PocmPoolHostRef,
    registry: &mut MockConsensusRegistryHostRef,
    admin: Address,
    seed: u8,
    depositor: Address,
    node_value: U512,
    capacity: U512,
) -> PublicKey {
    let agent = agent_key(seed);
    registry.register_node(agent.clone(), depositor, node_value, capacity);
    env.set_caller(admin);
    pool.register_agent(agent.clone());
    agent
}
