//! Livenet deployment script for POCM contracts
//!
//! Deploys PocmToken and PocmPool to Casper network, funds the pool with the
//! reward supply cap and optionally enables consensus delegation.
//!
//! Optional environment:
//! - `REWARD_PER_BLOCK`, `REWARD_SUPPLY_CAP`, `DURATION_BLOCKS` (token units / blocks)
//! - `REGISTRY_ADDRESS`, `MIN_JOIN_DEPOSIT` (motes) to enable consensus

use std::str::FromStr;

use odra::casper_types::{U256, U512};
use odra::host::Deployer;
use odra::prelude::{Address, Addressable};
use pocm::{PocmPool, PocmPoolInitArgs, PocmToken, PocmTokenInitArgs};

const CSPR: u64 = 1_000_000_000;
const TOKEN: u64 = 1_000_000_000;

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .map(|value| value.parse().expect("Invalid number"))
        .unwrap_or(default)
}

fn main() {
    // Load the Casper livenet environment
    let env = odra_casper_livenet_env::env();

    // Caller is the deployer and admin
    let deployer = env.caller();
    println!("Deployer address: {}", deployer.to_string());

    let reward_per_block = env_u64("REWARD_PER_BLOCK", 10 * TOKEN);
    let reward_supply_cap = env_u64("REWARD_SUPPLY_CAP", 1_000_000 * TOKEN);
    let duration_blocks = env_u64("DURATION_BLOCKS", 1_000_000);

    // Step 1: Deploy the reward token, full supply to the deployer
    println!("\n=== Deploying PocmToken ===");
    env.set_gas(200_000_000_000u64); // 200 CSPR gas (CEP-18 needs more)

    let token = PocmToken::deploy(
        &env,
        PocmTokenInitArgs {
            name: "POCM Reward".to_string(),
            symbol: "POCM".to_string(),
            decimals: 9,
            initial_supply: U256::from(reward_supply_cap),
            owner: deployer,
        },
    );
    let token_address = token.address();
    println!("PocmToken deployed at: {}", token_address.to_string());

    // Step 2: Deploy the mining pool
    println!("\n=== Deploying PocmPool ===");
    env.set_gas(400_000_000_000u64); // 400 CSPR gas

    let pool = PocmPool::deploy(
        &env,
        PocmPoolInitArgs {
            admin: deployer,
            reward_token: Some(token_address),
            reward_per_block: U512::from(reward_per_block),
            reward_supply_cap: U512::from(reward_supply_cap),
            duration_blocks,
            block_interval_ms: 32_768,
            lock_duration_ms: 7 * 24 * 60 * 60 * 1000,
            min_stake: U512::from(10 * CSPR),
            max_stake: U512::from(1_000_000 * CSPR),
            award_node_providers: true,
        },
    );
    let pool_address = pool.address();
    println!("PocmPool deployed at: {}", pool_address.to_string());

    // Step 3: Fund the pool with the whole reward supply
    println!("\n=== Funding PocmPool ===");
    env.set_gas(5_000_000_000u64); // 5 CSPR gas

    let mut token = token;
    token.transfer(pool_address, U256::from(reward_supply_cap));
    println!("Transferred {} POCM units to the pool", reward_supply_cap);

    // Step 4: Consensus delegation, if a registry is configured
    let mut pool = pool;
    if let Ok(registry) = std::env::var("REGISTRY_ADDRESS") {
        println!("\n=== Enabling consensus delegation ===");
        env.set_gas(10_000_000_000u64); // 10 CSPR gas

        let registry = Address::from_str(&registry).expect("Invalid registry address");
        let min_join_deposit = env_u64("MIN_JOIN_DEPOSIT", 20_000 * CSPR);
        pool.enable_consensus(registry, U512::from(min_join_deposit));
        println!("Consensus enabled with registry {}", registry.to_string());
    }

    println!("\n=== Deployment Summary ===");
    println!("PocmPool: {}", pool_address.to_string());
    println!("PocmToken: {}", token_address.to_string());
    println!("Admin: {}", deployer.to_string());
    println!("\nDeployment complete!");
}
