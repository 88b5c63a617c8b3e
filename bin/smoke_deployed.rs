//! Smoke test for deployed contracts on localnet
//!
//! Deposits into a deployed PocmPool, claims and withdraws.

use std::str::FromStr;

use odra::casper_types::U512;
use odra::host::{HostRef, HostRefLoader};
use odra::prelude::Address;
use pocm::{PocmPool, PocmToken};

fn main() {
    let env = odra_casper_livenet_env::env();
    let caller = env.caller();

    println!("=== Testing Deployed Contracts ===\n");
    println!("Caller: {}", caller.to_string());

    let pool_address = std::env::var("POCM_POOL_ADDRESS")
        .expect("POCM_POOL_ADDRESS env var must be set");
    let token_address = std::env::var("POCM_TOKEN_ADDRESS")
        .expect("POCM_TOKEN_ADDRESS env var must be set");

    let pool_addr = Address::from_str(&pool_address).expect("Invalid PocmPool address");
    let token_addr = Address::from_str(&token_address).expect("Invalid PocmToken address");

    println!("PocmPool: {}", pool_address);
    println!("PocmToken: {}", token_address);

    let mut pool = PocmPool::load(&env, pool_addr);
    let token = PocmToken::load(&env, token_addr);

    // Test 1: Read basic view functions
    println!("\n--- Test 1: View Functions ---");
    println!("Pool state: {:?}", pool.pool_state());
    println!("Current block: {}", pool.current_block());
    println!("Unallocated reward: {:?}", pool.unallocated_reward());
    println!("Accepting deposits: {}", pool.is_accepting_deposits());
    println!("Consensus enabled: {}", pool.is_consensus_enabled());

    // Test 2: Deposit 20 CSPR
    println!("\n--- Test 2: Depositing 20 CSPR ---");
    env.set_gas(15_000_000_000u64); // 15 CSPR gas

    let deposit_amount = U512::from(20_000_000_000u64); // 20 CSPR
    let principal = pool.with_tokens(deposit_amount).deposit();
    println!("SUCCESS! Principal added: {:?}", principal);
    println!("My stake: {:?}", pool.get_user_stake(caller));

    // Test 3: Claim
    println!("\n--- Test 3: Claiming ---");
    env.set_gas(15_000_000_000u64);

    let claimed = pool.claim();
    println!("SUCCESS! Claimed: {:?}", claimed);
    println!("My locks: {:?}", token.locks_of(caller));

    // Test 4: Withdraw everything
    println!("\n--- Test 4: Quitting ---");
    env.set_gas(20_000_000_000u64);

    pool.quit();
    println!("SUCCESS! Stake after quit: {:?}", pool.get_user_stake(caller));
    println!("Total deposit: {:?}", pool.total_deposit());

    println!("\n=== All Tests Passed! ===");
}
