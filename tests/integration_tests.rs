//! Integration tests for the POCM mining pool
//!
//! These tests cover admin controls and multi-step scenarios.

mod test_utils;

use odra::casper_types::U512;
use odra::host::HostRef;
use odra::prelude::*;

use pocm::accrual::ACC_PRECISION;
use pocm::errors::Error;
use pocm::events::AdminTransferred;

use test_utils::*;

#[test]
fn test_initial_state() {
    let (_env, pool, _token, admin) = setup_token_pool();

    let state = pool.pool_state();
    assert_eq!(state.end_block, state.last_reward_block + DURATION_BLOCKS);
    assert_eq!(state.reward_per_block, U512::from(REWARD_PER_BLOCK));
    assert_eq!(pool.reward_supply_cap(), U512::from(SUPPLY_CAP));
    assert_eq!(pool.allocated_amount(), U512::zero());
    assert_eq!(pool.total_staked(), U512::zero());
    assert_eq!(pool.depositor_count(), 0);
    assert_eq!(pool.get_admin(), Some(admin));
    assert!(!pool.is_consensus_enabled());
    assert!(pool.get_agents().is_empty());
}

#[test]
fn test_transfer_admin() {
    let (env, mut pool, _token, admin) = setup_token_pool();
    let new_admin = env.get_account(1);

    env.set_caller(admin);
    pool.transfer_admin(new_admin);
    assert!(env.emitted_event(
        &pool,
        AdminTransferred {
            old_admin: admin,
            new_admin,
        }
    ));

    // Old admin can no longer act
    let result = pool.try_add_reward_supply(tokens(1));
    assert_eq!(result.unwrap_err(), Error::NotAdmin.into());

    env.set_caller(new_admin);
    pool.add_reward_supply(tokens(1));
    assert_eq!(pool.reward_supply_cap(), U512::from(SUPPLY_CAP) + tokens(1));
}

#[test]
fn test_non_admin_calls() {
    let (env, mut pool, _token, _admin) = setup_token_pool();
    let user = env.get_account(1);

    env.set_caller(user);
    let result = pool.try_transfer_admin(user);
    assert_eq!(result.unwrap_err(), Error::NotAdmin.into());

    let result = pool.try_set_node_provider_award(false);
    assert_eq!(result.unwrap_err(), Error::NotAdmin.into());

    let result = pool.try_approve_reward_spender(user, tokens(1));
    assert_eq!(result.unwrap_err(), Error::NotAdmin.into());

    let result = pool.try_remove_agent(agent_key(1), false);
    assert_eq!(result.unwrap_err(), Error::NotAdmin.into());
}

#[test]
fn test_add_reward_supply_zero() {
    let (env, mut pool, _token, admin) = setup_token_pool();

    env.set_caller(admin);
    let result = pool.try_add_reward_supply(U512::zero());

    assert_eq!(result.unwrap_err(), Error::AmountMustBePositive.into());
}

#[test]
fn test_approve_reward_spender() {
    let (env, mut pool, token, admin) = setup_token_pool();
    let spender = env.get_account(3);

    env.set_caller(admin);
    pool.approve_reward_spender(spender, tokens(25));

    assert_eq!(
        token.allowance(pool.address(), spender),
        (25 * TOKEN).into()
    );
}

#[test]
fn test_approve_rejects_amount_beyond_token_range() {
    let (env, mut pool, token, admin) = setup_token_pool();
    let spender = env.get_account(3);

    env.set_caller(admin);
    let result = pool.try_approve_reward_spender(spender, U512::one() << 256);

    assert_eq!(result.unwrap_err(), Error::RewardAmountOverflow.into());
    assert!(token.allowance(pool.address(), spender).is_zero());
}

#[test]
fn test_full_mining_lifecycle() {
    // 1. Two users deposit, one operator runs an agent
    // 2. Idle principal is delegated and block rewards come in
    // 3. Everyone leaves; every ledger returns to zero
    let (env, mut pool, mut token, mut registry, admin) = setup_consensus_pool();
    let user1 = env.get_account(1);
    let user2 = env.get_account(2);
    let operator = env.get_account(5);

    let agent = add_agent(&env, &mut pool, &mut registry, admin, 1, operator, cspr(200), cspr(10_000));

    env.set_caller(user1);
    pool.with_tokens(cspr(100)).deposit();
    env.set_caller(user2);
    pool.with_tokens(cspr(300)).deposit();
    assert_eq!(pool.delegated_to(agent.clone()), cspr(400));

    advance_blocks(&env, 20);
    registry
        .with_tokens(cspr(4))
        .distribute_reward(pool.address());

    // 200 POCM over 600 staked, floored per share
    let acc_per_share = tokens(200) * U512::from(ACC_PRECISION) / cspr(600);
    let earned = |stake: U512| stake * acc_per_share / U512::from(ACC_PRECISION);
    let user2_reward = earned(cspr(300));
    assert_eq!(pool.pending_reward(user1), earned(cspr(100)));
    assert_eq!(pool.pending_reward(user2), user2_reward);
    assert_eq!(pool.pending_reward(operator), earned(cspr(200)));

    env.set_caller(user1);
    pool.quit();
    env.set_caller(user2);
    pool.quit();
    env.set_caller(admin);
    pool.remove_agent(agent.clone(), false);

    assert_eq!(pool.depositor_count(), 0);
    assert_eq!(pool.total_staked(), U512::zero());
    assert_eq!(pool.total_deposit(), U512::zero());
    assert_eq!(pool.delegated_to(agent), U512::zero());
    assert_eq!(pool.free_consensus_amount(), U512::zero());
    assert_eq!(env.balance_of(&pool.address()), cspr(4));

    let beneficiary = env.get_account(8);
    env.set_caller(admin);
    pool.transfer_consensus_reward(beneficiary);
    assert_eq!(env.balance_of(&pool.address()), U512::zero());

    // Rewards become spendable once the lock expires
    env.advance_block_time(LOCK_MS);
    env.set_caller(user2);
    assert_eq!(token.release_locked(), user2_reward);
    assert!(pool.allocated_amount() <= tokens(200));
}
