//! Property-Based Testing for the tokenomics engine
//!
//! Properties tested:
//! - Supply conservation across arbitrary operation sequences
//! - Failed operations leave no trace
//! - Tranche `released` never decreases
//! - Linear vesting is monotonic and capped

mod common;

use common::{account, owner, Harness};
use demy_tokenomics::{
    allocation::Tranche,
    config::{DAY_SECONDS, MONTH_SECONDS},
    crypto::Address,
    ledger::{Amount, Ledger},
    utils::math::linear_vested,
    vesting::VestingAccount,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Buy(u8, Amount),
    Stake(u8, Amount),
    Unstake(u8, Amount),
    Withdraw(u8),
    Claim(u8),
    ReleaseVesting(u8),
    ReleaseTranches,
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let users = 0u8..3;
    prop_oneof![
        (users.clone(), 0..5_000u128).prop_map(|(u, a)| Op::Buy(u, a)),
        (users.clone(), 0..2_000u128).prop_map(|(u, a)| Op::Stake(u, a)),
        (users.clone(), 0..2_000u128).prop_map(|(u, a)| Op::Unstake(u, a)),
        users.clone().prop_map(Op::Withdraw),
        users.clone().prop_map(Op::Claim),
        users.prop_map(Op::ReleaseVesting),
        Just(Op::ReleaseTranches),
        (0..120 * DAY_SECONDS).prop_map(Op::Advance),
    ]
}

fn user(index: u8) -> Address {
    account(0x60 + index)
}

fn deploy_with_users() -> Harness {
    let mut h = Harness::deploy();
    h.engine.set_stake_ledger(&owner()).unwrap();
    for index in 0..3 {
        let buyer = user(index);
        h.fund_buyer(&buyer, 1_000_000);
        h.fund(&buyer, 5_000);
        h.engine.add_to_whitelist(&owner(), buyer).unwrap();
    }
    h
}

fn apply(h: &mut Harness, op: &Op) -> bool {
    let result = match op {
        Op::Buy(u, amount) => h.engine.buy(&user(*u), *amount).map(|_| ()),
        Op::Stake(u, amount) => h.engine.stake(&user(*u), *amount),
        Op::Unstake(u, amount) => h.engine.unstake(&user(*u), *amount).map(|_| ()),
        Op::Withdraw(u) => h.engine.withdraw(&user(*u)).map(|_| ()),
        Op::Claim(u) => h.engine.claim(&user(*u)).map(|_| ()),
        Op::ReleaseVesting(u) => h.engine.release_vesting(&user(*u)).map(|_| ()),
        Op::ReleaseTranches => h.engine.release_locked_balances(&owner()).map(|_| ()),
        Op::Advance(seconds) => {
            h.clock.advance(*seconds);
            Ok(())
        }
    };
    result.is_ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_supply_is_conserved(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut h = deploy_with_users();
        let mut released = [0 as Amount; 4];

        for op in &ops {
            let before = h.engine.supply_breakdown().unwrap();
            let balances: Vec<_> = (0..3).map(|u| h.engine.balance_of(&user(u))).collect();

            if !apply(&mut h, op) {
                // All-or-nothing
                prop_assert_eq!(h.engine.supply_breakdown().unwrap(), before);
                let after: Vec<_> = (0..3).map(|u| h.engine.balance_of(&user(u))).collect();
                prop_assert_eq!(after, balances);
            }

            h.assert_supply_conserved();
            for tranche in Tranche::ALL {
                let snapshot = h.engine.locked_balances(tranche).unwrap();
                prop_assert!(snapshot.released >= released[tranche.index() as usize]);
                prop_assert!(snapshot.released <= snapshot.total_amount);
                released[tranche.index() as usize] = snapshot.released;
            }
        }
    }

    #[test]
    fn test_linear_vesting_is_monotonic(
        total in 0u128..=u128::MAX / 2,
        start in 0u64..1_000_000,
        duration in 0u64..100 * MONTH_SECONDS,
        t1 in 0u64..200_000_000,
        t2 in 0u64..200_000_000,
    ) {
        let (early, late) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let a = linear_vested(total, start, duration, early).unwrap();
        let b = linear_vested(total, start, duration, late).unwrap();
        prop_assert!(a <= b);
        prop_assert!(b <= total);
    }

    #[test]
    fn test_vesting_account_never_overpays(
        deposits in prop::collection::vec(1u128..1_000_000, 1..5),
        steps in prop::collection::vec(0u64..30 * DAY_SECONDS, 1..20),
    ) {
        let address = Address::new([0xAB; 32]);
        let beneficiary = Address::new([0xCD; 32]);
        let mut account = VestingAccount::new(address, beneficiary, 0, 12 * MONTH_SECONDS);
        let mut ledger = Ledger::new(Amount::MAX, 18);

        let total: Amount = deposits.iter().sum();
        for deposit in &deposits {
            ledger.mint(&address, *deposit).unwrap();
        }

        let mut now = 0;
        let mut released_before = 0;
        for step in steps {
            now += step;
            account.release(&mut ledger, now).unwrap();
            prop_assert!(account.released() >= released_before);
            prop_assert!(account.released() <= total);
            prop_assert_eq!(ledger.balance_of(&beneficiary), account.released());
            released_before = account.released();
        }

        account.release(&mut ledger, 12 * MONTH_SECONDS).unwrap();
        prop_assert_eq!(account.released(), total);
        prop_assert_eq!(ledger.balance_of(&address), 0);
    }
}
