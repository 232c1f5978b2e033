//! Property-based tests for the allocation cap and money conservation.

use proptest::prelude::*;
use tranche_shared::types::OwnerId;

use super::rules::fixtures::{allocation, balance, installment, request, wallet};
use super::rules::{plan_allocation, plan_void};
use super::types::{Allocation, AllocationStatus};
use crate::ledger::LedgerError;

#[derive(Debug, Clone)]
enum Op {
    Allocate(i64),
    Void(usize),
    TopUp(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1i64..2_000_000i64).prop_map(Op::Allocate),
        1 => (0usize..16).prop_map(Op::Void),
        1 => (1i64..1_000_000i64).prop_map(Op::TopUp),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of allocations, voids and top-ups against one
    /// installment and one wallet:
    /// - active allocations never exceed the installment total
    /// - the balance never goes negative
    /// - the balance equals the sum of signed movements
    /// - every accepted write bumps the version by exactly one
    #[test]
    fn prop_cap_and_conservation_hold(
        total in 1i64..5_000_000i64,
        opening in 0i64..3_000_000i64,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let owner = OwnerId::new();
        let inst = installment(owner, total);
        let w = wallet(owner);
        let mut snap = balance(&w, opening, 1);
        let mut movements: Vec<i64> = vec![opening];
        let mut allocations: Vec<Allocation> = Vec::new();

        for op in ops {
            let version_before = snap.version;
            let active: i64 = allocations
                .iter()
                .filter(|a| a.status == AllocationStatus::Active)
                .map(|a| a.amount)
                .sum();

            let accepted = match op {
                Op::Allocate(amount) => {
                    let req = request(&inst, &w, amount);
                    match plan_allocation(&req, &inst, &w, &snap, active) {
                        Ok(plan) => {
                            movements.push(plan.entry.direction.signed(plan.entry.amount));
                            snap.balance = plan.balance_update.new_balance;
                            snap.version = plan.balance_update.new_version;
                            allocations.push(allocation(&req, AllocationStatus::Active));
                            true
                        }
                        Err(LedgerError::InsufficientFunds { .. }) => {
                            prop_assert!(amount > snap.balance);
                            false
                        }
                        Err(LedgerError::AllocationExceedsRemaining { remaining, .. }) => {
                            prop_assert_eq!(remaining, total - active);
                            prop_assert!(amount > remaining);
                            false
                        }
                        Err(other) => return Err(TestCaseError::fail(format!("{other:?}"))),
                    }
                }
                Op::Void(index) => {
                    if allocations.is_empty() {
                        false
                    } else {
                        let idx = index % allocations.len();
                        match plan_void(&allocations[idx], &w, &snap) {
                            Ok(plan) => {
                                movements.push(plan.entry.direction.signed(plan.entry.amount));
                                snap.balance = plan.balance_update.new_balance;
                                snap.version = plan.balance_update.new_version;
                                allocations[idx].status = AllocationStatus::Void;
                                true
                            }
                            Err(LedgerError::AllocationNotActive(_)) => {
                                prop_assert_eq!(allocations[idx].status, AllocationStatus::Void);
                                false
                            }
                            Err(other) => return Err(TestCaseError::fail(format!("{other:?}"))),
                        }
                    }
                }
                Op::TopUp(amount) => {
                    let update = snap.apply(crate::ledger::Direction::Credit, amount, true)
                        .map_err(|e| TestCaseError::fail(format!("{e:?}")))?;
                    movements.push(amount);
                    snap.balance = update.new_balance;
                    snap.version = update.new_version;
                    true
                }
            };

            let active_after: i64 = allocations
                .iter()
                .filter(|a| a.status == AllocationStatus::Active)
                .map(|a| a.amount)
                .sum();
            prop_assert!(active_after <= total);
            prop_assert!(snap.balance >= 0);
            prop_assert_eq!(snap.balance, movements.iter().sum::<i64>());
            prop_assert_eq!(snap.version, version_before + i64::from(accepted));
        }
    }
}
