//! Property tests for the debt balance invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::debt::balance::{apply_payment, status_for};
use crate::debt::types::DebtStatus;

/// Strategy for non-negative cent amounts up to 10 million units.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for strictly positive cent amounts.
fn payment_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After any payment, paid + pending equals total whenever the
    /// payment does not overdraw, and pending is never negative.
    #[test]
    fn prop_balance_invariant(
        total in amount_strategy(),
        paid in amount_strategy(),
        amount in payment_strategy(),
    ) {
        let applied = apply_payment(total, paid, amount);

        prop_assert!(applied.pending_amount >= Decimal::ZERO);

        if applied.paid_amount <= total {
            prop_assert_eq!(applied.paid_amount + applied.pending_amount, total);
        } else {
            // Overdraw clamps pending to zero
            prop_assert_eq!(applied.pending_amount, Decimal::ZERO);
        }
    }

    /// pending == 0 exactly when the status is paid.
    #[test]
    fn prop_settled_iff_paid(
        total in amount_strategy(),
        paid in amount_strategy(),
        amount in payment_strategy(),
    ) {
        let applied = apply_payment(total, paid, amount);

        prop_assert_eq!(
            applied.pending_amount == Decimal::ZERO,
            applied.status == DebtStatus::Paid
        );
    }

    /// A payment never reduces the paid amount, and the paid amount
    /// grows by exactly the payment.
    #[test]
    fn prop_paid_grows_exactly(
        total in amount_strategy(),
        paid in amount_strategy(),
        amount in payment_strategy(),
    ) {
        let applied = apply_payment(total, paid, amount);
        prop_assert_eq!(applied.paid_amount, paid + amount);
    }

    /// Applying two payments sequentially equals applying their sum.
    #[test]
    fn prop_payments_compose(
        total in amount_strategy(),
        first in payment_strategy(),
        second in payment_strategy(),
    ) {
        let step = apply_payment(total, Decimal::ZERO, first);
        let sequential = apply_payment(total, step.paid_amount, second);
        let combined = apply_payment(total, Decimal::ZERO, first + second);

        prop_assert_eq!(sequential, combined);
    }

    /// Status derivation matches the balance it was derived from.
    #[test]
    fn prop_status_matches_balance(
        total in amount_strategy(),
        paid in amount_strategy(),
    ) {
        let status = status_for(total, paid);

        if paid >= total {
            prop_assert_eq!(status, DebtStatus::Paid);
        } else if paid > Decimal::ZERO {
            prop_assert_eq!(status, DebtStatus::Partial);
        } else {
            prop_assert_eq!(status, DebtStatus::Pending);
        }
    }
}
