//! The single balance-mutation computation for debts.
//!
//! Invariant maintained by every application:
//! `paid_amount + pending_amount == total_amount`, with `pending_amount`
//! clamped to zero on overpayment (the clamp absorbs the excess so the
//! stored pair never goes negative; callers that must not overdraw check
//! the balance before applying).

use rust_decimal::Decimal;

use crate::debt::error::DebtError;
use crate::debt::types::DebtStatus;
use fiado_shared::types::money::valid_money_scale;

/// Result of applying a payment to a debt balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentApplication {
    /// New cumulative paid amount.
    pub paid_amount: Decimal,
    /// New outstanding amount, clamped to zero.
    pub pending_amount: Decimal,
    /// Status derived from the new balance.
    pub status: DebtStatus,
}

/// Derives the debt status from its balance.
#[must_use]
pub fn status_for(total_amount: Decimal, paid_amount: Decimal) -> DebtStatus {
    if paid_amount >= total_amount {
        DebtStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        DebtStatus::Partial
    } else {
        DebtStatus::Pending
    }
}

/// Applies a payment to a debt balance.
///
/// Computes `new_paid = paid + amount` and
/// `new_pending = max(total - new_paid, 0)` with exact decimal
/// arithmetic, then derives the status.
#[must_use]
pub fn apply_payment(
    total_amount: Decimal,
    paid_amount: Decimal,
    amount: Decimal,
) -> PaymentApplication {
    let new_paid = paid_amount + amount;
    let new_pending = (total_amount - new_paid).max(Decimal::ZERO);

    PaymentApplication {
        paid_amount: new_paid,
        pending_amount: new_pending,
        status: status_for(total_amount, new_paid),
    }
}

/// Validates a debt's total amount at creation: non-negative, money scale.
pub fn validate_total_amount(amount: Decimal) -> Result<(), DebtError> {
    if amount < Decimal::ZERO || !valid_money_scale(amount) {
        return Err(DebtError::InvalidAmount(amount));
    }
    Ok(())
}

/// Validates a payment amount: strictly positive, money scale.
pub fn validate_payment_amount(amount: Decimal) -> Result<(), DebtError> {
    if amount <= Decimal::ZERO || !valid_money_scale(amount) {
        return Err(DebtError::InvalidAmount(amount));
    }
    Ok(())
}
