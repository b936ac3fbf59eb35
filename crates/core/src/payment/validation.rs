//! Submission and approval amount checks.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::debt::{DebtError, DebtStatus};
use crate::payment::error::PaymentError;
use fiado_shared::types::money::valid_money_scale;

/// Validates a pending-payment submission against a debt snapshot.
///
/// Checked in order:
/// 1. amount must be strictly positive with money scale
/// 2. the debt must still accept payments (not cancelled, not settled)
/// 3. the amount must not exceed the outstanding balance
pub fn validate_submission(
    debt_id: Uuid,
    amount: Decimal,
    debt_status: DebtStatus,
    debt_pending: Decimal,
) -> Result<(), PaymentError> {
    if amount <= Decimal::ZERO || !valid_money_scale(amount) {
        return Err(PaymentError::InvalidAmount(amount));
    }

    if debt_status == DebtStatus::Cancelled {
        return Err(PaymentError::Debt(DebtError::Cancelled(debt_id)));
    }

    if !debt_status.accepts_payments() || debt_pending <= Decimal::ZERO {
        return Err(PaymentError::DebtAlreadySettled(debt_id));
    }

    if amount > debt_pending {
        return Err(PaymentError::AmountExceedsBalance {
            amount,
            pending: debt_pending,
        });
    }

    Ok(())
}

/// Re-checks the amount against the debt balance at approval time.
///
/// The balance may have shrunk since submission (another payment approved
/// first); approving then would drive the paid amount past the total, so
/// the approval fails and the record stays pending.
pub fn validate_approval_balance(
    amount: Decimal,
    debt_pending: Decimal,
) -> Result<(), PaymentError> {
    if amount > debt_pending {
        return Err(PaymentError::AmountExceedsBalance {
            amount,
            pending: debt_pending,
        });
    }
    Ok(())
}
