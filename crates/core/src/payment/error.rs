//! Pending-payment error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::debt::error::DebtError;
use crate::payment::types::PendingPaymentStatus;

/// Errors that can occur during pending-payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Pending payment not found.
    #[error("Pending payment {0} not found")]
    NotFound(Uuid),

    /// Decision attempted on a record that already settled.
    #[error("Pending payment {id} is already {status}")]
    AlreadyDecided {
        /// The pending payment.
        id: Uuid,
        /// The terminal status it settled into.
        status: PendingPaymentStatus,
    },

    /// Amount is non-positive or has more than two fractional digits.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// The referenced debt has no outstanding balance.
    #[error("Debt {0} is already fully paid")]
    DebtAlreadySettled(Uuid),

    /// Amount exceeds the debt's outstanding balance.
    #[error("Payment amount {amount} exceeds pending amount {pending}")]
    AmountExceedsBalance {
        /// The proposed payment amount.
        amount: Decimal,
        /// The debt's outstanding balance.
        pending: Decimal,
    },

    /// Debt-side failure during reconciliation.
    #[error(transparent)]
    Debt(#[from] DebtError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PaymentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadyDecided { .. } => 409,
            Self::InvalidAmount(_)
            | Self::DebtAlreadySettled(_)
            | Self::AmountExceedsBalance { .. } => 400,
            Self::Debt(inner) => inner.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PENDING_PAYMENT_NOT_FOUND",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::DebtAlreadySettled(_) => "DEBT_ALREADY_SETTLED",
            Self::AmountExceedsBalance { .. } => "AMOUNT_EXCEEDS_BALANCE",
            Self::Debt(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
