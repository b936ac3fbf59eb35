//! Debt error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during debt operations.
#[derive(Debug, Error)]
pub enum DebtError {
    /// Debt not found.
    #[error("Debt {0} not found")]
    NotFound(Uuid),

    /// Site not found.
    #[error("Site {0} not found")]
    SiteNotFound(Uuid),

    /// Customer not found.
    #[error("Customer {0} not found")]
    CustomerNotFound(Uuid),

    /// Amount is negative, non-positive where a payment is expected,
    /// or has more than two fractional digits.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Debt has payments attached and cannot be deleted.
    #[error("Debt {0} has payments and cannot be deleted")]
    HasPayments(Uuid),

    /// Debt is cancelled and no longer accepts payments.
    #[error("Debt {0} is cancelled")]
    Cancelled(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DebtError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::SiteNotFound(_) | Self::CustomerNotFound(_) => 404,
            Self::InvalidAmount(_) => 400,
            Self::HasPayments(_) | Self::Cancelled(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "DEBT_NOT_FOUND",
            Self::SiteNotFound(_) => "SITE_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::HasPayments(_) => "DEBT_HAS_PAYMENTS",
            Self::Cancelled(_) => "DEBT_CANCELLED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_codes() {
        assert_eq!(DebtError::NotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(DebtError::SiteNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(DebtError::CustomerNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(DebtError::InvalidAmount(dec!(-1)).status_code(), 400);
        assert_eq!(DebtError::HasPayments(Uuid::nil()).status_code(), 409);
        assert_eq!(DebtError::Cancelled(Uuid::nil()).status_code(), 409);
        assert_eq!(DebtError::Database(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DebtError::NotFound(Uuid::nil()).error_code(),
            "DEBT_NOT_FOUND"
        );
        assert_eq!(
            DebtError::InvalidAmount(dec!(1.005)).error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            DebtError::HasPayments(Uuid::nil()).error_code(),
            "DEBT_HAS_PAYMENTS"
        );
        assert_eq!(
            DebtError::Cancelled(Uuid::nil()).error_code(),
            "DEBT_CANCELLED"
        );
    }
}
