//! Debt balance math and status rules.
//!
//! A debt's balance is mutated through exactly one computation path:
//! [`balance::apply_payment`]. Everything else in the system either reads
//! debt state or proposes a delta for later application.
//!
//! # Modules
//!
//! - `types` - Debt domain types (DebtStatus, PaymentType)
//! - `balance` - The single balance-mutation computation
//! - `error` - Debt-specific error types

pub mod balance;
pub mod error;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{
    PaymentApplication, apply_payment, status_for, validate_payment_amount, validate_total_amount,
};
pub use error::DebtError;
pub use types::{DebtStatus, PaymentType};
