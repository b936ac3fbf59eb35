//! Pending-payment lifecycle: submission rules and the decision state
//! machine.
//!
//! A pending payment is a proposed delta against a debt. Submission never
//! touches the debt; only an approval (decided by a trusted user) applies
//! the delta, and it does so exactly once.
//!
//! # Modules
//!
//! - `types` - Pending-payment domain types
//! - `decision` - approve/reject transition logic
//! - `validation` - submission and approval amount checks
//! - `error` - Payment-specific error types

pub mod decision;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod decision_props;

pub use decision::{DecisionAction, DecisionService};
pub use error::PaymentError;
pub use types::PendingPaymentStatus;
pub use validation::{validate_approval_balance, validate_submission};
