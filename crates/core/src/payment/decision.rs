//! Decision state machine for pending payments.
//!
//! First decision wins: a decision on a record that is no longer pending
//! fails with [`PaymentError::AlreadyDecided`], carrying the status the
//! record settled into.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::payment::error::PaymentError;
use crate::payment::types::PendingPaymentStatus;

/// A validated decision with audit trail information.
#[derive(Debug, Clone, Copy)]
pub struct DecisionAction {
    /// The terminal status the record transitions into.
    pub new_status: PendingPaymentStatus,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

/// Stateless service validating decision transitions.
pub struct DecisionService;

impl DecisionService {
    /// Approve a pending payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::AlreadyDecided`] if the record is not
    /// in pending status.
    pub fn approve(
        id: Uuid,
        current_status: PendingPaymentStatus,
    ) -> Result<DecisionAction, PaymentError> {
        match current_status {
            PendingPaymentStatus::Pending => Ok(DecisionAction {
                new_status: PendingPaymentStatus::Approved,
                decided_at: Utc::now(),
            }),
            status => Err(PaymentError::AlreadyDecided { id, status }),
        }
    }

    /// Reject a pending payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::AlreadyDecided`] if the record is not
    /// in pending status.
    pub fn reject(
        id: Uuid,
        current_status: PendingPaymentStatus,
    ) -> Result<DecisionAction, PaymentError> {
        match current_status {
            PendingPaymentStatus::Pending => Ok(DecisionAction {
                new_status: PendingPaymentStatus::Rejected,
                decided_at: Utc::now(),
            }),
            status => Err(PaymentError::AlreadyDecided { id, status }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    #[must_use]
    pub fn is_valid_transition(from: PendingPaymentStatus, to: PendingPaymentStatus) -> bool {
        matches!(
            (from, to),
            (
                PendingPaymentStatus::Pending,
                PendingPaymentStatus::Approved | PendingPaymentStatus::Rejected
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let result = DecisionService::approve(Uuid::new_v4(), PendingPaymentStatus::Pending);
        assert!(result.is_ok());
        assert_eq!(
            result.unwrap().new_status,
            PendingPaymentStatus::Approved
        );
    }

    #[test]
    fn test_approve_twice_fails() {
        let id = Uuid::new_v4();
        let result = DecisionService::approve(id, PendingPaymentStatus::Approved);
        assert!(matches!(
            result,
            Err(PaymentError::AlreadyDecided {
                status: PendingPaymentStatus::Approved,
                ..
            })
        ));
    }

    #[test]
    fn test_approve_after_reject_fails() {
        let result = DecisionService::approve(Uuid::new_v4(), PendingPaymentStatus::Rejected);
        assert!(matches!(result, Err(PaymentError::AlreadyDecided { .. })));
    }

    #[test]
    fn test_reject_from_pending() {
        let result = DecisionService::reject(Uuid::new_v4(), PendingPaymentStatus::Pending);
        assert!(result.is_ok());
        assert_eq!(
            result.unwrap().new_status,
            PendingPaymentStatus::Rejected
        );
    }

    #[test]
    fn test_reject_after_approve_fails() {
        let result = DecisionService::reject(Uuid::new_v4(), PendingPaymentStatus::Approved);
        assert!(matches!(result, Err(PaymentError::AlreadyDecided { .. })));
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(DecisionService::is_valid_transition(
            PendingPaymentStatus::Pending,
            PendingPaymentStatus::Approved
        ));
        assert!(DecisionService::is_valid_transition(
            PendingPaymentStatus::Pending,
            PendingPaymentStatus::Rejected
        ));

        assert!(!DecisionService::is_valid_transition(
            PendingPaymentStatus::Approved,
            PendingPaymentStatus::Rejected
        ));
        assert!(!DecisionService::is_valid_transition(
            PendingPaymentStatus::Rejected,
            PendingPaymentStatus::Pending
        ));
        assert!(!DecisionService::is_valid_transition(
            PendingPaymentStatus::Approved,
            PendingPaymentStatus::Pending
        ));
    }
}
