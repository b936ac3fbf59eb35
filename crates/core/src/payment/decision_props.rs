//! Property tests for the decision state machine.

use proptest::prelude::*;
use uuid::Uuid;

use crate::payment::decision::DecisionService;
use crate::payment::error::PaymentError;
use crate::payment::types::PendingPaymentStatus;

fn status_strategy() -> impl Strategy<Value = PendingPaymentStatus> {
    prop_oneof![
        Just(PendingPaymentStatus::Pending),
        Just(PendingPaymentStatus::Approved),
        Just(PendingPaymentStatus::Rejected),
    ]
}

fn terminal_strategy() -> impl Strategy<Value = PendingPaymentStatus> {
    prop_oneof![
        Just(PendingPaymentStatus::Approved),
        Just(PendingPaymentStatus::Rejected),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Terminal states reject every decision and report the status they
    /// settled into.
    #[test]
    fn prop_terminal_states_are_final(status in terminal_strategy()) {
        let id = Uuid::new_v4();

        let approve = DecisionService::approve(id, status);
        prop_assert!(
            matches!(
                approve,
                Err(PaymentError::AlreadyDecided { status: s, .. }) if s == status
            ),
            "approve on terminal status must fail with AlreadyDecided carrying that status"
        );

        let reject = DecisionService::reject(id, status);
        prop_assert!(
            matches!(
                reject,
                Err(PaymentError::AlreadyDecided { status: s, .. }) if s == status
            ),
            "reject on terminal status must fail with AlreadyDecided carrying that status"
        );
    }

    /// A decision succeeds exactly when the record is pending, and the
    /// resulting status is terminal.
    #[test]
    fn prop_decisions_only_from_pending(status in status_strategy()) {
        let id = Uuid::new_v4();
        let approve = DecisionService::approve(id, status);
        let reject = DecisionService::reject(id, status);

        if status == PendingPaymentStatus::Pending {
            prop_assert!(approve.is_ok());
            prop_assert!(reject.is_ok());
            prop_assert!(approve.unwrap().new_status.is_terminal());
            prop_assert!(reject.unwrap().new_status.is_terminal());
        } else {
            prop_assert!(approve.is_err());
            prop_assert!(reject.is_err());
        }
    }

    /// `is_valid_transition` agrees with the decision functions.
    #[test]
    fn prop_transition_table_consistent(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let valid = DecisionService::is_valid_transition(from, to);
        let reachable = match to {
            PendingPaymentStatus::Approved => {
                DecisionService::approve(Uuid::new_v4(), from).is_ok()
            }
            PendingPaymentStatus::Rejected => {
                DecisionService::reject(Uuid::new_v4(), from).is_ok()
            }
            PendingPaymentStatus::Pending => false,
        };
        prop_assert_eq!(valid, reachable);
    }
}
