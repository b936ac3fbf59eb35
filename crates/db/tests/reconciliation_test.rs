//! Integration tests for debt reconciliation.
//!
//! Covers the full pending-payment lifecycle against a real database:
//! submission, approval (exactly-once balance mutation), rejection
//! isolation, and the concurrent double-approve / double-register races.
//!
//! Tests are skipped when no database is configured (`DATABASE_URL` or
//! `FIADO__DATABASE__URL`); the schema is migrated on first connect.

use std::env;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, IntoActiveModel, Set};
use tokio::sync::Barrier;
use uuid::Uuid;

use fiado_core::auth::Role;
use fiado_core::debt::{DebtError, PaymentType};
use fiado_core::payment::PaymentError;
use fiado_db::entities::debts;
use fiado_db::migration::{Migrator, MigratorTrait};
use fiado_db::repositories::debt::{CreateDebtInput, DebtRepository};
use fiado_db::repositories::pending_payment::{PendingPaymentRepository, SubmitPaymentInput};
use fiado_db::{CustomerRepository, SiteRepository, UserRepository};

async fn connect_or_skip() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL")
        .or_else(|_| env::var("FIADO__DATABASE__URL"))
        .ok()?;

    let db = match Database::connect(&url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("Skipping test - migration failed: {e}");
        return None;
    }

    Some(db)
}

struct Fixture {
    site_id: Uuid,
    customer_id: Uuid,
    user_id: Uuid,
}

async fn setup_fixture(db: &DatabaseConnection) -> Fixture {
    let site = SiteRepository::new(db.clone())
        .create("Test Site", None, None)
        .await
        .expect("site insert");
    let customer = CustomerRepository::new(db.clone())
        .create(site.id, "Test Customer", None, None)
        .await
        .expect("customer insert");
    let user = UserRepository::new(db.clone())
        .create(
            &format!("manager-{}@example.com", Uuid::new_v4()),
            "Test Manager",
            Role::Manager,
        )
        .await
        .expect("user insert");

    Fixture {
        site_id: site.id,
        customer_id: customer.id,
        user_id: user.id,
    }
}

async fn create_debt(db: &DatabaseConnection, fx: &Fixture, total: Decimal) -> debts::Model {
    DebtRepository::new(db.clone())
        .create(CreateDebtInput {
            site_id: fx.site_id,
            customer_id: fx.customer_id,
            created_by: fx.user_id,
            total_amount: total,
            description: Some("integration test debt".to_string()),
            notes: None,
        })
        .await
        .expect("debt insert")
}

fn submit_input(debt_id: Uuid, amount: Decimal) -> SubmitPaymentInput {
    SubmitPaymentInput {
        debt_id,
        amount,
        payment_type: PaymentType::Cash,
        reference: None,
        notes: None,
        ledger_reference: None,
    }
}

// ============================================================================
// Lifecycle scenarios
// ============================================================================

#[tokio::test]
async fn test_submit_leaves_debt_untouched_then_approve_applies() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(1500.50)).await;
    assert_eq!(debt.status, "pending");
    assert_eq!(debt.paid_amount, dec!(0));
    assert_eq!(debt.pending_amount, dec!(1500.50));

    let payments = PendingPaymentRepository::new(db.clone());
    let payment = payments
        .submit(submit_input(debt.id, dec!(500)))
        .await
        .expect("submit");
    assert_eq!(payment.status, "pending");

    // Submission never touches the debt
    let snapshot = DebtRepository::new(db.clone())
        .find_by_id(debt.id)
        .await
        .expect("find debt");
    assert_eq!(snapshot.paid_amount, dec!(0));
    assert_eq!(snapshot.pending_amount, dec!(1500.50));
    assert_eq!(snapshot.status, "pending");

    let outcome = payments.approve(payment.id).await.expect("approve");
    assert_eq!(outcome.payment.status, "approved");
    assert!(outcome.payment.decided_at.is_some());
    assert_eq!(outcome.debt.paid_amount, dec!(500.00));
    assert_eq!(outcome.debt.pending_amount, dec!(1000.50));
    assert_eq!(outcome.debt.status, "partial");
    assert_eq!(outcome.debt.last_payment_type.as_deref(), Some("cash"));
}

#[tokio::test]
async fn test_approving_full_amount_settles_debt() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(1000)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    let payment = payments
        .submit(submit_input(debt.id, dec!(1000)))
        .await
        .expect("submit");
    let outcome = payments.approve(payment.id).await.expect("approve");

    assert_eq!(outcome.debt.paid_amount, dec!(1000));
    assert_eq!(outcome.debt.pending_amount, dec!(0));
    assert_eq!(outcome.debt.status, "paid");
}

#[tokio::test]
async fn test_submission_against_settled_debt_fails() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(150)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    let payment = payments
        .submit(submit_input(debt.id, dec!(150)))
        .await
        .expect("submit");
    payments.approve(payment.id).await.expect("approve");

    // The debt is settled; a second proposal is refused outright
    let result = payments.submit(submit_input(debt.id, dec!(200))).await;
    assert!(matches!(result, Err(PaymentError::DebtAlreadySettled(_))));
}

#[tokio::test]
async fn test_reject_never_touches_the_debt() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(800)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    let payment = payments
        .submit(submit_input(debt.id, dec!(300)))
        .await
        .expect("submit");
    let rejected = payments.reject(payment.id).await.expect("reject");
    assert_eq!(rejected.status, "rejected");
    assert!(rejected.decided_at.is_some());

    let snapshot = DebtRepository::new(db.clone())
        .find_by_id(debt.id)
        .await
        .expect("find debt");
    assert_eq!(snapshot.paid_amount, dec!(0));
    assert_eq!(snapshot.pending_amount, dec!(800));
    assert_eq!(snapshot.status, "pending");
}

#[tokio::test]
async fn test_submission_boundary_amounts() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(150.00)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    // One cent over the balance is refused
    let over = payments
        .submit(submit_input(debt.id, dec!(150.01)))
        .await;
    assert!(matches!(
        over,
        Err(PaymentError::AmountExceedsBalance { .. })
    ));

    // The exact balance is accepted
    let exact = payments.submit(submit_input(debt.id, dec!(150.00))).await;
    assert!(exact.is_ok());
}

// ============================================================================
// Decision terminality
// ============================================================================

#[tokio::test]
async fn test_second_approve_fails_and_debt_mutates_once() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(1000)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    let payment = payments
        .submit(submit_input(debt.id, dec!(400)))
        .await
        .expect("submit");
    payments.approve(payment.id).await.expect("first approve");

    let second = payments.approve(payment.id).await;
    assert!(matches!(
        second,
        Err(PaymentError::AlreadyDecided { .. })
    ));

    let snapshot = DebtRepository::new(db.clone())
        .find_by_id(debt.id)
        .await
        .expect("find debt");
    assert_eq!(snapshot.paid_amount, dec!(400));
    assert_eq!(snapshot.pending_amount, dec!(600));
}

#[tokio::test]
async fn test_reject_after_approve_fails() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(500)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    let payment = payments
        .submit(submit_input(debt.id, dec!(100)))
        .await
        .expect("submit");
    payments.approve(payment.id).await.expect("approve");

    let result = payments.reject(payment.id).await;
    assert!(matches!(result, Err(PaymentError::AlreadyDecided { .. })));
}

#[tokio::test]
async fn test_approval_overdraw_recheck() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    // Two proposals whose sum exceeds the balance; the second approval
    // must fail the re-check and leave its record pending.
    let debt = create_debt(&db, &fx, dec!(150)).await;
    let payments = PendingPaymentRepository::new(db.clone());

    let first = payments
        .submit(submit_input(debt.id, dec!(100)))
        .await
        .expect("submit first");
    let second = payments
        .submit(submit_input(debt.id, dec!(100)))
        .await
        .expect("submit second");

    payments.approve(first.id).await.expect("approve first");

    let result = payments.approve(second.id).await;
    assert!(matches!(
        result,
        Err(PaymentError::AmountExceedsBalance { .. })
    ));

    // The loser is untouched and the debt holds the first approval only
    let loser = payments.find_by_id(second.id).await.expect("find loser");
    assert_eq!(loser.status, "pending");

    let snapshot = DebtRepository::new(db.clone())
        .find_by_id(debt.id)
        .await
        .expect("find debt");
    assert_eq!(snapshot.paid_amount, dec!(100));
    assert_eq!(snapshot.pending_amount, dec!(50));
}

// ============================================================================
// Concurrency races
// ============================================================================

#[tokio::test]
async fn test_concurrent_double_approve_single_mutation() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(1000)).await;
    let payments = PendingPaymentRepository::new(db.clone());
    let payment = payments
        .submit(submit_input(debt.id, dec!(250)))
        .await
        .expect("submit");

    let db = Arc::new(db);
    let barrier = Arc::new(Barrier::new(2));

    let mut handles = Vec::with_capacity(2);
    for _ in 0..2 {
        let db = Arc::clone(&db);
        let barrier = Arc::clone(&barrier);
        let payment_id = payment.id;
        handles.push(tokio::spawn(async move {
            let repo = PendingPaymentRepository::new((*db).clone());
            barrier.wait().await;
            repo.approve(payment_id).await
        }));
    }

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one approval must win");
    assert!(results.iter().any(|r| matches!(
        r,
        Err(PaymentError::AlreadyDecided { .. })
    )));

    let snapshot = DebtRepository::new((*db).clone())
        .find_by_id(debt.id)
        .await
        .expect("find debt");
    assert_eq!(snapshot.paid_amount, dec!(250), "balance mutated once");
    assert_eq!(snapshot.pending_amount, dec!(750));
}

#[tokio::test]
async fn test_concurrent_register_payment_no_lost_update() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(150)).await;

    let db = Arc::new(db);
    let barrier = Arc::new(Barrier::new(2));

    let mut handles = Vec::with_capacity(2);
    for _ in 0..2 {
        let db = Arc::clone(&db);
        let barrier = Arc::clone(&barrier);
        let debt_id = debt.id;
        handles.push(tokio::spawn(async move {
            let repo = DebtRepository::new((*db).clone());
            barrier.wait().await;
            repo.register_payment(debt_id, dec!(100), PaymentType::Transfer, None)
                .await
        }));
    }

    let results: Vec<Result<_, DebtError>> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .collect();
    assert!(results.iter().all(Result::is_ok));

    // Both serialized on the row lock: paid grew by exactly 200, the
    // clamp absorbed the overdraw, no lost update.
    let snapshot = DebtRepository::new((*db).clone())
        .find_by_id(debt.id)
        .await
        .expect("find debt");
    assert_eq!(snapshot.paid_amount, dec!(200));
    assert_eq!(snapshot.pending_amount, dec!(0));
    assert_eq!(snapshot.status, "paid");
}

// ============================================================================
// Debt lifecycle guards
// ============================================================================

#[tokio::test]
async fn test_delete_refused_once_payments_exist() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debts_repo = DebtRepository::new(db.clone());
    let payments = PendingPaymentRepository::new(db.clone());

    // A pending-payment reference alone blocks deletion
    let debt = create_debt(&db, &fx, dec!(300)).await;
    payments
        .submit(submit_input(debt.id, dec!(50)))
        .await
        .expect("submit");
    let result = debts_repo.delete(debt.id).await;
    assert!(matches!(result, Err(DebtError::HasPayments(_))));

    // A registered payment blocks deletion too
    let other = create_debt(&db, &fx, dec!(300)).await;
    debts_repo
        .register_payment(other.id, dec!(10), PaymentType::Cash, None)
        .await
        .expect("register");
    let result = debts_repo.delete(other.id).await;
    assert!(matches!(result, Err(DebtError::HasPayments(_))));

    // Untouched debts delete cleanly
    let clean = create_debt(&db, &fx, dec!(300)).await;
    debts_repo.delete(clean.id).await.expect("delete");
    assert!(matches!(
        debts_repo.find_by_id(clean.id).await,
        Err(DebtError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_direct_payment_clamps_overpayment() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(100)).await;
    let repo = DebtRepository::new(db.clone());

    let updated = repo
        .register_payment(debt.id, dec!(130), PaymentType::Card, Some("overpaid"))
        .await
        .expect("register");

    assert_eq!(updated.paid_amount, dec!(130));
    assert_eq!(updated.pending_amount, dec!(0));
    assert_eq!(updated.status, "paid");
    assert_eq!(updated.last_payment_type.as_deref(), Some("card"));
    assert_eq!(updated.notes.as_deref(), Some("overpaid"));
}

#[tokio::test]
async fn test_approval_carries_payment_notes_onto_debt() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;
    let payments = PendingPaymentRepository::new(db.clone());

    // A submission with notes appends them to the debt on approval
    let debt = create_debt(&db, &fx, dec!(200)).await;
    let payment = payments
        .submit(SubmitPaymentInput {
            notes: Some("paid at till".to_string()),
            ..submit_input(debt.id, dec!(80))
        })
        .await
        .expect("submit");
    let outcome = payments.approve(payment.id).await.expect("approve");
    assert_eq!(outcome.debt.notes.as_deref(), Some("paid at till"));

    // A second approval on the same debt appends below the first note
    let second = payments
        .submit(SubmitPaymentInput {
            notes: Some("transfer receipt 42".to_string()),
            ..submit_input(debt.id, dec!(20))
        })
        .await
        .expect("submit");
    let outcome = payments.approve(second.id).await.expect("approve");
    assert_eq!(
        outcome.debt.notes.as_deref(),
        Some("paid at till\ntransfer receipt 42")
    );

    // Without submitter notes the debt records the approval itself
    let bare_debt = create_debt(&db, &fx, dec!(50)).await;
    let bare = payments
        .submit(submit_input(bare_debt.id, dec!(50)))
        .await
        .expect("submit");
    let outcome = payments.approve(bare.id).await.expect("approve");
    assert_eq!(
        outcome.debt.notes.as_deref(),
        Some(format!("Approved pending payment {}", bare.id).as_str())
    );
}

#[tokio::test]
async fn test_cancelled_debt_refuses_payments() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let fx = setup_fixture(&db).await;

    let debt = create_debt(&db, &fx, dec!(100)).await;
    let mut active = debt.clone().into_active_model();
    active.status = Set("cancelled".to_string());
    active.update(&db).await.expect("cancel debt");

    let result = DebtRepository::new(db.clone())
        .register_payment(debt.id, dec!(10), PaymentType::Cash, None)
        .await;
    assert!(matches!(result, Err(DebtError::Cancelled(id)) if id == debt.id));

    let result = PendingPaymentRepository::new(db.clone())
        .submit(submit_input(debt.id, dec!(10)))
        .await;
    assert!(matches!(
        result,
        Err(PaymentError::Debt(DebtError::Cancelled(id))) if id == debt.id
    ));
}
