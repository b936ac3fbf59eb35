//! Pending-payment repository: submission queue and reconciliation.
//!
//! Approval is the exactly-once reconciliation step: one database
//! transaction locks the pending-payment row (first decision wins), locks
//! the debt row, re-checks the balance, applies the payment, and flips the
//! record to approved. Either everything commits or nothing does.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use fiado_core::debt::{DebtError, DebtStatus, PaymentType, apply_payment};
use fiado_core::payment::{
    DecisionService, PaymentError, PendingPaymentStatus, validate_approval_balance,
    validate_submission,
};

use crate::entities::{debts, pending_payments};

/// Input for submitting a pending payment.
#[derive(Debug, Clone)]
pub struct SubmitPaymentInput {
    /// Debt the payment is proposed against.
    pub debt_id: Uuid,
    /// Proposed amount.
    pub amount: Decimal,
    /// How the payment was made.
    pub payment_type: PaymentType,
    /// Free-form payment reference (receipt number, memo).
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Submitter-supplied chain proof, recorded as-is.
    pub ledger_reference: Option<String>,
}

/// Result of an approval: the decided record and the mutated debt.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The pending payment, now approved.
    pub payment: pending_payments::Model,
    /// The debt with the payment applied.
    pub debt: debts::Model,
}

/// Pending-payment repository for queue and reconciliation operations.
#[derive(Debug, Clone)]
pub struct PendingPaymentRepository {
    db: DatabaseConnection,
}

impl PendingPaymentRepository {
    /// Creates a new pending-payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a payment proposal against a debt.
    ///
    /// Validates against a snapshot of the debt's balance; the debt itself
    /// is not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The debt is not found
    /// - The amount is invalid, the debt is cancelled or settled, or the
    ///   amount exceeds the outstanding balance
    /// - The database insert fails
    pub async fn submit(
        &self,
        input: SubmitPaymentInput,
    ) -> Result<pending_payments::Model, PaymentError> {
        let debt = debts::Entity::find_by_id(input.debt_id)
            .one(&self.db)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::Debt(DebtError::NotFound(input.debt_id)))?;

        let status = parse_debt_status(&debt.status)?;
        validate_submission(input.debt_id, input.amount, status, debt.pending_amount)?;

        let now = chrono::Utc::now().into();
        let payment = pending_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            debt_id: Set(input.debt_id),
            customer_id: Set(debt.customer_id),
            amount: Set(input.amount),
            payment_type: Set(input.payment_type.as_str().to_string()),
            reference: Set(input.reference),
            notes: Set(input.notes),
            status: Set(PendingPaymentStatus::Pending.as_str().to_string()),
            ledger_reference: Set(input.ledger_reference),
            decided_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        payment
            .insert(&self.db)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))
    }

    /// Approves a pending payment and reconciles the debt.
    ///
    /// One database transaction, in order:
    /// 1. lock the pending-payment row and check it is still pending
    /// 2. lock the debt row
    /// 3. re-check the amount against the current balance
    /// 4. apply the payment to the debt
    /// 5. flip the record to approved with a decision timestamp
    ///
    /// A concurrent decision on the same record blocks on the row lock
    /// and then fails the pending check; an approval that would overdraw
    /// (because another payment settled the debt first) fails and leaves
    /// the record pending.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pending payment is not found
    /// - The record is already approved or rejected
    /// - The amount now exceeds the debt's outstanding balance
    /// - The database operation fails
    pub async fn approve(&self, id: Uuid) -> Result<ApprovalOutcome, PaymentError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let payment = pending_payments::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::NotFound(id))?;

        let current = parse_payment_status(&payment.status)?;
        let action = DecisionService::approve(id, current)?;

        let debt = debts::Entity::find_by_id(payment.debt_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::Debt(DebtError::NotFound(payment.debt_id)))?;

        if debt.pending_amount <= Decimal::ZERO {
            return Err(PaymentError::DebtAlreadySettled(debt.id));
        }
        validate_approval_balance(payment.amount, debt.pending_amount)?;

        let applied = apply_payment(debt.total_amount, debt.paid_amount, payment.amount);
        let now = chrono::Utc::now();

        // The payment's notes travel onto the debt, like a direct payment's
        // note would.
        let note = payment
            .notes
            .clone()
            .unwrap_or_else(|| format!("Approved pending payment {}", payment.id));
        let notes = match debt.notes.as_deref() {
            Some(old) => format!("{old}\n{note}"),
            None => note,
        };

        let mut debt_active: debts::ActiveModel = debt.into();
        debt_active.paid_amount = Set(applied.paid_amount);
        debt_active.pending_amount = Set(applied.pending_amount);
        debt_active.status = Set(applied.status.as_str().to_string());
        debt_active.last_payment_type = Set(Some(payment.payment_type.clone()));
        debt_active.notes = Set(Some(notes));
        debt_active.updated_at = Set(now.into());

        let updated_debt = debt_active
            .update(&txn)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let mut payment_active: pending_payments::ActiveModel = payment.into();
        payment_active.status = Set(action.new_status.as_str().to_string());
        payment_active.decided_at = Set(Some(action.decided_at.into()));
        payment_active.updated_at = Set(now.into());

        let updated_payment = payment_active
            .update(&txn)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        Ok(ApprovalOutcome {
            payment: updated_payment,
            debt: updated_debt,
        })
    }

    /// Rejects a pending payment.
    ///
    /// Flips the record to rejected; the debt is never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pending payment is not found
    /// - The record is already approved or rejected
    /// - The database operation fails
    pub async fn reject(&self, id: Uuid) -> Result<pending_payments::Model, PaymentError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let payment = pending_payments::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::NotFound(id))?;

        let current = parse_payment_status(&payment.status)?;
        let action = DecisionService::reject(id, current)?;

        let mut active: pending_payments::ActiveModel = payment.into();
        active.status = Set(action.new_status.as_str().to_string());
        active.decided_at = Set(Some(action.decided_at.into()));
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Finds a pending payment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not found or the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<pending_payments::Model, PaymentError> {
        pending_payments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::NotFound(id))
    }

    /// Lists pending payments, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        status: Option<PendingPaymentStatus>,
    ) -> Result<Vec<pending_payments::Model>, PaymentError> {
        let mut query = pending_payments::Entity::find();
        if let Some(status) = status {
            query = query.filter(pending_payments::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_desc(pending_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))
    }

    /// Lists pending payments proposed against a debt, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_debt(
        &self,
        debt_id: Uuid,
    ) -> Result<Vec<pending_payments::Model>, PaymentError> {
        pending_payments::Entity::find()
            .filter(pending_payments::Column::DebtId.eq(debt_id))
            .order_by_desc(pending_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))
    }

    /// Lists pending payments submitted by a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<pending_payments::Model>, PaymentError> {
        pending_payments::Entity::find()
            .filter(pending_payments::Column::CustomerId.eq(customer_id))
            .order_by_desc(pending_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))
    }
}

/// Parses a stored status string back into the domain enum.
///
/// The column carries a check constraint, so a parse failure means the
/// row is corrupt and surfaces as a database error.
fn parse_payment_status(raw: &str) -> Result<PendingPaymentStatus, PaymentError> {
    PendingPaymentStatus::parse(raw)
        .ok_or_else(|| PaymentError::Database(format!("invalid pending payment status: {raw}")))
}

fn parse_debt_status(raw: &str) -> Result<DebtStatus, PaymentError> {
    DebtStatus::parse(raw)
        .ok_or_else(|| PaymentError::Database(format!("invalid debt status: {raw}")))
}
