//! Debt repository: the single authoritative balance-mutation path.
//!
//! Every change to `paid_amount`/`pending_amount` goes through
//! [`DebtRepository::register_payment`] inside a database transaction that
//! holds an exclusive lock on the debt row, so concurrent payments
//! serialize and the balance invariant holds under contention.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use fiado_core::debt::{
    DebtError, DebtStatus, PaymentType, apply_payment, status_for, validate_payment_amount,
    validate_total_amount,
};

use crate::entities::{customers, debts, pending_payments, sites};

/// Input for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtInput {
    /// Site the debt belongs to.
    pub site_id: Uuid,
    /// Customer owing the debt.
    pub customer_id: Uuid,
    /// User recording the debt.
    pub created_by: Uuid,
    /// Total owed; immutable after creation.
    pub total_amount: Decimal,
    /// What the debt is for.
    pub description: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Debt repository for balance-safe data access.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    db: DatabaseConnection,
}

impl DebtRepository {
    /// Creates a new debt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new debt.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The total amount is negative or has excess precision
    /// - The site or customer does not exist
    /// - The database insert fails
    pub async fn create(&self, input: CreateDebtInput) -> Result<debts::Model, DebtError> {
        validate_total_amount(input.total_amount)?;

        let site = sites::Entity::find_by_id(input.site_id)
            .one(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;
        if site.is_none() {
            return Err(DebtError::SiteNotFound(input.site_id));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;
        if customer.is_none() {
            return Err(DebtError::CustomerNotFound(input.customer_id));
        }

        let now = chrono::Utc::now().into();
        let status = status_for(input.total_amount, Decimal::ZERO);

        let debt = debts::ActiveModel {
            id: Set(Uuid::new_v4()),
            site_id: Set(input.site_id),
            customer_id: Set(input.customer_id),
            created_by: Set(input.created_by),
            total_amount: Set(input.total_amount),
            paid_amount: Set(Decimal::ZERO),
            pending_amount: Set(input.total_amount),
            status: Set(status.as_str().to_string()),
            last_payment_type: Set(None),
            ledger_reference: Set(None),
            description: Set(input.description),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        debt.insert(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))
    }

    /// Registers a direct payment against a debt.
    ///
    /// Runs in a database transaction holding an exclusive lock on the
    /// debt row. Overpayment is absorbed: `pending_amount` clamps to zero
    /// and the debt flips to paid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is non-positive or has excess precision
    /// - The debt is not found or is cancelled
    /// - The database operation fails
    pub async fn register_payment(
        &self,
        debt_id: Uuid,
        amount: Decimal,
        payment_type: PaymentType,
        note: Option<&str>,
    ) -> Result<debts::Model, DebtError> {
        validate_payment_amount(amount)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        let debt = debts::Entity::find_by_id(debt_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?
            .ok_or(DebtError::NotFound(debt_id))?;

        let status = DebtStatus::parse(&debt.status)
            .ok_or_else(|| DebtError::Database(format!("invalid debt status: {}", debt.status)))?;
        if status == DebtStatus::Cancelled {
            return Err(DebtError::Cancelled(debt_id));
        }

        let applied = apply_payment(debt.total_amount, debt.paid_amount, amount);

        let notes = match (note, debt.notes.as_deref()) {
            (Some(new), Some(old)) => Some(format!("{old}\n{new}")),
            (Some(new), None) => Some(new.to_string()),
            (None, old) => old.map(String::from),
        };

        let mut active: debts::ActiveModel = debt.into();
        active.paid_amount = Set(applied.paid_amount);
        active.pending_amount = Set(applied.pending_amount);
        active.status = Set(applied.status.as_str().to_string());
        active.last_payment_type = Set(Some(payment_type.as_str().to_string()));
        active.notes = Set(notes);
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Records the chain transaction hash from a successful anchoring.
    ///
    /// # Errors
    ///
    /// Returns an error if the debt is not found or the update fails.
    pub async fn set_ledger_reference(
        &self,
        debt_id: Uuid,
        reference: &str,
    ) -> Result<(), DebtError> {
        let debt = debts::Entity::find_by_id(debt_id)
            .one(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?
            .ok_or(DebtError::NotFound(debt_id))?;

        let mut active: debts::ActiveModel = debt.into();
        active.ledger_reference = Set(Some(reference.to_string()));
        active.updated_at = Set(chrono::Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        Ok(())
    }

    /// Finds a debt by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the debt is not found or the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<debts::Model, DebtError> {
        debts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?
            .ok_or(DebtError::NotFound(id))
    }

    /// Lists all debts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<debts::Model>, DebtError> {
        debts::Entity::find()
            .order_by_desc(debts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))
    }

    /// Lists debts of a site, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_site(&self, site_id: Uuid) -> Result<Vec<debts::Model>, DebtError> {
        debts::Entity::find()
            .filter(debts::Column::SiteId.eq(site_id))
            .order_by_desc(debts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))
    }

    /// Lists debts of a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<debts::Model>, DebtError> {
        debts::Entity::find()
            .filter(debts::Column::CustomerId.eq(customer_id))
            .order_by_desc(debts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))
    }

    /// Deletes a debt.
    ///
    /// Only debts with no registered payments and no pending-payment
    /// records may be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The debt is not found
    /// - The debt has payments attached
    /// - The database operation fails
    pub async fn delete(&self, debt_id: Uuid) -> Result<(), DebtError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        let debt = debts::Entity::find_by_id(debt_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?
            .ok_or(DebtError::NotFound(debt_id))?;

        if debt.paid_amount > Decimal::ZERO {
            return Err(DebtError::HasPayments(debt_id));
        }

        let references = pending_payments::Entity::find()
            .filter(pending_payments::Column::DebtId.eq(debt_id))
            .count(&txn)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;
        if references > 0 {
            return Err(DebtError::HasPayments(debt_id));
        }

        debts::Entity::delete_by_id(debt_id)
            .exec(&txn)
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DebtError::Database(e.to_string()))?;

        Ok(())
    }
}
