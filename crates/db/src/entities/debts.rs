//! `SeaORM` Entity for debts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_id: Uuid,
    pub customer_id: Uuid,
    pub created_by: Uuid,
    /// Immutable after creation; payments never change it.
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    /// Always `total_amount - paid_amount`, clamped at zero.
    pub pending_amount: Decimal,
    /// One of `pending`, `partial`, `paid`, `cancelled`.
    pub status: String,
    pub last_payment_type: Option<String>,
    /// Chain transaction hash from the most recent anchoring attempt.
    pub ledger_reference: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sites::Entity",
        from = "Column::SiteId",
        to = "super::sites::Column::Id"
    )]
    Sites,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::pending_payments::Entity")]
    PendingPayments,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::pending_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PendingPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
