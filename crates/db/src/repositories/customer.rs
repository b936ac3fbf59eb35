//! Customer repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::customers;

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new customer under a site.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        site_id: Uuid,
        name: &str,
        phone: Option<&str>,
        wallet_address: Option<&str>,
    ) -> Result<customers::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            site_id: Set(site_id),
            name: Set(name.to_string()),
            phone: Set(phone.map(String::from)),
            wallet_address: Set(wallet_address.map(String::from)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        customer.insert(&self.db).await
    }

    /// Finds a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<customers::Model>, DbErr> {
        customers::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists customers of a site.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_site(&self, site_id: Uuid) -> Result<Vec<customers::Model>, DbErr> {
        customers::Entity::find()
            .filter(customers::Column::SiteId.eq(site_id))
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await
    }
}
