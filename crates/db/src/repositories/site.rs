//! Site repository for database operations.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::sites;

/// Site repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    db: DatabaseConnection,
}

impl SiteRepository {
    /// Creates a new site repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new site.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        name: &str,
        wallet_public_key: Option<&str>,
        wallet_secret_key: Option<&str>,
    ) -> Result<sites::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let site = sites::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            status: Set("active".to_string()),
            wallet_public_key: Set(wallet_public_key.map(String::from)),
            wallet_secret_key: Set(wallet_secret_key.map(String::from)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        site.insert(&self.db).await
    }

    /// Finds a site by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<sites::Model>, DbErr> {
        sites::Entity::find_by_id(id).one(&self.db).await
    }
}
