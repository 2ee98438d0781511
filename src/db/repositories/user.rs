use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::users;

/// User lookups and creation. Returns raw `DbErr` so the auth service can
/// distinguish uniqueness violations from store outages.
pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Find an active user by exact (case-sensitive) username.
    pub async fn get_active_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
    }

    /// Insert a new active user. The unique index on `username` rejects
    /// duplicates atomically; there is no check-then-insert here.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            email: Set(email.map(ToString::to_string)),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        user.insert(&self.conn).await
    }

    pub async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
    }

    /// Flip the active flag; inactive users fail verification.
    pub async fn set_active(&self, username: &str, active: bool) -> Result<bool, DbErr> {
        let Some(user) = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut model: users::ActiveModel = user.into();
        model.is_active = Set(active);
        model.updated_at = Set(chrono::Utc::now().to_rfc3339());
        model.update(&self.conn).await?;

        Ok(true)
    }
}
