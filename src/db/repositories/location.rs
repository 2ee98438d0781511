use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::locations;

pub struct LocationRepository {
    conn: DatabaseConnection,
}

impl LocationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_active(&self) -> Result<Vec<locations::Model>, DbErr> {
        locations::Entity::find()
            .filter(locations::Column::IsActive.eq(true))
            .order_by_asc(locations::Column::Name)
            .all(&self.conn)
            .await
    }

    pub async fn create(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> Result<locations::Model, DbErr> {
        let location = locations::ActiveModel {
            name: Set(name.to_string()),
            address: Set(address.map(ToString::to_string)),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        location.insert(&self.conn).await
    }
}
