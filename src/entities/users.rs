use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// SHA-256 hex digest (64 chars), never the plaintext
    pub password_hash: String,

    #[sea_orm(unique)]
    pub email: Option<String>,

    /// Inactive users fail verification even with correct credentials
    pub is_active: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::play_recommendations::Entity")]
    PlayRecommendations,
}

impl Related<super::play_recommendations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayRecommendations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
