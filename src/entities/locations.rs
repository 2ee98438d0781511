use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub address: Option<String>,

    pub is_active: bool,

    pub created_at: String,
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
