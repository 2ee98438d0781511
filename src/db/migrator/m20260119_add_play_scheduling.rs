use crate::entities::play_recommendations;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Locations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(PlayRecommendations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One entry per user/date/time_slot/location combination.
        manager
            .create_index(
                Index::create()
                    .name("uq_user_date_time_location")
                    .table(PlayRecommendations)
                    .col(play_recommendations::Column::UserId)
                    .col(play_recommendations::Column::Date)
                    .col(play_recommendations::Column::TimeSlot)
                    .col(play_recommendations::Column::LocationId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_play_recommendations_date")
                    .table(PlayRecommendations)
                    .col(play_recommendations::Column::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayRecommendations).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations).to_owned())
            .await?;

        Ok(())
    }
}
