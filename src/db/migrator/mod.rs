use sea_orm_migration::prelude::*;

mod m20260105_create_users;
mod m20260119_add_play_scheduling;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_create_users::Migration),
            Box::new(m20260119_add_play_scheduling::Migration),
        ]
    }
}
