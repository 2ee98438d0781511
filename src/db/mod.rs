use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod migrator;
pub mod repositories;

pub use repositories::recommendation::{CalendarDayRow, UpcomingMemberRow};

use crate::config::GeneralConfig;
use crate::entities::{locations, play_recommendations, users};

/// Connection pool plus the schema it guarantees: migrations have run by the
/// time `connect` returns, so callers never see a store without the `users`
/// table.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Connect with defaults (used by the CLI and tests).
    pub async fn new(db_url: &str) -> Result<Self> {
        let config = GeneralConfig {
            database_url: db_url.to_string(),
            ..Default::default()
        };
        Self::connect(&config).await
    }

    pub async fn connect(config: &GeneralConfig) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let db_url = &config.database_url;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(config.max_db_connections)
            .min_connections(config.min_db_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Self::wait_until_ready(
            opt,
            config.db_ready_max_attempts,
            Duration::from_millis(config.db_ready_delay_ms),
        )
        .await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            config.min_db_connections, config.max_db_connections
        );

        Ok(Self { conn })
    }

    /// Probe the store until it accepts connections, with a fixed delay and a
    /// bounded number of attempts. Migrations only run against a live store.
    async fn wait_until_ready(
        opt: ConnectOptions,
        max_attempts: u32,
        delay: Duration,
    ) -> Result<DatabaseConnection> {
        let mut attempt = 1;

        loop {
            match Database::connect(opt.clone()).await {
                Ok(conn) => match ping_conn(&conn).await {
                    Ok(()) => return Ok(conn),
                    Err(e) if attempt < max_attempts => {
                        warn!("Database not ready (attempt {attempt}/{max_attempts}): {e}");
                    }
                    Err(e) => {
                        anyhow::bail!("Database never became ready after {max_attempts} attempts: {e}")
                    }
                },
                Err(e) if attempt < max_attempts => {
                    warn!("Database connect failed (attempt {attempt}/{max_attempts}): {e}");
                }
                Err(e) => {
                    anyhow::bail!("Database never became ready after {max_attempts} attempts: {e}")
                }
            }

            attempt += 1;
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn ping(&self) -> Result<()> {
        ping_conn(&self.conn).await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn location_repo(&self) -> repositories::location::LocationRepository {
        repositories::location::LocationRepository::new(self.conn.clone())
    }

    fn recommendation_repo(&self) -> repositories::recommendation::RecommendationRepository {
        repositories::recommendation::RecommendationRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_active_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        self.user_repo().get_active_by_username(username).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<users::Model, DbErr> {
        self.user_repo().create(username, password_hash, email).await
    }

    pub async fn list_users(&self) -> Result<Vec<users::Model>, DbErr> {
        self.user_repo().list().await
    }

    pub async fn set_user_active(&self, username: &str, active: bool) -> Result<bool, DbErr> {
        self.user_repo().set_active(username, active).await
    }

    // ========== Locations ==========

    pub async fn list_active_locations(&self) -> Result<Vec<locations::Model>, DbErr> {
        self.location_repo().list_active().await
    }

    pub async fn create_location(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> Result<locations::Model, DbErr> {
        self.location_repo().create(name, address).await
    }

    // ========== Play recommendations ==========

    pub async fn create_recommendation(
        &self,
        user_id: i32,
        location_id: i32,
        date: &str,
        time_slot: &str,
        num_guests: i32,
    ) -> Result<play_recommendations::Model, DbErr> {
        self.recommendation_repo()
            .create(user_id, location_id, date, time_slot, num_guests)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_recommendation(
        &self,
        id: i32,
        user_id: i32,
        location_id: i32,
        date: &str,
        time_slot: &str,
        num_guests: i32,
    ) -> Result<Option<play_recommendations::Model>, DbErr> {
        self.recommendation_repo()
            .update(id, user_id, location_id, date, time_slot, num_guests)
            .await
    }

    pub async fn delete_recommendation(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        self.recommendation_repo().delete(id, user_id).await
    }

    pub async fn list_recommendations_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<(play_recommendations::Model, Option<locations::Model>)>, DbErr> {
        self.recommendation_repo().list_for_user(user_id).await
    }

    pub async fn calendar_summary(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<CalendarDayRow>, DbErr> {
        self.recommendation_repo()
            .calendar_summary(start_date, end_date)
            .await
    }

    pub async fn upcoming_sessions(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<UpcomingMemberRow>, DbErr> {
        self.recommendation_repo()
            .upcoming_sessions(start_date, end_date)
            .await
    }
}

/// Both sqlite ("UNIQUE constraint failed") and postgres ("duplicate key
/// value violates unique constraint") spellings.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("UNIQUE constraint") || msg.contains("duplicate key")
}

async fn ping_conn(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    conn.query_one(Statement::from_string(backend, "SELECT 1".to_string()))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        let sqlite = DbErr::Custom("UNIQUE constraint failed: users.username".to_string());
        assert!(is_unique_violation(&sqlite));

        let postgres = DbErr::Custom(
            "duplicate key value violates unique constraint \"ix_users_username\"".to_string(),
        );
        assert!(is_unique_violation(&postgres));

        let other = DbErr::Custom("connection refused".to_string());
        assert!(!is_unique_violation(&other));
    }
}
