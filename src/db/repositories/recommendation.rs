use sea_orm::sea_query::JoinType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};

use crate::entities::{locations, play_recommendations, users};

/// Per-date interest totals for the calendar grid.
#[derive(Debug, Clone)]
pub struct CalendarDayRow {
    pub date: String,
    pub entries: i64,
    pub guests: i64,
}

/// One member's attendance on a date, deduplicated across time slots.
#[derive(Debug, Clone)]
pub struct UpcomingMemberRow {
    pub date: String,
    pub username: String,
    pub guests: i64,
}

pub struct RecommendationRepository {
    conn: DatabaseConnection,
}

impl RecommendationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        location_id: i32,
        date: &str,
        time_slot: &str,
        num_guests: i32,
    ) -> Result<play_recommendations::Model, DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let entry = play_recommendations::ActiveModel {
            user_id: Set(user_id),
            location_id: Set(location_id),
            date: Set(date.to_string()),
            time_slot: Set(time_slot.to_string()),
            num_guests: Set(num_guests),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        entry.insert(&self.conn).await
    }

    /// Update an entry, scoped to its owner. Returns `None` when the entry
    /// does not exist or belongs to someone else.
    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        location_id: i32,
        date: &str,
        time_slot: &str,
        num_guests: i32,
    ) -> Result<Option<play_recommendations::Model>, DbErr> {
        let Some(existing) = play_recommendations::Entity::find_by_id(id)
            .filter(play_recommendations::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut model: play_recommendations::ActiveModel = existing.into();
        model.location_id = Set(location_id);
        model.date = Set(date.to_string());
        model.time_slot = Set(time_slot.to_string());
        model.num_guests = Set(num_guests);
        model.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(model.update(&self.conn).await?))
    }

    /// Delete an entry, scoped to its owner. Returns whether a row went away.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = play_recommendations::Entity::delete_many()
            .filter(play_recommendations::Column::Id.eq(id))
            .filter(play_recommendations::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// All of a member's entries with their venue, ordered by date and slot.
    pub async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<(play_recommendations::Model, Option<locations::Model>)>, DbErr> {
        play_recommendations::Entity::find()
            .filter(play_recommendations::Column::UserId.eq(user_id))
            .find_also_related(locations::Entity)
            .order_by_asc(play_recommendations::Column::Date)
            .order_by_asc(play_recommendations::Column::TimeSlot)
            .all(&self.conn)
            .await
    }

    /// Interest counts per date in the inclusive range. Total interest shown
    /// on the calendar is entries + guests (each entry is one person).
    pub async fn calendar_summary(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<CalendarDayRow>, DbErr> {
        let rows: Vec<(String, i64, Option<i64>)> = play_recommendations::Entity::find()
            .select_only()
            .column(play_recommendations::Column::Date)
            .column_as(play_recommendations::Column::Id.count(), "entries")
            .column_as(play_recommendations::Column::NumGuests.sum(), "guests")
            .filter(play_recommendations::Column::Date.gte(start_date))
            .filter(play_recommendations::Column::Date.lte(end_date))
            .group_by(play_recommendations::Column::Date)
            .order_by_asc(play_recommendations::Column::Date)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(date, entries, guests)| CalendarDayRow {
                date,
                entries,
                guests: guests.unwrap_or(0),
            })
            .collect())
    }

    /// Who wants to play on each date in the range. A member appearing in
    /// several slots on one date counts once, with their largest guest count.
    pub async fn upcoming_sessions(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<UpcomingMemberRow>, DbErr> {
        let rows: Vec<(String, String, Option<i64>)> = play_recommendations::Entity::find()
            .select_only()
            .column(play_recommendations::Column::Date)
            .column(users::Column::Username)
            .column_as(play_recommendations::Column::NumGuests.max(), "guests")
            .join(JoinType::InnerJoin, play_recommendations::Relation::User.def())
            .filter(play_recommendations::Column::Date.gte(start_date))
            .filter(play_recommendations::Column::Date.lte(end_date))
            .group_by(play_recommendations::Column::Date)
            .group_by(users::Column::Username)
            .order_by_asc(play_recommendations::Column::Date)
            .order_by_asc(users::Column::Username)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(date, username, guests)| UpcomingMemberRow {
                date,
                username,
                guests: guests.unwrap_or(0),
            })
            .collect())
    }
}
