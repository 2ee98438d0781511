use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, UpcomingDayDto, UpcomingMemberDto};
use crate::constants::UPCOMING_WINDOW_DAYS;

/// GET /home/upcoming
///
/// Potential play sessions over the next two weeks, grouped by date. A member
/// with entries in several slots on one date appears once with their largest
/// guest count.
pub async fn upcoming(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UpcomingDayDto>>>, ApiError> {
    let today = Utc::now().date_naive();
    let end = today + Duration::days(UPCOMING_WINDOW_DAYS);

    let rows = state
        .store
        .upcoming_sessions(&today.to_string(), &end.to_string())
        .await?;

    // Rows arrive ordered by (date, username); fold into per-date groups.
    let mut days: Vec<UpcomingDayDto> = Vec::new();
    for row in rows {
        match days.last_mut() {
            Some(day) if day.date == row.date => day.members.push(UpcomingMemberDto {
                username: row.username,
                guests: row.guests,
            }),
            _ => days.push(UpcomingDayDto {
                date: row.date,
                members: vec![UpcomingMemberDto {
                    username: row.username,
                    guests: row.guests,
                }],
            }),
        }
    }

    Ok(Json(ApiResponse::success(days)))
}
