use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, CalendarDayDto, RecommendationDto};
use crate::auth::session::current_username;
use crate::constants::{MAX_GUESTS, is_valid_time_slot};
use crate::entities::users;

#[derive(Deserialize)]
pub struct RecommendationInput {
    pub date: String,
    pub time_slot: String,
    pub location_id: i32,
    #[serde(default)]
    pub num_guests: i32,
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub start: String,
    pub end: String,
}

/// GET /recommendations
pub async fn list(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<RecommendationDto>>>, ApiError> {
    let user = current_user(&state, &session).await?;

    let entries = state.store.list_recommendations_for_user(user.id).await?;

    let dtos = entries
        .into_iter()
        .map(|(entry, location)| RecommendationDto {
            id: entry.id,
            date: entry.date,
            time_slot: entry.time_slot,
            location_id: entry.location_id,
            location_name: location.map(|l| l.name),
            num_guests: entry.num_guests,
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /recommendations
pub async fn create(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RecommendationInput>,
) -> Result<Json<ApiResponse<RecommendationDto>>, ApiError> {
    let user = current_user(&state, &session).await?;
    validate_input(&payload)?;

    let entry = state
        .store
        .create_recommendation(
            user.id,
            payload.location_id,
            &payload.date,
            &payload.time_slot,
            payload.num_guests,
        )
        .await
        .map_err(map_entry_error)?;

    Ok(Json(ApiResponse::success(to_dto(entry))))
}

/// PUT /recommendations/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<RecommendationInput>,
) -> Result<Json<ApiResponse<RecommendationDto>>, ApiError> {
    let user = current_user(&state, &session).await?;
    validate_input(&payload)?;

    let entry = state
        .store
        .update_recommendation(
            id,
            user.id,
            payload.location_id,
            &payload.date,
            &payload.time_slot,
            payload.num_guests,
        )
        .await
        .map_err(map_entry_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Entry {id} not found")))?;

    Ok(Json(ApiResponse::success(to_dto(entry))))
}

/// DELETE /recommendations/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = current_user(&state, &session).await?;

    if !state.store.delete_recommendation(id, user.id).await? {
        return Err(ApiError::NotFound(format!("Entry {id} not found")));
    }

    Ok(Json(ApiResponse::success(())))
}

/// GET /calendar?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarDayDto>>>, ApiError> {
    let start = parse_date(&query.start)?;
    let end = parse_date(&query.end)?;
    if start > end {
        return Err(ApiError::validation("start must not be after end"));
    }

    let rows = state.store.calendar_summary(&query.start, &query.end).await?;

    let days = rows
        .into_iter()
        .map(|row| CalendarDayDto {
            date: row.date,
            interest: row.entries + row.guests,
        })
        .collect();

    Ok(Json(ApiResponse::success(days)))
}

/// Resolve the session to a store-backed member record.
async fn current_user(state: &AppState, session: &Session) -> Result<users::Model, ApiError> {
    let username = current_username(session)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    state
        .store
        .get_active_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("No member record for current user".to_string()))
}

fn validate_input(payload: &RecommendationInput) -> Result<(), ApiError> {
    parse_date(&payload.date)?;

    if !is_valid_time_slot(&payload.time_slot) {
        return Err(ApiError::validation(format!(
            "Invalid time slot '{}'",
            payload.time_slot
        )));
    }

    if payload.num_guests < 0 || payload.num_guests > MAX_GUESTS {
        return Err(ApiError::validation(format!(
            "Guests must be between 0 and {MAX_GUESTS}"
        )));
    }

    Ok(())
}

fn parse_date(date: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("Invalid date '{date}', expected YYYY-MM-DD")))
}

fn map_entry_error(err: sea_orm::DbErr) -> ApiError {
    if crate::db::is_unique_violation(&err) {
        ApiError::Conflict("You already have an entry for that date, slot and venue".to_string())
    } else if err.to_string().contains("FOREIGN KEY") {
        ApiError::validation("Unknown location")
    } else {
        ApiError::DatabaseError(err.to_string())
    }
}

fn to_dto(entry: crate::entities::play_recommendations::Model) -> RecommendationDto {
    RecommendationDto {
        id: entry.id,
        date: entry.date,
        time_slot: entry.time_slot,
        location_id: entry.location_id,
        location_name: None,
        num_guests: entry.num_guests,
    }
}
