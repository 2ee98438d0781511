use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LocationDto};

/// GET /locations
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LocationDto>>>, ApiError> {
    let locations = state.store.list_active_locations().await?;

    let dtos = locations
        .into_iter()
        .map(|l| LocationDto {
            id: l.id,
            name: l.name,
            address: l.address,
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}
