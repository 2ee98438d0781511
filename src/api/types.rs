use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationDto {
    pub id: i32,
    pub date: String,
    pub time_slot: String,
    pub location_id: i32,
    pub location_name: Option<String>,
    pub num_guests: i32,
}

#[derive(Debug, Serialize)]
pub struct LocationDto {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarDayDto {
    pub date: String,
    /// Entry count plus guest count: each entry is one person.
    pub interest: i64,
}

#[derive(Debug, Serialize)]
pub struct UpcomingMemberDto {
    pub username: String,
    pub guests: i64,
}

#[derive(Debug, Serialize)]
pub struct UpcomingDayDto {
    pub date: String,
    pub members: Vec<UpcomingMemberDto>,
}
