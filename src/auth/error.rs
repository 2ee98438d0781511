use thiserror::Error;

/// Failures surfaced by the write path of the auth service.
///
/// The read path (`verify_credentials`) never errors: store failures there
/// are swallowed so the fallback credential keeps the app available.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("user store unavailable: {0}")]
    StoreUnavailable(#[source] sea_orm::DbErr),
}
