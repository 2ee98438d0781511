use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::auth::AuthService;
use crate::config::Config;
use crate::db::Store;

pub mod auth;
mod error;
mod home;
mod locations;
mod observability;
mod pages;
mod recommendations;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: AuthService,

    pub start_time: std::time::Instant,
}

/// Connect the store (running migrations behind the readiness gate) and wire
/// the auth service with the configured fallback credential.
pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::connect(&config.general).await?;
    let auth = AuthService::new(store.clone(), config.auth.fallback_credential());

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
        start_time: std::time::Instant::now(),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route(
            "/recommendations",
            get(recommendations::list).post(recommendations::create),
        )
        .route(
            "/recommendations/{id}",
            put(recommendations::update).delete(recommendations::remove),
        )
        .route("/calendar", get(recommendations::calendar))
        .route("/home/upcoming", get(home::upcoming))
        .route("/locations", get(locations::list))
        .route("/auth/me", get(auth::me))
        .layer(middleware::from_fn(auth::require_session));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/system/health", get(system::health));

    // Sessions die with the process unless SECRET_KEY pins the signing key.
    let session_key = state.config.auth.secret_key.as_ref().map_or_else(
        Key::generate,
        |secret| Key::derive_from(secret.as_bytes()),
    );

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(session_key)
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.server.session_ttl_minutes,
        )));

    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/", get(pages::index))
        .layer(session_layer)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
