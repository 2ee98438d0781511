use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use birdie::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<birdie::api::AppState>, Router) {
    spawn_app_with(|_| {}).await
}

async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> (Arc<birdie::api::AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("birdie-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    tweak(&mut config);

    let state = birdie::api::create_app_state(config)
        .await
        .expect("failed to create app state");
    let router = birdie::api::router(state.clone());
    (state, router)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": username, "password": password })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login failed");

    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login response missing session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_is_open() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["database"], true);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (_, app) = spawn_app().await;

    for uri in [
        "/api/recommendations",
        "/api/home/upcoming",
        "/api/locations",
        "/api/auth/me",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": "admin", "password": "wrong" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Always the same generic message, never why it failed.
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_session_round_trip() {
    let (_, app) = spawn_app().await;

    // Seeded admin user can log in.
    let cookie = login(&app, "admin", "password123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "admin");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The flushed session no longer authenticates.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_fallback_credential_login() {
    // Fallback username deliberately absent from the store.
    let (_, app) = spawn_app_with(|config| {
        config.auth.admin_username = "warden".to_string();
    })
    .await;

    let cookie = login(&app, "warden", "password123").await;
    assert!(!cookie.is_empty());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": "warden", "password": "wrong" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_flow() {
    let (_, app) = spawn_app().await;

    let register = |payload: serde_json::Value| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header("Content-Type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    // Validation failures.
    let response = register(serde_json::json!({
        "username": "al", "password": "secret123", "password_confirm": "secret123"
    }))
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = register(serde_json::json!({
        "username": "alice", "password": "short", "password_confirm": "short"
    }))
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = register(serde_json::json!({
        "username": "alice", "password": "secret123", "password_confirm": "secret124"
    }))
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Successful registration, then login with the new credentials.
    let response = register(serde_json::json!({
        "username": "alice", "email": "alice@example.com",
        "password": "secret123", "password_confirm": "secret123"
    }))
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = login(&app, "alice", "secret123").await;
    assert!(!cookie.is_empty());

    // Duplicate username is a conflict, enforced by the store.
    let response = register(serde_json::json!({
        "username": "alice", "password": "other-secret", "password_confirm": "other-secret"
    }))
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Username already taken");
}

#[tokio::test]
async fn test_recommendation_flow() {
    let (state, app) = spawn_app().await;

    let location = state
        .store
        .create_location("Sports Hall", Some("1 Court Way"))
        .await
        .expect("failed to seed location");

    let cookie = login(&app, "admin", "password123").await;

    let date = (chrono::Utc::now().date_naive() + chrono::Duration::days(1)).to_string();
    let payload = serde_json::json!({
        "date": date,
        "time_slot": "19:00-20:00",
        "location_id": location.id,
        "num_guests": 2
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recommendations")
                .header("Content-Type", "application/json")
                .header(header::COOKIE, cookie.clone())
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entry_id = json["data"]["id"].as_i64().unwrap();

    // Same user/date/slot/venue again hits the unique constraint.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recommendations")
                .header("Content-Type", "application/json")
                .header(header::COOKIE, cookie.clone())
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Bad time slot is rejected before reaching the store.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recommendations")
                .header("Content-Type", "application/json")
                .header(header::COOKIE, cookie.clone())
                .body(Body::from(
                    serde_json::json!({
                        "date": date, "time_slot": "23:00-24:00",
                        "location_id": location.id, "num_guests": 0
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Listing shows the entry with its venue name.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/recommendations")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["location_name"], "Sports Hall");

    // Calendar interest: one entry plus two guests.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/calendar?start={date}&end={date}"))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["interest"], 3);

    // Home digest includes admin for that date.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/home/upcoming")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["date"], date);
    assert_eq!(json["data"][0]["members"][0]["username"], "admin");
    assert_eq!(json["data"][0]["members"][0]["guests"], 2);

    // Update then delete.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/recommendations/{entry_id}"))
                .header("Content-Type", "application/json")
                .header(header::COOKIE, cookie.clone())
                .body(Body::from(
                    serde_json::json!({
                        "date": date, "time_slot": "20:00-21:00",
                        "location_id": location.id, "num_guests": 0
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/recommendations/{entry_id}"))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/recommendations/{entry_id}"))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_configured_secret_key_signs_sessions() {
    // A pinned SECRET_KEY derives the signing key instead of a random one.
    let (_, app) = spawn_app_with(|config| {
        config.auth.secret_key = Some("0123456789abcdef0123456789abcdef0123456789abcdef".to_string());
    })
    .await;

    let cookie = login(&app, "admin", "password123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A cookie signed under a different key is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, "id=forged-session-value")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shell_escapes_username() {
    let (_, app) = spawn_app().await;

    // A username full of markup must render inert in the app shell.
    let hostile = "<script>alert(1)</script>";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "username": hostile,
                        "password": "secret123", "password_confirm": "secret123"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = login(&app, hostile, "secret123").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("Welcome, &lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[tokio::test]
async fn test_shell_page_variants() {
    let (_, app) = spawn_app().await;

    // Anonymous visitors get the login variant.
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Login"));
    assert!(!html.contains("Logout"));
    // The form submits JSON to the API rather than a bare urlencoded POST.
    assert!(html.contains(r#"action="/api/auth/login""#));
    assert!(html.contains("application/json"));

    // Authenticated visitors get the app shell.
    let cookie = login(&app, "admin", "password123").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Welcome, admin"));
    assert!(html.contains("Logout"));
    // The logout button is wired to the endpoint in its data attribute.
    assert!(html.contains(r#"data-action="/api/auth/logout""#));
    assert!(html.contains("dataset.action"));
}
