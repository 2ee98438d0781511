use tower_sessions::Session;

/// Session key holding the authenticated username. Presence of the key is
/// what "authenticated" means; there is no separate flag to drift out of sync.
const USER_KEY: &str = "user";

/// Mark the user as authenticated in the session. Idempotent.
pub async fn login_user(session: &Session, username: &str) -> anyhow::Result<()> {
    session
        .insert(USER_KEY, username.to_string())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write session: {e}"))
}

/// Clear the user's session. Idempotent when already logged out.
pub async fn logout_user(session: &Session) {
    let _ = session.flush().await;
}

pub async fn is_authenticated(session: &Session) -> bool {
    current_username(session).await.is_some()
}

/// The authenticated username, or `None` when anonymous.
pub async fn current_username(session: &Session) -> Option<String> {
    session.get::<String>(USER_KEY).await.ok().flatten()
}
