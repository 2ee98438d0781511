//! Credential verification and session gating.
//!
//! Verification walks an ordered chain of credential sources. Each source
//! answers `Some(true)` / `Some(false)` when it can decide, or `None` when it
//! has no opinion (user unknown, store unreachable). The first definite
//! answer wins. The chain is store first, then the configured fallback, so
//! the fallback is only consulted when the store yields no active match.

pub mod error;
pub mod hasher;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::db::{Store, is_unique_violation};
use crate::entities::users;
pub use error::AuthError;
pub use hasher::hash_password;

/// Statically configured username/digest pair, read from config at startup.
#[derive(Debug, Clone)]
pub struct FallbackCredential {
    pub username: String,
    pub password_hash: String,
}

/// One source of truth for credentials.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Verify a username/digest pair, or decline to answer with `None`.
    async fn try_verify(&self, username: &str, digest: &str) -> Option<bool>;
}

/// Verifies against active users in the persistent store.
struct StoreCredentials {
    store: Store,
}

#[async_trait]
impl CredentialSource for StoreCredentials {
    async fn try_verify(&self, username: &str, digest: &str) -> Option<bool> {
        match self.store.get_active_user_by_username(username).await {
            Ok(Some(user)) => Some(digest == user.password_hash),
            Ok(None) => None,
            Err(e) => {
                // Store down or not yet migrated: defer to the next source.
                debug!("User store unavailable during verification: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl CredentialSource for FallbackCredential {
    async fn try_verify(&self, username: &str, digest: &str) -> Option<bool> {
        Some(username == self.username && digest == self.password_hash)
    }
}

/// Decides authenticity and owns user creation.
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    sources: Arc<Vec<Box<dyn CredentialSource>>>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Store, fallback: FallbackCredential) -> Self {
        let sources: Vec<Box<dyn CredentialSource>> = vec![
            Box::new(StoreCredentials {
                store: store.clone(),
            }),
            Box::new(fallback),
        ];

        Self {
            store,
            sources: Arc::new(sources),
        }
    }

    /// Verify a username/password pair. Read-only, never errors.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> bool {
        verify_against(&self.sources, username, password).await
    }

    /// Create a new user with a hashed password.
    ///
    /// Uniqueness is enforced by the store's unique index, not an
    /// application-level lookup, so concurrent creates cannot race past it.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<users::Model, AuthError> {
        let digest = hash_password(password);

        self.store
            .create_user(username, &digest, email)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::DuplicateUsername(username.to_string())
                } else {
                    AuthError::StoreUnavailable(e)
                }
            })
    }
}

/// Walk the source chain; the first definite answer wins.
async fn verify_against(
    sources: &[Box<dyn CredentialSource>],
    username: &str,
    password: &str,
) -> bool {
    if username.is_empty() || password.is_empty() {
        return false;
    }

    let digest = hash_password(password);

    for source in sources {
        if let Some(answer) = source.try_verify(username, &digest).await {
            return answer;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> FallbackCredential {
        FallbackCredential {
            username: "admin".to_string(),
            password_hash: hash_password("password123"),
        }
    }

    #[tokio::test]
    async fn test_fallback_source_always_definite() {
        let source = fallback();

        let digest = hash_password("password123");
        assert_eq!(source.try_verify("admin", &digest).await, Some(true));
        assert_eq!(source.try_verify("someone", &digest).await, Some(false));

        let wrong = hash_password("wrong");
        assert_eq!(source.try_verify("admin", &wrong).await, Some(false));
    }

    #[tokio::test]
    async fn test_fallback_username_is_case_sensitive() {
        let source = fallback();
        let digest = hash_password("password123");
        assert_eq!(source.try_verify("Admin", &digest).await, Some(false));
    }

    struct Definite(bool);
    struct NoOpinion;
    struct Panicking;

    #[async_trait]
    impl CredentialSource for Definite {
        async fn try_verify(&self, _: &str, _: &str) -> Option<bool> {
            Some(self.0)
        }
    }

    #[async_trait]
    impl CredentialSource for NoOpinion {
        async fn try_verify(&self, _: &str, _: &str) -> Option<bool> {
            None
        }
    }

    #[async_trait]
    impl CredentialSource for Panicking {
        async fn try_verify(&self, _: &str, _: &str) -> Option<bool> {
            panic!("later source must not be consulted");
        }
    }

    /// A definite `false` from an earlier source stops the chain.
    #[tokio::test]
    async fn test_chain_short_circuits_on_definite_answer() {
        let sources: Vec<Box<dyn CredentialSource>> =
            vec![Box::new(Definite(false)), Box::new(Panicking)];

        assert!(!verify_against(&sources, "bob", "swordfish").await);
    }

    /// A source with no opinion defers to the next one.
    #[tokio::test]
    async fn test_chain_falls_through_on_no_opinion() {
        let sources: Vec<Box<dyn CredentialSource>> =
            vec![Box::new(NoOpinion), Box::new(fallback())];

        assert!(verify_against(&sources, "admin", "password123").await);
        assert!(!verify_against(&sources, "admin", "wrong").await);
        assert!(!verify_against(&sources, "someone", "password123").await);
    }

    /// No source answering means the credentials are invalid.
    #[tokio::test]
    async fn test_empty_chain_denies() {
        let sources: Vec<Box<dyn CredentialSource>> = vec![Box::new(NoOpinion)];
        assert!(!verify_against(&sources, "bob", "swordfish").await);
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected_without_consulting_sources() {
        let sources: Vec<Box<dyn CredentialSource>> = vec![Box::new(Panicking)];
        assert!(!verify_against(&sources, "", "password123").await);
        assert!(!verify_against(&sources, "admin", "").await);
    }
}
