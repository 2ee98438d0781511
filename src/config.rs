use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::auth::FallbackCredential;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Connection string for the user store. Overridden by `DATABASE_URL`.
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// How many times to probe the store for readiness before giving up.
    /// The original deployment retried forever; startup must be bounded.
    pub db_ready_max_attempts: u32,

    /// Fixed delay between readiness probes.
    pub db_ready_delay_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/birdie.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            db_ready_max_attempts: 30,
            db_ready_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes of inactivity.
    pub session_ttl_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8051,
            cors_allowed_origins: vec![
                "http://localhost:8051".to_string(),
                "http://127.0.0.1:8051".to_string(),
            ],
            secure_cookies: true,
            session_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Fallback username accepted when the user store has no active match.
    /// Overridden by `ADMIN_USERNAME`.
    pub admin_username: String,

    /// SHA-256 hex digest of the fallback password. Overridden by
    /// `ADMIN_PASSWORD_HASH`. When unset, the digest of `password123` is used.
    pub admin_password_hash: Option<String>,

    /// Session cookie signing secret, at least 32 bytes. Overridden by
    /// `SECRET_KEY`. When unset a random key is generated at startup, which
    /// invalidates all sessions on restart.
    pub secret_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            secret_key: None,
        }
    }
}

impl AuthConfig {
    /// Resolve the fallback credential, applying the documented default digest.
    #[must_use]
    pub fn fallback_credential(&self) -> FallbackCredential {
        let password_hash = self
            .admin_password_hash
            .clone()
            .unwrap_or_else(|| crate::auth::hasher::hash_password("password123"));

        FallbackCredential {
            username: self.admin_username.clone(),
            password_hash,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables take precedence over anything in the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.general.database_url = url;
        }
        if let Ok(username) = std::env::var("ADMIN_USERNAME") {
            self.auth.admin_username = username;
        }
        if let Ok(hash) = std::env::var("ADMIN_PASSWORD_HASH") {
            self.auth.admin_password_hash = Some(hash);
        }
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            self.auth.secret_key = Some(secret);
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("birdie").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".birdie").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.general.db_ready_max_attempts == 0 {
            anyhow::bail!("db_ready_max_attempts must be > 0");
        }

        if self.auth.admin_username.is_empty() {
            anyhow::bail!("Fallback admin username cannot be empty");
        }

        if let Some(secret) = &self.auth.secret_key
            && secret.len() < 32
        {
            anyhow::bail!("SECRET_KEY must be at least 32 bytes");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database_url, "sqlite:data/birdie.db");
        assert_eq!(config.server.port, 8051);
        assert_eq!(config.auth.admin_username, "admin");
        assert_eq!(config.general.db_ready_max_attempts, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            admin_username = "gatekeeper"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.admin_username, "gatekeeper");

        assert_eq!(config.server.session_ttl_minutes, 60);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[auth]"));
    }

    #[test]
    fn test_fallback_credential_default_digest() {
        let auth = AuthConfig::default();
        let fallback = auth.fallback_credential();
        assert_eq!(fallback.username, "admin");
        assert_eq!(
            fallback.password_hash,
            crate::auth::hasher::hash_password("password123")
        );
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = Config::default();
        config.auth.secret_key = Some("too-short".to_string());
        assert!(config.validate().is_err());
    }
}
