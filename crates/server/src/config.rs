//! Server configuration and shared state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::ai::CompletionProvider;
use crate::store::UserStore;

/// Name of the session cookie issued at login.
pub const COOKIE_NAME: &str = "auth_token";

/// Configuration for the SmartTravel server, read from the environment
/// exactly once at startup and injected everywhere else.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Port the HTTP listener binds to
    pub port: u16,
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// Secret used to sign and verify session tokens
    pub jwt_secret: String,
    /// Chat completion model passed to the provider
    pub model: String,
    /// Frontend origin allowed to send credentialed requests
    pub cors_origin: String,
    /// Upper bound on a single completion call
    pub ai_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the environment. Startup fails when a
    /// required secret is missing instead of falling back to a default.
    pub fn from_env() -> Result<Self> {
        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET is required but not configured")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET is required but not configured");
        }

        // genai resolves the key itself when the OpenAI adapter is used;
        // checked here so a misconfigured process dies at startup, not on
        // the first chat request.
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("OPENAI_API_KEY is required but not configured");
        }

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let data_dir = std::env::var("SMARTTRAVEL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("smarttravel_data"));

        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let ai_timeout = std::env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        Ok(Self {
            port,
            data_dir,
            jwt_secret,
            model,
            cors_origin,
            ai_timeout,
        })
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<UserStore>,
    pub provider: Arc<dyn CompletionProvider>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env-var juggling never races another test.
    #[test]
    fn from_env_requires_both_secrets() {
        std::env::remove_var("JWT_SECRET");
        std::env::remove_var("OPENAI_API_KEY");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("JWT_SECRET", "unit-test-secret");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("OPENAI_API_KEY", "unit-test-key");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.jwt_secret, "unit-test-secret");

        std::env::remove_var("JWT_SECRET");
        std::env::remove_var("OPENAI_API_KEY");
    }
}
