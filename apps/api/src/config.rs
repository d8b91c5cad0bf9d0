use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_OPENROUTER_MODEL: &str = "deepseek/deepseek-prover-v2:free";
const DEFAULT_COURSERA_BASE_URL: &str = "https://api.coursera.org/api";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub openrouter_app_name: String,
    pub openrouter_timeout_secs: u64,
    pub openrouter_accept_invalid_certs: bool,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub coursera_base_url: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Everything the chat-completion client needs, handed to it at construction.
#[derive(Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub app_name: String,
    pub timeout: Duration,
    /// Local development only.
    pub accept_invalid_certs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: require_env("OPENROUTER_API_KEY")?,
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
            openrouter_model: env_or("OPENROUTER_MODEL", DEFAULT_OPENROUTER_MODEL),
            openrouter_app_name: env_or("OPENROUTER_APP_NAME", "careerbooster"),
            openrouter_timeout_secs: parse_env("OPENROUTER_TIMEOUT_SECS", 30)?,
            openrouter_accept_invalid_certs: parse_env("OPENROUTER_ACCEPT_INVALID_CERTS", false)?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expiration_secs: parse_env("JWT_EXPIRATION_SECS", 86_400)?,
            coursera_base_url: env_or("COURSERA_BASE_URL", DEFAULT_COURSERA_BASE_URL),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn ai(&self) -> AiConfig {
        AiConfig {
            api_key: self.openrouter_api_key.clone(),
            base_url: self.openrouter_base_url.clone(),
            model: self.openrouter_model.clone(),
            app_name: self.openrouter_app_name.clone(),
            timeout: Duration::from_secs(self.openrouter_timeout_secs),
            accept_invalid_certs: self.openrouter_accept_invalid_certs,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openrouter_api_key", &"<redacted>")
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("openrouter_model", &self.openrouter_model)
            .field("openrouter_app_name", &self.openrouter_app_name)
            .field("openrouter_timeout_secs", &self.openrouter_timeout_secs)
            .field(
                "openrouter_accept_invalid_certs",
                &self.openrouter_accept_invalid_certs,
            )
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("coursera_base_url", &self.coursera_base_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("app_name", &self.app_name)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
