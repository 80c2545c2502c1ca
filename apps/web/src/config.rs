use anyhow::{ensure, Context, Result};

pub const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "llama3-8b-8192";

/// Application configuration loaded from environment variables.
/// Fails at startup if `SECRET_KEY` is missing or empty.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub session_ttl_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secret_key = require_env("SECRET_KEY")?;
        ensure!(
            !secret_key.is_empty(),
            "SECRET_KEY environment variable must be set"
        );

        Ok(Config {
            secret_key,
            llm_api_key: std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            llm_api_url: env_or("LLM_API_URL", DEFAULT_LLM_API_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            session_ttl_minutes: env_or("SESSION_TTL_MINUTES", "1440")
                .parse::<i64>()
                .context("SESSION_TTL_MINUTES must be a whole number of minutes")?,
            port: env_or("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
