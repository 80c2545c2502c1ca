use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::session::{MemorySessionStore, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pluggable session storage. Default: in-memory with idle expiry.
    pub sessions: Arc<dyn SessionStore>,
    /// Signs the session cookie.
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmClient::new(
                config.llm_api_key.clone().unwrap_or_default(),
                config.llm_api_url.clone(),
                config.llm_model.clone(),
            ),
            sessions: Arc::new(MemorySessionStore::new(chrono::Duration::minutes(
                config.session_ttl_minutes,
            ))),
            cookie_key: cookie_key(&config.secret_key),
        }
    }
}

/// Cookie signing key derived from the configured secret of any length.
pub fn cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret.as_bytes())[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_deterministic() {
        assert_eq!(
            cookie_key("short").signing(),
            cookie_key("short").signing()
        );
        assert_ne!(cookie_key("one").signing(), cookie_key("two").signing());
    }
}
