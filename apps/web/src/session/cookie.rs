use anyhow::Result;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use uuid::Uuid;

use super::{SessionData, SessionStore};
use crate::errors::{AppError, PageError};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The caller's session, loaded from the store through the signed session cookie.
///
/// Mutate `data`, then `save` (or `clear`) and return the resulting jar with the
/// response so the cookie reaches the client.
pub struct Session {
    id: Uuid,
    jar: SignedCookieJar,
    pub data: SessionData,
}

impl Session {
    /// Persists `data`. An empty session is cleared instead of stored.
    pub async fn save(self, store: &dyn SessionStore) -> Result<SignedCookieJar> {
        if self.data.is_empty() {
            return self.clear(store).await;
        }
        store.set(self.id, self.data).await?;
        Ok(self.jar.add(
            Cookie::build((SESSION_COOKIE, self.id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        ))
    }

    pub async fn clear(self, store: &dyn SessionStore) -> Result<SignedCookieJar> {
        store.clear(self.id).await?;
        Ok(self.jar.remove(Cookie::build(SESSION_COOKIE).path("/")))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let known_id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

        let (id, data) = match known_id {
            Some(id) => {
                let data = state
                    .sessions
                    .get(id)
                    .await
                    .map_err(AppError::Internal)?
                    .unwrap_or_default();
                (id, data)
            }
            None => (Uuid::new_v4(), SessionData::default()),
        };

        Ok(Session { id, jar, data })
    }
}
