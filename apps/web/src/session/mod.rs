//! Per-client conversation state for the upload → job → chat flow.
//!
//! The store is an injected capability (`Arc<dyn SessionStore>` in `AppState`);
//! clients are identified by a signed session cookie carrying a random id.

mod cookie;
mod memory;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub use cookie::Session;
pub use memory::MemorySessionStore;

/// Everything the flow remembers about one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub resume_text: Option<String>,
    pub resume_filename: Option<String>,
    pub job_text: Option<String>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.resume_text.is_none() && self.resume_filename.is_none() && self.job_text.is_none()
    }
}

/// Session storage keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<SessionData>>;

    async fn set(&self, id: Uuid, data: SessionData) -> Result<()>;

    async fn clear(&self, id: Uuid) -> Result<()>;
}
