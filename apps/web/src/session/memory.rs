use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionData, SessionStore};

struct Entry {
    data: SessionData,
    touched_at: DateTime<Utc>,
}

/// In-process store. Entries expire after `ttl` without a read or write.
pub struct MemorySessionStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_live(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.touched_at < self.ttl
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: Uuid) -> Result<Option<SessionData>> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let live = match entries.get(&id) {
            Some(entry) => self.is_live(entry, now),
            None => return Ok(None),
        };
        if !live {
            entries.remove(&id);
            return Ok(None);
        }

        Ok(entries.get_mut(&id).map(|entry| {
            entry.touched_at = now;
            entry.data.clone()
        }))
    }

    async fn set(&self, id: Uuid, data: SessionData) -> Result<()> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| self.is_live(entry, now));
        entries.insert(
            id,
            Entry {
                data,
                touched_at: now,
            },
        );
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<()> {
        self.entries.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume_only() -> SessionData {
        SessionData {
            resume_text: Some("Rust engineer".to_string()),
            resume_filename: Some("cv.txt".to_string()),
            job_text: None,
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemorySessionStore::new(Duration::minutes(30));
        let id = Uuid::new_v4();

        store.set(id, resume_only()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), Some(resume_only()));
        assert_eq!(store.get(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_entry() {
        let store = MemorySessionStore::new(Duration::minutes(30));
        let id = Uuid::new_v4();

        store.set(id, resume_only()).await.unwrap();
        store.clear(id).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemorySessionStore::new(Duration::minutes(30));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.set(a, resume_only()).await.unwrap();
        store.set(b, SessionData::default()).await.unwrap();
        store.clear(b).await.unwrap();

        assert_eq!(store.get(a).await.unwrap(), Some(resume_only()));
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let store = MemorySessionStore::new(Duration::zero());
        let id = Uuid::new_v4();

        store.set(id, resume_only()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), None);

        store.set(Uuid::new_v4(), resume_only()).await.unwrap();
        store.set(Uuid::new_v4(), resume_only()).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
