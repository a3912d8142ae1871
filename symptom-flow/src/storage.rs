use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::{error::Result, session::Session};

/// Trait for storing and retrieving sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage. Sessions live as long as the process.
#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Stage;

    #[tokio::test]
    async fn save_get_delete() {
        let storage = InMemorySessionStorage::new();
        storage.save(Session::new("a", Stage::Name)).await.unwrap();
        assert_eq!(storage.len(), 1);

        let loaded = storage.get("a").await.unwrap().unwrap();
        assert_eq!(loaded.stage, Stage::Name);
        assert!(storage.get("b").await.unwrap().is_none());

        storage.delete("a").await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn save_overwrites() {
        let storage = InMemorySessionStorage::new();
        storage.save(Session::new("a", Stage::Name)).await.unwrap();
        storage.save(Session::new("a", Stage::Days)).await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().unwrap().stage, Stage::Days);
    }
}
