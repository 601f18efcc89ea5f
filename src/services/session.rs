//! Session store
//!
//! Signed-in admins are tracked in an in-memory moka cache keyed by a random
//! session id. The id travels in the `session` cookie; the content-service
//! credential never leaves the server.

use moka::future::Cache;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

const MAX_SESSIONS: u64 = 10_000;

/// Per-session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    /// Content-service credential of the signed-in user
    #[serde(skip_serializing)]
    pub auth_token: String,
    pub is_admin: bool,
    pub username: String,
}

pub struct SessionStore {
    cache: Cache<String, SessionData>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("entry_count", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    /// Start a session and return its id
    pub async fn create(&self, data: SessionData) -> String {
        let id = Uuid::new_v4().to_string();
        self.cache.insert(id.clone(), data).await;
        id
    }

    pub async fn get(&self, id: &str) -> Option<SessionData> {
        self.cache.get(id).await
    }

    pub async fn remove(&self, id: &str) {
        self.cache.invalidate(id).await;
    }
}
