//! In-Memory Session Registry
//!
//! Interviews live only as long as the process. Each session wraps its own
//! orchestrator in an async mutex, which serializes operations on that
//! session while leaving other sessions free to proceed concurrently.
//! Sessions that are not touched for the configured idle TTL, ended or not,
//! are dropped by [`SessionStore::evict_idle`].

use interview_core::InterviewOrchestrator;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// A single interview owned by a user.
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub orchestrator: Mutex<InterviewOrchestrator>,
    /// Milliseconds since the store's epoch at the last lookup.
    touched_at: AtomicU64,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    epoch: Instant,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            epoch: Instant::now(),
            idle_ttl,
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Registers a new session for `user_id` and returns it.
    pub async fn insert(&self, user_id: &str, orchestrator: InterviewOrchestrator) -> Arc<Session> {
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            orchestrator: Mutex::new(orchestrator),
            touched_at: AtomicU64::new(self.now_ms()),
        });
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    /// Retrieves a single session by its ID, scoped to a specific user, and
    /// marks it as active.
    pub async fn get(&self, id: Uuid, user_id: &str) -> Option<Arc<Session>> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .filter(|s| s.user_id == user_id)
            .cloned()?;
        session.touched_at.store(self.now_ms(), Ordering::Relaxed);
        Some(session)
    }

    /// Lists all sessions belonging to a user.
    pub async fn list(&self, user_id: &str) -> Vec<Arc<Session>> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Removes a session. Returns false if it did not exist for this user.
    pub async fn remove(&self, id: Uuid, user_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(s) if s.user_id == user_id => {
                sessions.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Drops every session idle for at least the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = self.now_ms();
        let ttl = u64::try_from(self.idle_ttl.as_millis()).unwrap_or(u64::MAX);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_sub(s.touched_at.load(Ordering::Relaxed)) < ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }
}
