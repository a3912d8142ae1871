//! FlowRunner – loads a session, runs exactly **one** conversation turn, and persists the
//! updated session back to storage.
//!
//! ## When should you use `FlowRunner`?
//! * **Web services**: one turn per HTTP request, with the session saved for the next
//!   roundtrip.
//! * **Terminal demos**: no need to repeat the load-advance-save boilerplate.
//!
//! ## When should you use `ConversationEngine::advance` directly?
//! * When the caller owns the session (embedded UIs, tests) and no storage is involved.
//!
//! ## Failure semantics
//! A turn is saved only after the engine succeeds. If the backend fails, nothing is
//! written and the stored session is exactly what it was before the call, so the
//! same utterance can be retried.
//!
//! Turns for the same session id are serialized; different sessions run concurrently.
//! `end` takes the same lock, so a turn in flight is saved before the session is
//! deleted and never brings it back. Only stored sessions get a lock entry.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{
    engine::{ConversationEngine, Turn},
    error::{FlowError, Result},
    message::Message,
    session::Session,
    storage::SessionStorage,
};

/// High-level helper that orchestrates the common _load → advance → save_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    engine: Arc<ConversationEngine>,
    storage: Arc<dyn SessionStorage>,
    turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FlowRunner {
    pub fn new(engine: Arc<ConversationEngine>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            engine,
            storage,
            turn_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// The turn lock of a stored session. Unknown ids get no entry.
    async fn lock_for(&self, session_id: &str) -> Result<Arc<Mutex<()>>> {
        if let Some(lock) = self.turn_locks.get(session_id).map(|l| l.clone()) {
            return Ok(lock);
        }
        self.session(session_id).await?;
        Ok(self
            .turn_locks
            .entry(session_id.to_string())
            .or_default()
            .clone())
    }

    fn forget_lock(&self, session_id: &str, lock: &Arc<Mutex<()>>) {
        self.turn_locks
            .remove_if(session_id, |_, held| Arc::ptr_eq(held, lock));
    }

    /// Loads the session while holding its turn lock. A session ended while
    /// this caller waited is reported as missing and its lock dropped.
    async fn load_locked(&self, session_id: &str, lock: &Arc<Mutex<()>>) -> Result<Session> {
        match self.storage.get(session_id).await? {
            Some(session) => Ok(session),
            None => {
                self.forget_lock(session_id, lock);
                Err(FlowError::SessionNotFound(session_id.to_string()))
            }
        }
    }

    /// Creates and stores a new conversation with a generated id.
    pub async fn start(&self) -> Result<(Session, Vec<Message>)> {
        let (session, welcome) = self.engine.start_new();
        self.storage.save(session.clone()).await?;
        Ok((session, welcome))
    }

    pub async fn session(&self, session_id: &str) -> Result<Session> {
        self.storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))
    }

    /// Execute **exactly one** turn for the given `session_id` and persist the updated session.
    pub async fn run(&self, session_id: &str, utterance: &str) -> Result<Turn> {
        let lock = self.lock_for(session_id).await?;
        let _guard = lock.lock().await;

        // 1. Load session; it may have been ended while we waited
        let session = self.load_locked(session_id, &lock).await?;

        // 2. Advance one turn; on error nothing below runs
        let turn = self.engine.advance(&session, utterance).await.map_err(|e| {
            error!(session_id, error = %e, "Turn failed, session left unchanged");
            e
        })?;

        // 3. Persist new state so the next call starts where we left off
        self.storage.save(turn.session.clone()).await?;

        Ok(turn)
    }

    /// Starts the conversation over, keeping the session id.
    pub async fn reset(&self, session_id: &str) -> Result<(Session, Vec<Message>)> {
        let lock = self.lock_for(session_id).await?;
        let _guard = lock.lock().await;

        let session = self.load_locked(session_id, &lock).await?;
        let (fresh, welcome) = self.engine.reset(&session);
        self.storage.save(fresh.clone()).await?;
        info!(session_id, "Session reset");
        Ok((fresh, welcome))
    }

    /// Deletes the session once any in-flight turn has been saved. Ending an
    /// unknown session is a no-op.
    pub async fn end(&self, session_id: &str) -> Result<()> {
        let lock = match self.lock_for(session_id).await {
            Ok(lock) => lock,
            Err(FlowError::SessionNotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        let _guard = lock.lock().await;

        self.storage.delete(session_id).await?;
        self.forget_lock(session_id, &lock);
        info!(session_id, "Session ended");
        Ok(())
    }
}
