//! Session-scoped state: the last generation result per user session.
//!
//! Nothing here outlives the process. A validation failure never touches a session;
//! every completed generation attempt (success or failure) replaces the previous result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Result of one generation attempt.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Success { letter: String },
    Failure { reason: String },
}

impl GenerationResult {
    pub fn letter(&self) -> Option<&str> {
        match self {
            GenerationResult::Success { letter } => Some(letter),
            GenerationResult::Failure { .. } => None,
        }
    }
}

/// What a session remembers about its last generation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct StoredResult {
    #[serde(flatten)]
    pub result: GenerationResult,
    /// The program the letter was generated for; drives the download name.
    pub target_program: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionContext {
    pub last_result: Option<StoredResult>,
}

impl SessionContext {
    /// Replaces any prior result.
    pub fn record(&mut self, result: GenerationResult, target_program: &str) {
        self.last_result = Some(StoredResult {
            result,
            target_program: target_program.to_string(),
            generated_at: Utc::now(),
        });
    }
}

/// In-process session registry shared through `AppState`.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionContext> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Stores `result` for session `id`, creating the session if needed.
    pub async fn record(&self, id: Uuid, result: GenerationResult, target_program: &str) {
        self.inner
            .write()
            .await
            .entry(id)
            .or_default()
            .record(result, target_program);
    }

    /// Drops the session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }
}
