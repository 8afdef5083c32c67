/*!
 * Cooperative cancellation.
 *
 * Each job owns one `CancelToken`: set once by the submitter, observed many
 * times by the orchestrator and the render progress sink at explicit
 * checkpoints. Tokens are never reset. The registry maps job ids to tokens
 * so a cancel request can reach a running job.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::JobId;

/// Set-once, observe-many cancellation signal
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One cancellation token per job id
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    tokens: RwLock<HashMap<JobId, CancelToken>>,
}

impl CancellationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh token for a job and return a handle to it
    pub fn register(&self, id: JobId) -> CancelToken {
        let token = CancelToken::new();
        self.tokens.write().insert(id, token.clone());
        token
    }

    /// Token for a job, if one is registered
    pub fn get(&self, id: &JobId) -> Option<CancelToken> {
        self.tokens.read().get(id).cloned()
    }

    /// Set the cancellation signal for a job. Returns false when the id is
    /// unknown.
    pub fn cancel(&self, id: &JobId) -> bool {
        match self.get(id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
