use thiserror::Error;

use crate::models::collection::Collection;

/// Unified error type for the entire finance-dashboard-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Streams ─────────────────────────────────────────────────────
    #[error("Transport error on {collection}: {message}")]
    Transport {
        collection: Collection,
        message: String,
    },

    #[error("Could not subscribe to {collection}: {message}")]
    Setup {
        collection: Collection,
        message: String,
    },

    #[error("No authenticated user, subscriptions not opened")]
    IdentityUnavailable,

    // ── Records ─────────────────────────────────────────────────────
    #[error("Malformed field '{field}': {message}")]
    DataShape { field: String, message: String },

    #[error("Snapshot for {actual} applied to the {expected} store")]
    CollectionMismatch {
        expected: Collection,
        actual: Collection,
    },

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Whether the error is recovered by retrying the same stream.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Transport { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
