//! Typed error enum for the service layer.

use statlines_storage::StorageError;
use thiserror::Error;

/// Service-layer error: storage failures plus resolution outcomes.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, pool, merge rejected, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// A team name matched more than one stored team. Nothing was written.
    #[error("team name '{name}' is ambiguous: {}", candidates.join(", "))]
    ResolutionAmbiguous { name: String, candidates: Vec<String> },

    /// Caller provided invalid input (empty name, same team twice).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }
}
