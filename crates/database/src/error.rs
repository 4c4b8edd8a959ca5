use sea_orm::DbErr;
use thiserror::Error;

/// Failure of a report or a write against the gradebook
///
/// A write that fails with any of these has been rolled back in full.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("cannot remove {kind} still in use: {}", .keys.join(", "))]
    ReferentialConflict {
        kind: &'static str,
        keys: Vec<String>,
    },

    #[error("store failure: {0}")]
    TransientStore(#[from] DbErr),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::TransientStore(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}
