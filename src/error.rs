use crate::types::{Field, WorkoutId};

/// User-correctable input problem. The operation is aborted with no
/// state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: Field },
    #[error("{field} is not a finite number")]
    NotANumber { field: Field },
    #[error("{field} must be positive")]
    NotPositive { field: Field },
}

impl ValidationError {
    /// Blocking notice shown to the user on any validation failure.
    pub const NOTICE: &'static str = "Inputs must be positive numbers";

    pub const fn field(&self) -> Field {
        match self {
            Self::Missing { field } | Self::NotANumber { field } | Self::NotPositive { field } => {
                *field
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("saved workouts are unreadable: {0}")]
    Corrupt(String),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Failures of the backing slot itself, as opposed to bad data.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Sqlite(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no workout with id {0}")]
    NotFound(WorkoutId),
    #[error("invalid action: {0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
