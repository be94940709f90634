use thiserror::Error;

pub type Result<T> = std::result::Result<T, DayflowError>;

#[derive(Debug, Error)]
pub enum DayflowError {
    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid id format: {0}")]
    InvalidId(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DayflowError {
    /// Whether this error means the entity is missing or not visible to the
    /// caller. Cross-owner access reports the same way as true absence.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::HabitNotFound(_)
                | Self::BoardNotFound(_)
                | Self::ColumnNotFound(_)
                | Self::CardNotFound(_)
        )
    }
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for DayflowError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
