use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// A row references a parent that does not exist, or a delete would
    /// leave a dangling reference behind.
    #[error("Foreign key violation on {table}.{column}: {value}")]
    ForeignKey {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("Check constraint failed on {table}: {message}")]
    Check {
        table: &'static str,
        message: String,
    },

    #[error("Unique constraint failed on {table}.{column}: {value}")]
    UniqueViolation {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    pub(crate) fn check(table: &'static str, message: impl Into<String>) -> Self {
        Self::Check {
            table,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
