//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// A write violated a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl SqliteError {
    /// Classify a write error: unique-constraint violations become `Conflict`
    pub fn from_write(e: sqlx::Error, conflict_message: &str) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(conflict_message.to_string())
            }
            _ => Self::Database(e),
        }
    }
}
