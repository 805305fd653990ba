//! Unified error type for data layer

use thiserror::Error;

use crate::data::sqlite::SqliteError;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// A write collided with an existing unique value
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_))
        )
    }
}

impl From<SqliteError> for DataError {
    fn from(e: SqliteError) -> Self {
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            SqliteError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_survives_conversion() {
        let err: DataError = SqliteError::Conflict("taken".to_string()).into();
        assert!(matches!(err, DataError::Conflict(ref m) if m == "taken"));
        assert_eq!(err.to_string(), "Conflict: taken");
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Sqlite(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!DataError::Sqlite(sqlx::Error::RowNotFound).is_transient());
        assert!(!DataError::Conflict("x".to_string()).is_transient());
    }

    #[test]
    fn test_migration_failed_display() {
        let err: DataError = SqliteError::MigrationFailed {
            version: 2,
            name: "add_index".to_string(),
            error: "boom".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Migration 2 (add_index) failed: boom");
    }
}
