//! Error types for `acquisitions-core`.
//!
//! All fallible store and hashing operations return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

/// Unified error type for persistence and credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Another account already uses this email address.
    #[error("User with this email already exists")]
    EmailTaken,

    /// A stored role column holds a value outside the known roles.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Hashing or parsing a password hash failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Applying the embedded schema migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Any other database failure.
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return CoreError::EmailTaken;
            }
        }
        CoreError::Database(e)
    }
}

/// Convenience alias used throughout `acquisitions-core`.
pub type CoreResult<T> = Result<T, CoreError>;
