//! Error types for the membership-db crate.
//!
//! Expected business outcomes (duplicate names, missing rows) are typed
//! variants callers branch on; infrastructure faults wrap the underlying
//! `sqlx::Error` and propagate. Not-found lookups are `Ok(None)` or empty
//! collections, never errors.

use membership_auth::AuthError;
use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation errors.
///
/// # Example
///
/// ```rust
/// use membership_db::StoreError;
///
/// fn handle_error(err: StoreError) {
///     match err {
///         StoreError::InvalidArgument(msg) => eprintln!("Bad input: {}", msg),
///         StoreError::Rejected(msg) => eprintln!("Rejected: {}", msg),
///         StoreError::Hash(e) => eprintln!("Hashing: {}", e),
///         StoreError::Database(e) => eprintln!("Database: {}", e),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller passed a blank or malformed required argument.
    ///
    /// Raised before any I/O takes place.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A write was refused: zero rows affected, a uniqueness rule violated,
    /// or a referenced entity absent.
    ///
    /// The message is human-readable and safe to surface to callers.
    #[error("Operation rejected: {0}")]
    Rejected(String),

    /// Password hashing or salt generation failed.
    #[error("Password operation failed: {0}")]
    Hash(#[from] AuthError),

    /// The underlying database operation failed.
    ///
    /// Any active transaction has already been rolled back when this is
    /// returned.
    #[error("Database operation failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Check if this error indicates a caller-side argument problem.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StoreError::InvalidArgument(_))
    }

    /// Check if this error indicates a refused write.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, StoreError::Rejected(_))
    }

    /// Check if this error indicates a hashing problem.
    #[must_use]
    pub fn is_hash_error(&self) -> bool {
        matches!(self, StoreError::Hash(_))
    }

    /// Check if this error indicates a database fault.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, StoreError::Database(_))
    }
}

/// Check whether a `sqlx` error is a PostgreSQL unique constraint violation.
///
/// Used by the write paths to map duplicate keys onto
/// [`StoreError::Rejected`] instead of a fatal fault.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidArgument("user name is blank".to_string());
        assert_eq!(err.to_string(), "Invalid argument: user name is blank");

        let err = StoreError::Rejected("duplicate user name".to_string());
        assert_eq!(err.to_string(), "Operation rejected: duplicate user name");
    }

    #[test]
    fn test_predicates() {
        let err = StoreError::Rejected("x".to_string());
        assert!(err.is_rejected());
        assert!(!err.is_invalid_argument());
        assert!(!err.is_hash_error());
        assert!(!err.is_database_error());

        let err = StoreError::InvalidArgument("x".to_string());
        assert!(err.is_invalid_argument());
        assert!(!err.is_rejected());
    }

    #[test]
    fn test_hash_error_conversion() {
        let err: StoreError = AuthError::InvalidSalt("bad".to_string()).into();
        assert!(err.is_hash_error());
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
