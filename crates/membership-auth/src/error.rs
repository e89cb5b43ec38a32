//! Error types for password operations.

use thiserror::Error;

/// Password hashing error types.
///
/// The hasher is pure; the only failure modes are malformed inputs and
/// randomness acquisition.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Stored salt is not valid Base64.
    #[error("Invalid password salt: {0}")]
    InvalidSalt(String),

    /// Hashing or salt generation failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

impl AuthError {
    /// Check if this error indicates a malformed stored salt.
    #[must_use]
    pub fn is_invalid_salt(&self) -> bool {
        matches!(self, AuthError::InvalidSalt(_))
    }

    /// Check if this error indicates a hashing failure.
    #[must_use]
    pub fn is_hashing_failed(&self) -> bool {
        matches!(self, AuthError::HashingFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::InvalidSalt("bad padding".to_string());
        assert_eq!(err.to_string(), "Invalid password salt: bad padding");

        let err = AuthError::HashingFailed("rng unavailable".to_string());
        assert_eq!(err.to_string(), "Password hashing failed: rng unavailable");
    }

    #[test]
    fn test_predicates() {
        assert!(AuthError::InvalidSalt("x".to_string()).is_invalid_salt());
        assert!(!AuthError::InvalidSalt("x".to_string()).is_hashing_failed());
        assert!(AuthError::HashingFailed("x".to_string()).is_hashing_failed());
    }
}
