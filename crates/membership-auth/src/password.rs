//! Legacy-compatible password hashing.
//!
//! Reproduces the two credential encodings found in the membership schema so
//! that existing rows keep verifying and new rows stay readable by the old
//! system:
//!
//! - [`PasswordFormat::Plain`] (tag 0): the stored digest is the plaintext.
//! - [`PasswordFormat::Pbkdf2Sha256`] (tag 1): Base64 of
//!   PBKDF2-HMAC-SHA256 over the plaintext with a stored 16-byte salt,
//!   10000 iterations, 63-byte derived key.
//!
//! Digest comparison is plain string equality, matching the legacy
//! implementation (not constant-time; hardening candidate).

use crate::error::AuthError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use membership_core::PasswordFormat;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

/// Salt length in bytes, as generated by the legacy system.
const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
const DEFAULT_ITERATIONS: u32 = 10_000;

/// Default derived key length in bytes.
const DEFAULT_OUTPUT_LEN: usize = 63;

/// Dual-format password hasher.
///
/// Stateless and pure over its parameters; one instance can be shared by any
/// number of concurrent operations.
///
/// # Example
///
/// ```
/// use membership_auth::MembershipPasswordHasher;
/// use membership_core::PasswordFormat;
///
/// let hasher = MembershipPasswordHasher::new();
/// let salt = MembershipPasswordHasher::generate_salt().unwrap();
///
/// let digest = hasher
///     .hash(PasswordFormat::Pbkdf2Sha256, &salt, "Secret1!")
///     .unwrap();
/// assert!(hasher
///     .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "Secret1!")
///     .unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct MembershipPasswordHasher {
    iterations: NonZeroU32,
    output_len: usize,
}

impl Default for MembershipPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl MembershipPasswordHasher {
    /// Create a hasher with the legacy parameters (10000 iterations, 63-byte
    /// derived key).
    #[must_use]
    pub fn new() -> Self {
        // Legacy-mandated constants; always valid.
        Self {
            iterations: NonZeroU32::new(DEFAULT_ITERATIONS)
                .expect("default iteration count is non-zero"),
            output_len: DEFAULT_OUTPUT_LEN,
        }
    }

    /// Create a hasher with custom PBKDF2 parameters.
    ///
    /// Useful in tests; production digests must use [`new`](Self::new) to
    /// stay byte-compatible with existing rows.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HashingFailed`] if `iterations` or `output_len`
    /// is zero.
    pub fn with_params(iterations: u32, output_len: usize) -> Result<Self, AuthError> {
        let iterations = NonZeroU32::new(iterations)
            .ok_or_else(|| AuthError::HashingFailed("iteration count must be non-zero".into()))?;
        if output_len == 0 {
            return Err(AuthError::HashingFailed(
                "output length must be non-zero".into(),
            ));
        }

        Ok(Self {
            iterations,
            output_len,
        })
    }

    /// Generate a fresh credential salt: 16 cryptographically random bytes,
    /// Base64-encoded for storage in the `PasswordSalt` column.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HashingFailed`] if the system RNG fails.
    pub fn generate_salt() -> Result<String, AuthError> {
        let rng = SystemRandom::new();
        let mut salt = [0u8; SALT_LEN];
        rng.fill(&mut salt)
            .map_err(|_| AuthError::HashingFailed("failed to generate random salt".into()))?;

        Ok(BASE64.encode(salt))
    }

    /// Produce the storable digest for `password` under `format`.
    ///
    /// For [`PasswordFormat::Plain`] the digest is the plaintext itself; the
    /// salt is ignored. For [`PasswordFormat::Pbkdf2Sha256`] the digest is
    /// the Base64-encoded derived key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSalt`] if the stored salt is not valid
    /// Base64.
    pub fn hash(
        &self,
        format: PasswordFormat,
        salt_b64: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        match format {
            PasswordFormat::Plain => Ok(password.to_string()),
            PasswordFormat::Pbkdf2Sha256 => {
                let salt = BASE64
                    .decode(salt_b64)
                    .map_err(|e| AuthError::InvalidSalt(e.to_string()))?;

                let mut derived = vec![0u8; self.output_len];
                pbkdf2::derive(
                    pbkdf2::PBKDF2_HMAC_SHA256,
                    self.iterations,
                    &salt,
                    password.as_bytes(),
                    &mut derived,
                );

                Ok(BASE64.encode(derived))
            }
        }
    }

    /// Verify `supplied_password` against a stored digest.
    ///
    /// Recomputes the digest under `format` with the stored salt and compares
    /// the two as opaque strings.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSalt`] if the stored salt is not valid
    /// Base64 (format 1 only). A mismatching password is `Ok(false)`, not an
    /// error.
    pub fn verify(
        &self,
        format: PasswordFormat,
        salt_b64: &str,
        stored_digest: &str,
        supplied_password: &str,
    ) -> Result<bool, AuthError> {
        let computed = self.hash(format, salt_b64, supplied_password)?;
        Ok(computed == stored_digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt() -> String {
        MembershipPasswordHasher::generate_salt().unwrap()
    }

    #[test]
    fn test_generate_salt_is_16_bytes() {
        let decoded = BASE64.decode(salt()).unwrap();
        assert_eq!(decoded.len(), SALT_LEN);
    }

    #[test]
    fn test_generate_salt_is_unique() {
        assert_ne!(salt(), salt());
    }

    #[test]
    fn test_pbkdf2_roundtrip() {
        let hasher = MembershipPasswordHasher::new();
        let salt = salt();
        let digest = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt, "Secret1!")
            .unwrap();

        assert!(hasher
            .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "Secret1!")
            .unwrap());
        assert!(!hasher
            .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "secret1!")
            .unwrap());
        assert!(!hasher
            .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "")
            .unwrap());
    }

    #[test]
    fn test_pbkdf2_digest_is_63_byte_key() {
        let hasher = MembershipPasswordHasher::new();
        let digest = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt(), "password")
            .unwrap();

        let raw = BASE64.decode(digest).unwrap();
        assert_eq!(raw.len(), DEFAULT_OUTPUT_LEN);
    }

    #[test]
    fn test_pbkdf2_is_deterministic_for_same_salt() {
        let hasher = MembershipPasswordHasher::new();
        let salt = salt();

        let a = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt, "password")
            .unwrap();
        let b = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt, "password")
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_salts_produce_different_digests() {
        let hasher = MembershipPasswordHasher::new();

        let a = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt(), "password")
            .unwrap();
        let b = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt(), "password")
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_plain_format_stores_plaintext() {
        let hasher = MembershipPasswordHasher::new();
        let digest = hasher
            .hash(PasswordFormat::Plain, &salt(), "cleartext")
            .unwrap();
        assert_eq!(digest, "cleartext");
    }

    #[test]
    fn test_plain_format_is_literal_equality() {
        let hasher = MembershipPasswordHasher::new();
        let salt = salt();

        assert!(hasher
            .verify(PasswordFormat::Plain, &salt, "cleartext", "cleartext")
            .unwrap());
        assert!(!hasher
            .verify(PasswordFormat::Plain, &salt, "cleartext", "ClearText")
            .unwrap());
    }

    #[test]
    fn test_invalid_salt_is_rejected() {
        let hasher = MembershipPasswordHasher::new();
        let result = hasher.hash(PasswordFormat::Pbkdf2Sha256, "!!not-base64!!", "pw");

        assert!(result.is_err());
        assert!(result.unwrap_err().is_invalid_salt());
    }

    #[test]
    fn test_plain_format_ignores_bad_salt() {
        // Format 0 never touches the salt; legacy rows sometimes carry junk.
        let hasher = MembershipPasswordHasher::new();
        assert!(hasher
            .verify(PasswordFormat::Plain, "!!not-base64!!", "pw", "pw")
            .unwrap());
    }

    #[test]
    fn test_custom_params() {
        // Smaller params for faster testing
        let hasher = MembershipPasswordHasher::with_params(100, 32).unwrap();
        let salt = salt();

        let digest = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt, "pw")
            .unwrap();
        assert_eq!(BASE64.decode(&digest).unwrap().len(), 32);
        assert!(hasher
            .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "pw")
            .unwrap());
    }

    #[test]
    fn test_zero_params_are_rejected() {
        assert!(MembershipPasswordHasher::with_params(0, 63).is_err());
        assert!(MembershipPasswordHasher::with_params(10_000, 0).is_err());
    }

    #[test]
    fn test_unicode_password() {
        let hasher = MembershipPasswordHasher::new();
        let salt = salt();
        let password = "пароль日本語🔐";

        let digest = hasher
            .hash(PasswordFormat::Pbkdf2Sha256, &salt, password)
            .unwrap();
        assert!(hasher
            .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, password)
            .unwrap());
        assert!(!hasher
            .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "wrong")
            .unwrap());
    }
}
