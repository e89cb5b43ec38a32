//! Legacy-compatible password hashing for the membership adapter.
//!
//! This crate reproduces the credential scheme of the original membership
//! schema byte-for-byte so that digests written by either system verify in
//! the other.
//!
//! # Modules
//!
//! - [`password`] - Dual-format hasher ([`MembershipPasswordHasher`])
//! - [`error`] - Error types ([`AuthError`])
//!
//! # Example
//!
//! ```
//! use membership_auth::MembershipPasswordHasher;
//! use membership_core::PasswordFormat;
//!
//! let hasher = MembershipPasswordHasher::new();
//! let salt = MembershipPasswordHasher::generate_salt().unwrap();
//! let digest = hasher
//!     .hash(PasswordFormat::Pbkdf2Sha256, &salt, "Secret1!")
//!     .unwrap();
//! assert!(hasher
//!     .verify(PasswordFormat::Pbkdf2Sha256, &salt, &digest, "Secret1!")
//!     .unwrap());
//! ```

pub mod error;
pub mod password;

// Re-export main types for convenient access
pub use error::AuthError;
pub use password::MembershipPasswordHasher;
