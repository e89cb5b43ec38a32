//! Tenant-scope configuration.
//!
//! `MembershipSettings` is the single piece of configuration threaded into
//! every store operation: which application (tenant) the adapter serves, the
//! credential format used for newly created accounts, and the lockout
//! threshold the calling layer applies. It is immutable after construction
//! and safe to clone/share across concurrent operations.

use crate::ids::ApplicationId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Credential encoding format, as persisted in the `PasswordFormat` column.
///
/// The legacy schema stores the format as a numeric tag per user. Only two
/// tags were ever valid; anything else is unsupported and must fail closed,
/// which is why [`PasswordFormat::from_tag`] returns `Option` instead of
/// defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordFormat {
    /// Tag 0: the stored digest is the plaintext itself.
    ///
    /// Kept only for compatibility with pre-existing rows. Nothing in the
    /// adapter prevents creating new plain credentials; that policy decision
    /// belongs to the caller.
    Plain,
    /// Tag 1: `Base64(PBKDF2-HMAC-SHA256(password, salt, 10000 iters, 63 bytes))`.
    Pbkdf2Sha256,
}

impl PasswordFormat {
    /// Parse the raw column value. Unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Plain),
            1 => Some(Self::Pbkdf2Sha256),
            _ => None,
        }
    }

    /// The numeric tag persisted in the `PasswordFormat` column.
    #[must_use]
    pub fn tag(self) -> i32 {
        match self {
            Self::Plain => 0,
            Self::Pbkdf2Sha256 => 1,
        }
    }
}

impl Display for PasswordFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Pbkdf2Sha256 => write!(f, "pbkdf2-sha256"),
        }
    }
}

/// Configuration for one application's view of the shared membership schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipSettings {
    /// Tenant partition key; every query filters by it.
    pub application_id: ApplicationId,
    /// Format applied to newly created credentials.
    pub password_format: PasswordFormat,
    /// Consecutive failed attempts after which the calling layer locks the
    /// account. The stores expose the counters; they do not enforce this.
    pub max_invalid_password_attempts: u32,
}

impl MembershipSettings {
    /// Settings with the default credential policy (hashed passwords, five
    /// invalid attempts).
    #[must_use]
    pub fn new(application_id: ApplicationId) -> Self {
        Self {
            application_id,
            password_format: PasswordFormat::Pbkdf2Sha256,
            max_invalid_password_attempts: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_roundtrip() {
        assert_eq!(PasswordFormat::from_tag(0), Some(PasswordFormat::Plain));
        assert_eq!(
            PasswordFormat::from_tag(1),
            Some(PasswordFormat::Pbkdf2Sha256)
        );
        assert_eq!(PasswordFormat::Plain.tag(), 0);
        assert_eq!(PasswordFormat::Pbkdf2Sha256.tag(), 1);
    }

    #[test]
    fn test_unknown_tags_are_rejected() {
        assert_eq!(PasswordFormat::from_tag(2), None);
        assert_eq!(PasswordFormat::from_tag(-1), None);
        assert_eq!(PasswordFormat::from_tag(i32::MAX), None);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(PasswordFormat::Plain.to_string(), "plain");
        assert_eq!(PasswordFormat::Pbkdf2Sha256.to_string(), "pbkdf2-sha256");
    }

    #[test]
    fn test_default_settings() {
        let app = ApplicationId::new();
        let settings = MembershipSettings::new(app);

        assert_eq!(settings.application_id, app);
        assert_eq!(settings.password_format, PasswordFormat::Pbkdf2Sha256);
        assert_eq!(settings.max_invalid_password_attempts, 5);
    }

    #[test]
    fn test_settings_are_cloneable() {
        let settings = MembershipSettings::new(ApplicationId::new());
        let copy = settings.clone();
        assert_eq!(copy.application_id, settings.application_id);
    }
}
