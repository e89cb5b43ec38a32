//! Strongly typed identifiers.
//!
//! Newtype wrappers around `uuid::Uuid` for the three identifier kinds the
//! legacy schema uses. Keeping them distinct at the type level prevents a
//! `RoleId` from being bound where a `UserId` belongs.
//!
//! # Example
//!
//! ```
//! use membership_core::{ApplicationId, UserId};
//!
//! let app = ApplicationId::new();
//! let user = UserId::new();
//!
//! fn tenant_scoped(id: ApplicationId) -> String {
//!     id.to_string()
//! }
//!
//! let _ = tenant_scoped(app);
//! // tenant_scoped(user); // does not compile
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for identifier parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The identifier type that failed to parse.
    pub id_type: &'static str,
    /// The underlying UUID parse error message.
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Identifier of one logical application (tenant) within the shared schema.
    ///
    /// Every user and role row carries an `ApplicationId`; all queries filter
    /// by it so that applications sharing the schema never see each other's
    /// principals.
    ///
    /// # Example
    ///
    /// ```
    /// use membership_core::ApplicationId;
    /// use uuid::Uuid;
    ///
    /// let app_id = ApplicationId::new();
    ///
    /// let uuid = Uuid::new_v4();
    /// let app_id = ApplicationId::from_uuid(uuid);
    /// assert_eq!(app_id.as_uuid(), &uuid);
    ///
    /// let app_id: ApplicationId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// ```
    ApplicationId
);

define_id!(
    /// Identifier of a principal. Assigned once at creation, never reused.
    ///
    /// # Example
    ///
    /// ```
    /// use membership_core::UserId;
    ///
    /// let user_id = UserId::new();
    /// println!("User: {}", user_id);
    /// ```
    UserId
);

define_id!(
    /// Identifier of a named permission group within an application.
    ///
    /// # Example
    ///
    /// ```
    /// use membership_core::RoleId;
    ///
    /// let role_id = RoleId::new();
    /// println!("Role: {}", role_id);
    /// ```
    RoleId
);

#[cfg(test)]
mod tests {
    use super::*;

    mod application_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_id() {
            let id = ApplicationId::new();
            let id_str = id.to_string();
            // UUID format: 8-4-4-4-12 hex digits
            assert_eq!(id_str.len(), 36);
            assert!(id_str.contains('-'));
        }

        #[test]
        fn test_from_uuid_preserves_value() {
            let uuid = Uuid::new_v4();
            let id = ApplicationId::from_uuid(uuid);
            assert_eq!(id.as_uuid(), &uuid);
        }

        #[test]
        fn test_display_returns_uuid_string() {
            let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
            let id = ApplicationId::from_uuid(uuid);
            assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        }

        #[test]
        fn test_default_creates_new_id() {
            let id1 = ApplicationId::default();
            let id2 = ApplicationId::default();
            assert_ne!(id1, id2);
        }
    }

    mod user_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_id() {
            let id = UserId::new();
            assert_eq!(id.to_string().len(), 36);
        }

        #[test]
        fn test_from_uuid_preserves_value() {
            let uuid = Uuid::new_v4();
            let id = UserId::from_uuid(uuid);
            assert_eq!(id.as_uuid(), &uuid);
        }
    }

    mod role_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_id() {
            let id = RoleId::new();
            assert_eq!(id.to_string().len(), 36);
        }

        #[test]
        fn test_distinct_ids_are_not_equal() {
            assert_ne!(RoleId::new(), RoleId::new());
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_user_id_serde_roundtrip() {
            let original = UserId::new();
            let json = serde_json::to_string(&original).unwrap();
            let deserialized: UserId = serde_json::from_str(&json).unwrap();
            assert_eq!(original, deserialized);
        }

        #[test]
        fn test_serializes_as_plain_string() {
            let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
            let id = ApplicationId::from_uuid(uuid);
            let json = serde_json::to_string(&id).unwrap();
            // Plain quoted string, not an object
            assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
        }
    }

    mod from_str_tests {
        use super::*;

        #[test]
        fn test_parse_valid_uuid() {
            let id: UserId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
            assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        }

        #[test]
        fn test_parse_invalid_uuid_returns_error() {
            let result: std::result::Result<RoleId, _> = "not-a-uuid".parse();
            assert!(result.is_err());
            let err = result.unwrap_err();
            assert_eq!(err.id_type, "RoleId");
            assert!(!err.message.is_empty());
        }

        #[test]
        fn test_error_display() {
            let result: std::result::Result<ApplicationId, _> = "invalid".parse();
            let err = result.unwrap_err();
            let display = err.to_string();
            assert!(display.contains("ApplicationId"));
            assert!(display.contains("Failed to parse"));
        }
    }

    mod hash_eq_tests {
        use super::*;
        use std::collections::HashMap;

        #[test]
        fn test_same_uuid_is_equal() {
            let uuid = Uuid::new_v4();
            assert_eq!(UserId::from_uuid(uuid), UserId::from_uuid(uuid));
        }

        #[test]
        fn test_can_use_as_hashmap_key() {
            let mut map: HashMap<UserId, String> = HashMap::new();
            let id1 = UserId::new();
            let id2 = UserId::new();

            map.insert(id1, "alice".to_string());
            map.insert(id2, "bob".to_string());

            assert_eq!(map.get(&id1), Some(&"alice".to_string()));
            assert_eq!(map.get(&id2), Some(&"bob".to_string()));
        }

        #[test]
        fn test_copy_semantics() {
            let id1 = RoleId::new();
            let id2 = id1; // Copy
            assert_eq!(id1, id2);
        }
    }
}
