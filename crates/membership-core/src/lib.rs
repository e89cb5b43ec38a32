//! Shared types for the membership adapter.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`ApplicationId`, `UserId`, `RoleId`)
//! - [`settings`] - Tenant-scope configuration and the credential format tag
//!
//! # Example
//!
//! ```
//! use membership_core::{ApplicationId, MembershipSettings, PasswordFormat};
//!
//! let settings = MembershipSettings::new(ApplicationId::new());
//! assert_eq!(settings.password_format, PasswordFormat::Pbkdf2Sha256);
//! ```

pub mod ids;
pub mod settings;

// Re-export main types for convenient access
pub use ids::{ApplicationId, ParseIdError, RoleId, UserId};
pub use settings::{MembershipSettings, PasswordFormat};
