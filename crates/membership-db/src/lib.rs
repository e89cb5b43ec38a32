//! SQL stores and legacy operations for the membership adapter.
//!
//! Maps a modern identity abstraction onto a pre-existing membership schema
//! (`"Users"`, `"Credentials"`, `"Roles"`, `"UserRoles"`), preserving the
//! schema's credential formats, `"ApplicationId"` tenant scoping, and
//! lockout bookkeeping.
//!
//! # Modules
//!
//! - [`pool`] - Shared connection pool ([`DbPool`])
//! - [`models`] - Entity models owning their SQL
//! - [`traits`] - Narrow store capability traits
//! - [`stores`] - [`SqlUserStore`] and [`SqlRoleStore`]
//! - [`legacy`] - [`LegacyMembershipService`] for unlock/reset/validate
//! - [`error`] - [`StoreError`] taxonomy
//!
//! # Example
//!
//! ```no_run
//! use membership_core::{ApplicationId, MembershipSettings};
//! use membership_db::{DbPool, NewUser, SqlUserStore};
//!
//! # async fn example() -> Result<(), membership_db::StoreError> {
//! let pool = DbPool::connect("postgres://localhost/membership").await?;
//! let settings = MembershipSettings::new(ApplicationId::new());
//! let store = SqlUserStore::new(pool, settings);
//!
//! let user = store
//!     .create(NewUser {
//!         user_name: "alice".to_string(),
//!         password: "Secret1!".to_string(),
//!         email: Some("alice@example.com".to_string()),
//!         password_question: None,
//!         password_answer: None,
//!         is_approved: true,
//!         comment: None,
//!     })
//!     .await?;
//! assert_eq!(user.lowered_user_name, "alice");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod legacy;
pub mod models;
pub mod pool;
pub mod stores;
pub mod traits;

// Re-export main types for convenient access
pub use error::{StoreError, StoreResult};
pub use legacy::LegacyMembershipService;
pub use models::{never_date, MembershipRole, MembershipUser, NewUser, UserRole};
pub use pool::DbPool;
pub use stores::{SqlRoleStore, SqlUserStore};
pub use traits::{
    Claim, RoleLookup, RoleWrite, UserClaims, UserLookup, UserRoleMembership, UserWrite,
    ROLE_CLAIM_TYPE,
};
