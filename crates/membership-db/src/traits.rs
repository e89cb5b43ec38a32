//! Capability traits for the store surface.
//!
//! Instead of one wide store interface, callers depend on narrow
//! capabilities: user lookup, user write, role membership, claims, role
//! lookup, role write. `SqlUserStore` and `SqlRoleStore` implement the
//! relevant sets over the same underlying schema.

use crate::error::StoreResult;
use crate::models::{MembershipRole, MembershipUser, NewUser};
use async_trait::async_trait;
use membership_core::{RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Claim type emitted for role memberships.
pub const ROLE_CLAIM_TYPE: &str = "role";

/// A claim derived from the schema.
///
/// The legacy schema stores no claims; the only claims a user has are its
/// current role memberships, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type; always [`ROLE_CLAIM_TYPE`] for this schema.
    pub claim_type: String,

    /// Claim value (the role name).
    pub value: String,
}

impl Claim {
    /// Build a role claim.
    #[must_use]
    pub fn role(value: impl Into<String>) -> Self {
        Self {
            claim_type: ROLE_CLAIM_TYPE.to_string(),
            value: value.into(),
        }
    }
}

/// Read access to users.
#[async_trait]
pub trait UserLookup {
    /// Find a user by identifier. Absence is `Ok(None)`.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<MembershipUser>>;

    /// Find a user by name, case-insensitively. Absence is `Ok(None)`.
    async fn find_by_normalized_name(&self, name: &str) -> StoreResult<Option<MembershipUser>>;
}

/// Write access to users.
#[async_trait]
pub trait UserWrite {
    /// Create a user, assigning its identifier and credential material.
    async fn create(&self, new_user: NewUser) -> StoreResult<MembershipUser>;

    /// Rewrite a user's identity and credential attributes.
    async fn update(&self, user: &MembershipUser) -> StoreResult<()>;

    /// Delete a user and all of its role associations.
    async fn delete(&self, id: UserId) -> StoreResult<()>;
}

/// Role membership management for users.
#[async_trait]
pub trait UserRoleMembership {
    /// Add a user to a named role.
    async fn add_to_role(&self, user_id: UserId, role_name: &str) -> StoreResult<()>;

    /// Remove a user from a named role. Idempotent for absent memberships.
    async fn remove_from_role(&self, user_id: UserId, role_name: &str) -> StoreResult<()>;

    /// List the names of the roles a user belongs to, ordered by name.
    async fn roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<String>>;

    /// Check whether a user belongs to a named role.
    async fn is_in_role(&self, user_id: UserId, role_name: &str) -> StoreResult<bool>;

    /// List the usernames of a role's members, ordered by name.
    async fn users_in_role(&self, role_name: &str) -> StoreResult<Vec<String>>;
}

/// Derived claims for users.
#[async_trait]
pub trait UserClaims {
    /// Compute the user's claims from its current role memberships.
    async fn claims_for_user(&self, user_id: UserId) -> StoreResult<Vec<Claim>>;
}

/// Read access to roles.
#[async_trait]
pub trait RoleLookup {
    /// Find a role by identifier. Absence is `Ok(None)`.
    async fn find_by_id(&self, id: RoleId) -> StoreResult<Option<MembershipRole>>;

    /// Find a role by name, case-insensitively. Absence is `Ok(None)`.
    async fn find_by_normalized_name(&self, name: &str) -> StoreResult<Option<MembershipRole>>;
}

/// Write access to roles.
#[async_trait]
pub trait RoleWrite {
    /// Create a role, assigning its identifier.
    async fn create(&self, name: &str, description: Option<&str>) -> StoreResult<MembershipRole>;

    /// Rewrite a role's name, lowered name and description.
    async fn update(&self, role: &MembershipRole) -> StoreResult<()>;

    /// Delete a role and all of its user associations.
    async fn delete(&self, id: RoleId) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_claim_constructor() {
        let claim = Claim::role("Editors");
        assert_eq!(claim.claim_type, ROLE_CLAIM_TYPE);
        assert_eq!(claim.value, "Editors");
    }
}
