//! Legacy membership operations.
//!
//! A secondary surface beneath the store abstraction for operations the
//! abstraction cannot express: account unlock, security-question password
//! reset, direct change-password, direct credential validation, and role
//! enumeration by username.
//!
//! Callers answering login or reset requests must not reveal which internal
//! check failed; the boolean/option results here are deliberately
//! indistinguishable across failure causes.

use crate::error::{StoreError, StoreResult};
use crate::models::{never_date, MembershipUser, UserRole};
use crate::pool::DbPool;
use crate::stores::SqlUserStore;
use chrono::Utc;
use membership_auth::MembershipPasswordHasher;
use membership_core::MembershipSettings;

/// Length of generated temporary passwords.
const TEMP_PASSWORD_LEN: usize = 8;

/// Direct-schema maintenance and authentication operations.
#[derive(Debug, Clone)]
pub struct LegacyMembershipService {
    pool: DbPool,
    settings: MembershipSettings,
    hasher: MembershipPasswordHasher,
}

impl LegacyMembershipService {
    /// Create a service with the default hasher parameters.
    #[must_use]
    pub fn new(pool: DbPool, settings: MembershipSettings) -> Self {
        Self {
            pool,
            settings,
            hasher: MembershipPasswordHasher::new(),
        }
    }

    /// Create a service sharing a user store's pool, settings and hasher.
    #[must_use]
    pub fn from_store(store: &SqlUserStore) -> Self {
        Self {
            pool: store.pool.clone(),
            settings: store.settings.clone(),
            hasher: store.hasher.clone(),
        }
    }

    fn application_id(&self) -> uuid::Uuid {
        *self.settings.application_id.as_uuid()
    }

    fn lowered(username: &str) -> StoreResult<String> {
        let name = username.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "user name must not be blank".to_string(),
            ));
        }
        Ok(name.to_lowercase())
    }

    async fn find_user(&self, username: &str) -> StoreResult<Option<MembershipUser>> {
        let lowered = Self::lowered(username)?;
        let user =
            MembershipUser::find_by_lowered_name(self.pool.inner(), self.application_id(), &lowered)
                .await?;
        Ok(user)
    }

    /// Unlock an account.
    ///
    /// Clears the lockout flag, zeroes both failed-attempt counters, and
    /// resets both window starts and the last-lockout date to the sentinel.
    /// Returns whether a row was affected.
    pub async fn unlock_user(&self, username: &str) -> StoreResult<bool> {
        let lowered = Self::lowered(username)?;
        let rows = MembershipUser::unlock(
            self.pool.inner(),
            self.application_id(),
            &lowered,
            never_date(),
        )
        .await?;

        if rows > 0 {
            tracing::info!(user = %lowered, "unlocked membership account");
        }
        Ok(rows > 0)
    }

    /// Reset a password through the security-question flow.
    ///
    /// The supplied answer must match the stored answer case-insensitively.
    /// On success a short random temporary password is generated, re-hashed
    /// under the user's stored format, persisted, and returned once; the
    /// plaintext is never stored. Unknown user, missing answer, wrong
    /// answer, and unsupported credential format all yield `Ok(None)`,
    /// indistinguishable to the caller.
    pub async fn reset_password(
        &self,
        username: &str,
        answer: &str,
    ) -> StoreResult<Option<String>> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(None);
        };
        let Some(stored_answer) = user.password_answer.as_deref() else {
            return Ok(None);
        };
        if stored_answer.to_lowercase() != answer.to_lowercase() {
            return Ok(None);
        }
        let Some(format) = user.credential_format() else {
            return Ok(None);
        };

        let temp_password = generate_temp_password();
        let salt = MembershipPasswordHasher::generate_salt()?;
        let digest = self.hasher.hash(format, &salt, &temp_password)?;

        let rows = MembershipUser::update_password(
            self.pool.inner(),
            self.application_id(),
            user.id,
            &digest,
            &salt,
            format.tag(),
            Utc::now(),
        )
        .await?;
        if rows == 0 {
            return Ok(None);
        }

        tracing::info!(user = %user.lowered_user_name, "password reset via security answer");
        Ok(Some(temp_password))
    }

    /// Change a password, verifying the current one first.
    ///
    /// On success a new salt and digest are persisted under the user's
    /// stored format. Unknown user, wrong current password, and unsupported
    /// format all yield `Ok(false)` with the stored digest untouched.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> StoreResult<bool> {
        if new_password.is_empty() {
            return Err(StoreError::InvalidArgument(
                "new password must not be blank".to_string(),
            ));
        }

        let Some(user) = self.find_user(username).await? else {
            return Ok(false);
        };
        let Some(format) = user.credential_format() else {
            return Ok(false);
        };
        if !self
            .hasher
            .verify(format, &user.password_salt, &user.password, current_password)?
        {
            return Ok(false);
        }

        let salt = MembershipPasswordHasher::generate_salt()?;
        let digest = self.hasher.hash(format, &salt, new_password)?;
        let rows = MembershipUser::update_password(
            self.pool.inner(),
            self.application_id(),
            user.id,
            &digest,
            &salt,
            format.tag(),
            Utc::now(),
        )
        .await?;

        if rows > 0 {
            tracing::info!(user = %user.lowered_user_name, "password changed");
        }
        Ok(rows > 0)
    }

    /// Validate credentials directly against the schema.
    ///
    /// Short-circuits to `false` for unapproved or locked-out accounts
    /// before any digest work; rows carrying an unsupported format tag
    /// never match. The result does not reveal which check failed.
    pub async fn validate_user(&self, username: &str, password: &str) -> StoreResult<bool> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(false);
        };
        if !user.is_approved || user.is_locked_out {
            return Ok(false);
        }
        let Some(format) = user.credential_format() else {
            return Ok(false);
        };

        let matched = self
            .hasher
            .verify(format, &user.password_salt, &user.password, password)?;
        Ok(matched)
    }

    /// List the role names a user belongs to, by username.
    ///
    /// Three-table join, tenant-scoped on both user and role, ordered by
    /// role name. Unknown users yield an empty list.
    pub async fn roles_for_user(&self, username: &str) -> StoreResult<Vec<String>> {
        let lowered = Self::lowered(username)?;
        let roles =
            UserRole::role_names_for_user_name(self.pool.inner(), self.application_id(), &lowered)
                .await?;
        Ok(roles)
    }
}

/// Generate a short temporary password: the leading hex of a fresh UUID.
fn generate_temp_password() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..TEMP_PASSWORD_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_password_shape() {
        let p = generate_temp_password();
        assert_eq!(p.len(), TEMP_PASSWORD_LEN);
        assert!(p.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_temp_passwords_are_unique() {
        assert_ne!(generate_temp_password(), generate_temp_password());
    }
}
