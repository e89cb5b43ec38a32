//! SQL-backed user store.

use crate::error::{is_unique_violation, StoreError, StoreResult};
use crate::models::{never_date, MembershipRole, MembershipUser, NewUser, UserRole};
use crate::pool::DbPool;
use crate::traits::{Claim, UserClaims, UserLookup, UserRoleMembership, UserWrite};
use async_trait::async_trait;
use chrono::Utc;
use membership_auth::MembershipPasswordHasher;
use membership_core::{MembershipSettings, UserId};

/// User store over the legacy `"Users"`/`"Credentials"` tables.
///
/// Holds the shared pool, the tenant settings that scope every query, and
/// the hasher used to derive credential material. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SqlUserStore {
    pub(crate) pool: DbPool,
    pub(crate) settings: MembershipSettings,
    pub(crate) hasher: MembershipPasswordHasher,
}

impl SqlUserStore {
    /// Create a store with the default hasher parameters.
    #[must_use]
    pub fn new(pool: DbPool, settings: MembershipSettings) -> Self {
        Self {
            pool,
            settings,
            hasher: MembershipPasswordHasher::new(),
        }
    }

    /// Create a store with a custom hasher (tests use faster parameters).
    #[must_use]
    pub fn with_hasher(
        pool: DbPool,
        settings: MembershipSettings,
        hasher: MembershipPasswordHasher,
    ) -> Self {
        Self {
            pool,
            settings,
            hasher,
        }
    }

    /// The tenant settings this store operates under.
    #[must_use]
    pub fn settings(&self) -> &MembershipSettings {
        &self.settings
    }

    fn application_id(&self) -> uuid::Uuid {
        *self.settings.application_id.as_uuid()
    }

    /// Find a user by identifier within this store's tenant.
    pub async fn find_by_id(&self, id: UserId) -> StoreResult<Option<MembershipUser>> {
        let user =
            MembershipUser::find_by_id(self.pool.inner(), self.application_id(), *id.as_uuid())
                .await?;
        Ok(user)
    }

    /// Find a user by name, case-insensitively.
    ///
    /// The input is lowercased before matching `"LoweredUserName"`, so
    /// `"ALICE"` and `"alice"` find the same row.
    pub async fn find_by_normalized_name(
        &self,
        name: &str,
    ) -> StoreResult<Option<MembershipUser>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "user name must not be blank".to_string(),
            ));
        }

        let user = MembershipUser::find_by_lowered_name(
            self.pool.inner(),
            self.application_id(),
            &name.to_lowercase(),
        )
        .await?;
        Ok(user)
    }

    /// Create a user.
    ///
    /// Assigns a fresh identifier, derives salt and digest per the tenant's
    /// configured credential format, and inserts the identity and credential
    /// rows in one transaction. A duplicate lowered username or email is
    /// [`StoreError::Rejected`]; connectivity failures propagate after
    /// rollback.
    pub async fn create(&self, new_user: NewUser) -> StoreResult<MembershipUser> {
        let user_name = new_user.user_name.trim();
        if user_name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "user name must not be blank".to_string(),
            ));
        }
        if new_user.password.is_empty() {
            return Err(StoreError::InvalidArgument(
                "password must not be blank".to_string(),
            ));
        }

        let format = self.settings.password_format;
        let salt = MembershipPasswordHasher::generate_salt()?;
        let digest = self.hasher.hash(format, &salt, &new_user.password)?;

        let now = Utc::now();
        let sentinel = never_date();
        let user = MembershipUser {
            id: *UserId::new().as_uuid(),
            application_id: self.application_id(),
            user_name: user_name.to_string(),
            lowered_user_name: user_name.to_lowercase(),
            password: digest,
            password_salt: salt,
            password_format: format.tag(),
            lowered_email: new_user.email.as_ref().map(|e| e.to_lowercase()),
            email: new_user.email,
            password_question: new_user.password_question,
            password_answer: new_user.password_answer,
            is_approved: new_user.is_approved,
            is_locked_out: false,
            create_date: now,
            last_login_date: sentinel,
            last_password_changed_date: now,
            last_lockout_date: sentinel,
            failed_password_attempt_count: 0,
            failed_password_attempt_window_start: sentinel,
            failed_password_answer_attempt_count: 0,
            failed_password_answer_attempt_window_start: sentinel,
            comment: new_user.comment,
        };

        let mut tx = self.pool.begin().await?;
        if let Err(e) = user.insert(&mut tx).await {
            if is_unique_violation(&e) {
                return Err(StoreError::Rejected(
                    "a user with that name or email already exists".to_string(),
                ));
            }
            return Err(e.into());
        }
        tx.commit().await?;

        tracing::info!(user = %user.lowered_user_name, "created membership user");
        Ok(user)
    }

    /// Rewrite a user's identity and credential attributes.
    ///
    /// The lowered username and lowered email are recomputed from the
    /// supplied values so the lookup invariant cannot drift. Both updates
    /// run in one transaction; zero affected rows is
    /// [`StoreError::Rejected`].
    pub async fn update(&self, user: &MembershipUser) -> StoreResult<()> {
        if user.user_name.trim().is_empty() {
            return Err(StoreError::InvalidArgument(
                "user name must not be blank".to_string(),
            ));
        }

        let mut updated = user.clone();
        updated.lowered_user_name = updated.user_name.to_lowercase();
        updated.lowered_email = updated.email.as_ref().map(|e| e.to_lowercase());

        let mut tx = self.pool.begin().await?;
        let rows = match updated.update_identity(&mut tx).await {
            Ok(rows) => rows,
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Rejected(
                    "a user with that name already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        if rows == 0 {
            return Err(StoreError::Rejected("user does not exist".to_string()));
        }

        let rows = match updated.update_credentials(&mut tx).await {
            Ok(rows) => rows,
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Rejected(
                    "a user with that email already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        if rows == 0 {
            return Err(StoreError::Rejected(
                "user credential row does not exist".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a user: join rows, credential row, identity row, in that
    /// order, in one transaction.
    ///
    /// A missing identity row is [`StoreError::Rejected`] and rolls the
    /// whole deletion back.
    pub async fn delete(&self, id: UserId) -> StoreResult<()> {
        let application_id = self.application_id();
        let uuid = *id.as_uuid();

        let mut tx = self.pool.begin().await?;
        UserRole::delete_for_user(&mut tx, uuid).await?;
        MembershipUser::delete_credentials(&mut tx, application_id, uuid).await?;
        let rows = MembershipUser::delete_identity(&mut tx, application_id, uuid).await?;
        if rows == 0 {
            return Err(StoreError::Rejected("user does not exist".to_string()));
        }
        tx.commit().await?;

        tracing::info!(user_id = %id, "deleted membership user");
        Ok(())
    }

    async fn require_user(&self, user_id: UserId) -> StoreResult<MembershipUser> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| StoreError::Rejected("user does not exist".to_string()))
    }

    async fn require_role(&self, role_name: &str) -> StoreResult<MembershipRole> {
        let name = role_name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "role name must not be blank".to_string(),
            ));
        }

        MembershipRole::find_by_lowered_name(
            self.pool.inner(),
            self.application_id(),
            &name.to_lowercase(),
        )
        .await?
        .ok_or_else(|| StoreError::Rejected(format!("role '{name}' does not exist")))
    }

    /// Add a user to a named role.
    ///
    /// Unknown roles, unknown users and already-held memberships are
    /// [`StoreError::Rejected`]. The user lookup is tenant-scoped, so an
    /// identifier belonging to another tenant can never produce a
    /// cross-tenant join row. The insert is idempotent at the SQL level,
    /// so a concurrent duplicate add surfaces as a rejection rather than a
    /// constraint violation.
    pub async fn add_to_role(&self, user_id: UserId, role_name: &str) -> StoreResult<()> {
        let role = self.require_role(role_name).await?;
        let user = self.require_user(user_id).await?;
        let rows = UserRole::add(self.pool.inner(), user.id, role.id).await?;
        if rows == 0 {
            return Err(StoreError::Rejected(format!(
                "user is already in role '{}'",
                role.name
            )));
        }

        tracing::debug!(user_id = %user_id, role = %role.lowered_name, "added user to role");
        Ok(())
    }

    /// Remove a user from a named role.
    ///
    /// Unknown roles are [`StoreError::Rejected`]; an absent membership is
    /// an idempotent success.
    pub async fn remove_from_role(&self, user_id: UserId, role_name: &str) -> StoreResult<()> {
        let role = self.require_role(role_name).await?;
        UserRole::remove(self.pool.inner(), *user_id.as_uuid(), role.id).await?;

        tracing::debug!(user_id = %user_id, role = %role.lowered_name, "removed user from role");
        Ok(())
    }

    /// List the names of the roles a user belongs to, ordered by name.
    pub async fn roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<String>> {
        let roles = UserRole::role_names_for_user(
            self.pool.inner(),
            self.application_id(),
            *user_id.as_uuid(),
        )
        .await?;
        Ok(roles)
    }

    /// Check whether a user belongs to a named role.
    ///
    /// An unknown role is simply `Ok(false)`.
    pub async fn is_in_role(&self, user_id: UserId, role_name: &str) -> StoreResult<bool> {
        let name = role_name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "role name must not be blank".to_string(),
            ));
        }

        let role = MembershipRole::find_by_lowered_name(
            self.pool.inner(),
            self.application_id(),
            &name.to_lowercase(),
        )
        .await?;
        match role {
            None => Ok(false),
            Some(role) => {
                let exists =
                    UserRole::exists(self.pool.inner(), *user_id.as_uuid(), role.id).await?;
                Ok(exists)
            }
        }
    }

    /// List the usernames of a role's members, ordered by name.
    ///
    /// Unknown roles are [`StoreError::Rejected`].
    pub async fn users_in_role(&self, role_name: &str) -> StoreResult<Vec<String>> {
        let role = self.require_role(role_name).await?;
        let users =
            UserRole::user_names_in_role(self.pool.inner(), self.application_id(), role.id).await?;
        Ok(users)
    }

    /// Compute a user's claims.
    ///
    /// The schema stores no claims; the claim set is exactly the user's
    /// current role memberships, recomputed on every call.
    pub async fn claims_for_user(&self, user_id: UserId) -> StoreResult<Vec<Claim>> {
        let roles = self.roles_for_user(user_id).await?;
        Ok(roles.into_iter().map(Claim::role).collect())
    }
}

#[async_trait]
impl UserLookup for SqlUserStore {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<MembershipUser>> {
        SqlUserStore::find_by_id(self, id).await
    }

    async fn find_by_normalized_name(&self, name: &str) -> StoreResult<Option<MembershipUser>> {
        SqlUserStore::find_by_normalized_name(self, name).await
    }
}

#[async_trait]
impl UserWrite for SqlUserStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<MembershipUser> {
        SqlUserStore::create(self, new_user).await
    }

    async fn update(&self, user: &MembershipUser) -> StoreResult<()> {
        SqlUserStore::update(self, user).await
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        SqlUserStore::delete(self, id).await
    }
}

#[async_trait]
impl UserRoleMembership for SqlUserStore {
    async fn add_to_role(&self, user_id: UserId, role_name: &str) -> StoreResult<()> {
        SqlUserStore::add_to_role(self, user_id, role_name).await
    }

    async fn remove_from_role(&self, user_id: UserId, role_name: &str) -> StoreResult<()> {
        SqlUserStore::remove_from_role(self, user_id, role_name).await
    }

    async fn roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<String>> {
        SqlUserStore::roles_for_user(self, user_id).await
    }

    async fn is_in_role(&self, user_id: UserId, role_name: &str) -> StoreResult<bool> {
        SqlUserStore::is_in_role(self, user_id, role_name).await
    }

    async fn users_in_role(&self, role_name: &str) -> StoreResult<Vec<String>> {
        SqlUserStore::users_in_role(self, role_name).await
    }
}

#[async_trait]
impl UserClaims for SqlUserStore {
    async fn claims_for_user(&self, user_id: UserId) -> StoreResult<Vec<Claim>> {
        SqlUserStore::claims_for_user(self, user_id).await
    }
}
