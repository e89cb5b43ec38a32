//! SQL-backed role store.

use crate::error::{is_unique_violation, StoreError, StoreResult};
use crate::models::{MembershipRole, UserRole};
use crate::pool::DbPool;
use crate::traits::{RoleLookup, RoleWrite};
use async_trait::async_trait;
use membership_core::{MembershipSettings, RoleId};

/// Role store over the legacy `"Roles"` table.
#[derive(Debug, Clone)]
pub struct SqlRoleStore {
    pool: DbPool,
    settings: MembershipSettings,
}

impl SqlRoleStore {
    /// Create a store scoped to the settings' tenant.
    #[must_use]
    pub fn new(pool: DbPool, settings: MembershipSettings) -> Self {
        Self { pool, settings }
    }

    fn application_id(&self) -> uuid::Uuid {
        *self.settings.application_id.as_uuid()
    }

    /// Find a role by identifier within this store's tenant.
    pub async fn find_by_id(&self, id: RoleId) -> StoreResult<Option<MembershipRole>> {
        let role =
            MembershipRole::find_by_id(self.pool.inner(), self.application_id(), *id.as_uuid())
                .await?;
        Ok(role)
    }

    /// Find a role by name, case-insensitively.
    pub async fn find_by_normalized_name(
        &self,
        name: &str,
    ) -> StoreResult<Option<MembershipRole>> {
        let name = name.trim();
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
        Ok(role)
    }

    /// Create a role.
    ///
    /// Assigns a fresh identifier and stores the lowered name alongside the
    /// display name. A duplicate lowered name is [`StoreError::Rejected`].
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<MembershipRole> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "role name must not be blank".to_string(),
            ));
        }

        let role = MembershipRole {
            id: *RoleId::new().as_uuid(),
            application_id: self.application_id(),
            name: name.to_string(),
            lowered_name: name.to_lowercase(),
            description: description.map(ToString::to_string),
        };

        let rows = match role.insert(self.pool.inner()).await {
            Ok(rows) => rows,
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Rejected(format!(
                    "a role named '{name}' already exists"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if rows == 0 {
            return Err(StoreError::Rejected("role was not inserted".to_string()));
        }

        tracing::info!(role = %role.lowered_name, "created role");
        Ok(role)
    }

    /// Rewrite a role's name and description.
    ///
    /// The lowered name is recomputed from the supplied display name. Zero
    /// affected rows is [`StoreError::Rejected`].
    pub async fn update(&self, role: &MembershipRole) -> StoreResult<()> {
        if role.name.trim().is_empty() {
            return Err(StoreError::InvalidArgument(
                "role name must not be blank".to_string(),
            ));
        }

        let mut updated = role.clone();
        updated.lowered_name = updated.name.to_lowercase();

        let rows = match updated.update(self.pool.inner()).await {
            Ok(rows) => rows,
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Rejected(format!(
                    "a role named '{}' already exists",
                    updated.name
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if rows == 0 {
            return Err(StoreError::Rejected("role does not exist".to_string()));
        }

        Ok(())
    }

    /// Delete a role: join rows first, then the role row, in one
    /// transaction.
    ///
    /// A missing role row is [`StoreError::Rejected`] and rolls the join
    /// cleanup back.
    pub async fn delete(&self, id: RoleId) -> StoreResult<()> {
        let uuid = *id.as_uuid();

        let mut tx = self.pool.begin().await?;
        UserRole::delete_for_role(&mut tx, uuid).await?;
        let rows = MembershipRole::delete(&mut tx, self.application_id(), uuid).await?;
        if rows == 0 {
            return Err(StoreError::Rejected("role does not exist".to_string()));
        }
        tx.commit().await?;

        tracing::info!(role_id = %id, "deleted role");
        Ok(())
    }
}

#[async_trait]
impl RoleLookup for SqlRoleStore {
    async fn find_by_id(&self, id: RoleId) -> StoreResult<Option<MembershipRole>> {
        SqlRoleStore::find_by_id(self, id).await
    }

    async fn find_by_normalized_name(&self, name: &str) -> StoreResult<Option<MembershipRole>> {
        SqlRoleStore::find_by_normalized_name(self, name).await
    }
}

#[async_trait]
impl RoleWrite for SqlRoleStore {
    async fn create(&self, name: &str, description: Option<&str>) -> StoreResult<MembershipRole> {
        SqlRoleStore::create(self, name, description).await
    }

    async fn update(&self, role: &MembershipRole) -> StoreResult<()> {
        SqlRoleStore::update(self, role).await
    }

    async fn delete(&self, id: RoleId) -> StoreResult<()> {
        SqlRoleStore::delete(self, id).await
    }
}
