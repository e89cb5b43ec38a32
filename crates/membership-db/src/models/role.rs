//! Role entity model.

use membership_core::{ApplicationId, RoleId};
use sqlx::FromRow;

const ROLE_SELECT: &str = r#"
SELECT "RoleId" AS id,
       "ApplicationId" AS application_id,
       "RoleName" AS name,
       "LoweredRoleName" AS lowered_name,
       "Description" AS description
FROM "Roles"
"#;

/// A named permission group, scoped to a tenant.
///
/// The lowered name is unique within the tenant and is the form used for
/// lookups.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRole {
    /// Unique identifier for the role (immutable, assigned at creation).
    pub id: uuid::Uuid,

    /// The application (tenant) this role belongs to.
    pub application_id: uuid::Uuid,

    /// Case-preserving display name.
    pub name: String,

    /// Lowercase form of the name, used for uniqueness and lookups.
    pub lowered_name: String,

    /// Free-text description.
    pub description: Option<String>,
}

impl MembershipRole {
    /// Get the role ID as a typed `RoleId`.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        RoleId::from_uuid(self.id)
    }

    /// Get the tenant ID as a typed `ApplicationId`.
    #[must_use]
    pub fn tenant_id(&self) -> ApplicationId {
        ApplicationId::from_uuid(self.application_id)
    }

    /// Find a role by ID within a tenant.
    pub async fn find_by_id(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(r#"{ROLE_SELECT} WHERE "ApplicationId" = $1 AND "RoleId" = $2"#);
        sqlx::query_as(&sql)
            .bind(application_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by lowered name within a tenant.
    ///
    /// Callers are responsible for lowercasing the input.
    pub async fn find_by_lowered_name(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        lowered_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(r#"{ROLE_SELECT} WHERE "ApplicationId" = $1 AND "LoweredRoleName" = $2"#);
        sqlx::query_as(&sql)
            .bind(application_id)
            .bind(lowered_name)
            .fetch_optional(pool)
            .await
    }

    /// Insert the role row. Returns the number of rows affected.
    pub async fn insert(&self, pool: &sqlx::PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO "Roles" ("ApplicationId", "RoleId", "RoleName", "LoweredRoleName", "Description")
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(self.application_id)
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.lowered_name)
        .bind(&self.description)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Rewrite the role's name, lowered name and description.
    ///
    /// Returns the number of rows affected.
    pub async fn update(&self, pool: &sqlx::PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "Roles"
            SET "RoleName" = $3, "LoweredRoleName" = $4, "Description" = $5
            WHERE "ApplicationId" = $1 AND "RoleId" = $2
            "#,
        )
        .bind(self.application_id)
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.lowered_name)
        .bind(&self.description)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete the role row.
    ///
    /// Join cleanup runs first in the same transaction; see the role store.
    pub async fn delete(
        conn: &mut sqlx::PgConnection,
        application_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query(r#"DELETE FROM "Roles" WHERE "ApplicationId" = $1 AND "RoleId" = $2"#)
                .bind(application_id)
                .bind(id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_id_conversions() {
        let role = MembershipRole {
            id: uuid::Uuid::new_v4(),
            application_id: uuid::Uuid::new_v4(),
            name: "Editors".to_string(),
            lowered_name: "editors".to_string(),
            description: None,
        };
        assert_eq!(*role.role_id().as_uuid(), role.id);
        assert_eq!(*role.tenant_id().as_uuid(), role.application_id);
    }
}
