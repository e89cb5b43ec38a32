//! User/role association model.
//!
//! A pure join fact with a composite primary key (`"UserId"`, `"RoleId"`).
//! Membership is binary; duplicate pairs are impossible by constraint and
//! the insert is idempotent, which closes the check-then-act race between
//! concurrent adds.

use membership_core::{RoleId, UserId};
use sqlx::FromRow;

/// A user's membership in a role.
#[derive(Debug, Clone, FromRow)]
pub struct UserRole {
    /// The user side of the association.
    pub user_id: uuid::Uuid,

    /// The role side of the association.
    pub role_id: uuid::Uuid,
}

impl UserRole {
    /// Get the user ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.user_id)
    }

    /// Get the role ID as a typed `RoleId`.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        RoleId::from_uuid(self.role_id)
    }

    /// Insert the association if absent.
    ///
    /// Returns 1 when a row was inserted, 0 when the pair already existed.
    pub async fn add(
        pool: &sqlx::PgPool,
        user_id: uuid::Uuid,
        role_id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO "UserRoles" ("UserId", "RoleId")
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remove the association. Returns the number of rows affected.
    pub async fn remove(
        pool: &sqlx::PgPool,
        user_id: uuid::Uuid,
        role_id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM "UserRoles" WHERE "UserId" = $1 AND "RoleId" = $2"#)
            .bind(user_id)
            .bind(role_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Check whether the association exists.
    pub async fn exists(
        pool: &sqlx::PgPool,
        user_id: uuid::Uuid,
        role_id: uuid::Uuid,
    ) -> Result<bool, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM "UserRoles" WHERE "UserId" = $1 AND "RoleId" = $2"#,
        )
        .bind(user_id)
        .bind(role_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Fetch all role names for a user by ID, ordered by role name.
    ///
    /// Tenant-scoped on the role side; the user ID is already tenant-unique.
    pub async fn role_names_for_user(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        user_id: uuid::Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT r."RoleName"
            FROM "UserRoles" ur
            JOIN "Roles" r ON r."RoleId" = ur."RoleId"
            WHERE ur."UserId" = $2 AND r."ApplicationId" = $1
            ORDER BY r."RoleName"
            "#,
        )
        .bind(application_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Fetch all role names for a user by lowered username, ordered by role
    /// name. Tenant-scoped on both the user and the role.
    pub async fn role_names_for_user_name(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        lowered_user_name: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT r."RoleName"
            FROM "Users" u
            JOIN "UserRoles" ur ON ur."UserId" = u."UserId"
            JOIN "Roles" r ON r."RoleId" = ur."RoleId"
            WHERE u."ApplicationId" = $1
              AND u."LoweredUserName" = $2
              AND r."ApplicationId" = $1
            ORDER BY r."RoleName"
            "#,
        )
        .bind(application_id)
        .bind(lowered_user_name)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Fetch the usernames of all members of a role, ordered by username.
    pub async fn user_names_in_role(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        role_id: uuid::Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT u."UserName"
            FROM "UserRoles" ur
            JOIN "Users" u ON u."UserId" = ur."UserId"
            WHERE ur."RoleId" = $2 AND u."ApplicationId" = $1
            ORDER BY u."UserName"
            "#,
        )
        .bind(application_id)
        .bind(role_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Remove all associations for a user. Part of user deletion.
    pub async fn delete_for_user(
        conn: &mut sqlx::PgConnection,
        user_id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM "UserRoles" WHERE "UserId" = $1"#)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Remove all associations for a role. Part of role deletion.
    pub async fn delete_for_role(
        conn: &mut sqlx::PgConnection,
        role_id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM "UserRoles" WHERE "RoleId" = $1"#)
            .bind(role_id)
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
        let assoc = UserRole {
            user_id: uuid::Uuid::new_v4(),
            role_id: uuid::Uuid::new_v4(),
        };
        assert_eq!(*assoc.user_id().as_uuid(), assoc.user_id);
        assert_eq!(*assoc.role_id().as_uuid(), assoc.role_id);
    }
}
