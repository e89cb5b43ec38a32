//! User entity model.
//!
//! A membership user spans two legacy tables: `"Users"` (identity) and
//! `"Credentials"` (credential and account bookkeeping, 1:1 with `"Users"`).
//! The model presents the joined row and owns the SQL that keeps both tables
//! consistent.

use chrono::{DateTime, Utc};
use membership_core::{ApplicationId, PasswordFormat, UserId};
use sqlx::FromRow;

/// Shared column list for the Users/Credentials join.
///
/// The legacy schema uses quoted mixed-case identifiers; aliases map them
/// onto the field names `FromRow` expects.
const USER_SELECT: &str = r#"
SELECT u."UserId" AS id,
       u."ApplicationId" AS application_id,
       u."UserName" AS user_name,
       u."LoweredUserName" AS lowered_user_name,
       c."Password" AS password,
       c."PasswordSalt" AS password_salt,
       c."PasswordFormat" AS password_format,
       c."Email" AS email,
       c."LoweredEmail" AS lowered_email,
       c."PasswordQuestion" AS password_question,
       c."PasswordAnswer" AS password_answer,
       c."IsApproved" AS is_approved,
       c."IsLockedOut" AS is_locked_out,
       c."CreateDate" AS create_date,
       c."LastLoginDate" AS last_login_date,
       c."LastPasswordChangedDate" AS last_password_changed_date,
       c."LastLockoutDate" AS last_lockout_date,
       c."FailedPasswordAttemptCount" AS failed_password_attempt_count,
       c."FailedPasswordAttemptWindowStart" AS failed_password_attempt_window_start,
       c."FailedPasswordAnswerAttemptCount" AS failed_password_answer_attempt_count,
       c."FailedPasswordAnswerAttemptWindowStart" AS failed_password_answer_attempt_window_start,
       c."Comment" AS comment
FROM "Users" u
JOIN "Credentials" c ON c."UserId" = u."UserId"
"#;

/// A principal in the membership schema, joined across both tables.
///
/// The lowered username and lowered email are unique within a tenant
/// (`"ApplicationId"`); the identifier is globally unique and never reused.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipUser {
    /// Unique identifier for the user (immutable, assigned at creation).
    pub id: uuid::Uuid,

    /// The application (tenant) this user belongs to.
    pub application_id: uuid::Uuid,

    /// Case-preserving username.
    pub user_name: String,

    /// Lowercase form of the username, used for uniqueness and lookups.
    pub lowered_user_name: String,

    /// Stored credential digest. Plaintext when the format tag is 0.
    pub password: String,

    /// Base64-encoded credential salt.
    pub password_salt: String,

    /// Raw credential format tag (0 = plain, 1 = PBKDF2-SHA256).
    pub password_format: i32,

    /// User's email address (lowered form unique within tenant).
    pub email: Option<String>,

    /// Lowercase form of the email, used for uniqueness checks.
    pub lowered_email: Option<String>,

    /// Security question for the question/answer reset flow.
    pub password_question: Option<String>,

    /// Stored security answer (matched case-insensitively).
    pub password_answer: Option<String>,

    /// Whether the account has been approved for sign-in.
    pub is_approved: bool,

    /// Whether the account is locked out.
    pub is_locked_out: bool,

    /// When the account was created.
    pub create_date: DateTime<Utc>,

    /// Most recent successful login (sentinel when never).
    pub last_login_date: DateTime<Utc>,

    /// Most recent password change (sentinel when never).
    pub last_password_changed_date: DateTime<Utc>,

    /// Most recent lockout (sentinel when never).
    pub last_lockout_date: DateTime<Utc>,

    /// Consecutive failed password attempts in the current window.
    pub failed_password_attempt_count: i32,

    /// Start of the failed-password attempt window (sentinel when never).
    pub failed_password_attempt_window_start: DateTime<Utc>,

    /// Consecutive failed security-answer attempts in the current window.
    pub failed_password_answer_attempt_count: i32,

    /// Start of the failed-answer attempt window (sentinel when never).
    pub failed_password_answer_attempt_window_start: DateTime<Utc>,

    /// Free-text administrative comment.
    pub comment: Option<String>,
}

/// Attributes supplied by the caller when creating a user.
///
/// Identifier, salt and digest are generated by the store, never supplied.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Case-preserving username; must not be blank.
    pub user_name: String,

    /// Plaintext password; hashed per tenant configuration before storage.
    pub password: String,

    /// Optional email address.
    pub email: Option<String>,

    /// Optional security question.
    pub password_question: Option<String>,

    /// Optional security answer.
    pub password_answer: Option<String>,

    /// Whether the account starts approved.
    pub is_approved: bool,

    /// Free-text administrative comment.
    pub comment: Option<String>,
}

impl MembershipUser {
    /// Get the user ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }

    /// Get the tenant ID as a typed `ApplicationId`.
    #[must_use]
    pub fn tenant_id(&self) -> ApplicationId {
        ApplicationId::from_uuid(self.application_id)
    }

    /// Parse the credential format tag.
    ///
    /// `None` when the row carries an unsupported tag; such rows must never
    /// verify as a match.
    #[must_use]
    pub fn credential_format(&self) -> Option<PasswordFormat> {
        PasswordFormat::from_tag(self.password_format)
    }

    /// Check whether the user has a security question/answer pair on file.
    #[must_use]
    pub fn has_security_question(&self) -> bool {
        self.password_question.is_some() && self.password_answer.is_some()
    }

    /// Find a user by ID within a tenant.
    pub async fn find_by_id(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(r#"{USER_SELECT} WHERE u."ApplicationId" = $1 AND u."UserId" = $2"#);
        sqlx::query_as(&sql)
            .bind(application_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by lowered username within a tenant.
    ///
    /// Callers are responsible for lowercasing the input.
    pub async fn find_by_lowered_name(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        lowered_user_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql =
            format!(r#"{USER_SELECT} WHERE u."ApplicationId" = $1 AND u."LoweredUserName" = $2"#);
        sqlx::query_as(&sql)
            .bind(application_id)
            .bind(lowered_user_name)
            .fetch_optional(pool)
            .await
    }

    /// Insert the identity and credential rows.
    ///
    /// Two statements; must run inside the caller's transaction so that both
    /// rows land or neither does.
    pub async fn insert(&self, conn: &mut sqlx::PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO "Users" ("ApplicationId", "UserId", "UserName", "LoweredUserName")
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(self.application_id)
        .bind(self.id)
        .bind(&self.user_name)
        .bind(&self.lowered_user_name)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO "Credentials" (
                "ApplicationId", "UserId", "Password", "PasswordSalt", "PasswordFormat",
                "Email", "LoweredEmail", "PasswordQuestion", "PasswordAnswer",
                "IsApproved", "IsLockedOut",
                "CreateDate", "LastLoginDate", "LastPasswordChangedDate", "LastLockoutDate",
                "FailedPasswordAttemptCount", "FailedPasswordAttemptWindowStart",
                "FailedPasswordAnswerAttemptCount", "FailedPasswordAnswerAttemptWindowStart",
                "Comment"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(self.application_id)
        .bind(self.id)
        .bind(&self.password)
        .bind(&self.password_salt)
        .bind(self.password_format)
        .bind(&self.email)
        .bind(&self.lowered_email)
        .bind(&self.password_question)
        .bind(&self.password_answer)
        .bind(self.is_approved)
        .bind(self.is_locked_out)
        .bind(self.create_date)
        .bind(self.last_login_date)
        .bind(self.last_password_changed_date)
        .bind(self.last_lockout_date)
        .bind(self.failed_password_attempt_count)
        .bind(self.failed_password_attempt_window_start)
        .bind(self.failed_password_answer_attempt_count)
        .bind(self.failed_password_answer_attempt_window_start)
        .bind(&self.comment)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Rewrite the identity row (username and its lowered form).
    ///
    /// Returns the number of rows affected.
    pub async fn update_identity(&self, conn: &mut sqlx::PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "Users"
            SET "UserName" = $3, "LoweredUserName" = $4
            WHERE "ApplicationId" = $1 AND "UserId" = $2
            "#,
        )
        .bind(self.application_id)
        .bind(self.id)
        .bind(&self.user_name)
        .bind(&self.lowered_user_name)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Rewrite the credential row.
    ///
    /// Returns the number of rows affected.
    pub async fn update_credentials(
        &self,
        conn: &mut sqlx::PgConnection,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "Credentials"
            SET "Password" = $3,
                "PasswordSalt" = $4,
                "PasswordFormat" = $5,
                "Email" = $6,
                "LoweredEmail" = $7,
                "PasswordQuestion" = $8,
                "PasswordAnswer" = $9,
                "IsApproved" = $10,
                "IsLockedOut" = $11,
                "LastLoginDate" = $12,
                "LastPasswordChangedDate" = $13,
                "LastLockoutDate" = $14,
                "FailedPasswordAttemptCount" = $15,
                "FailedPasswordAttemptWindowStart" = $16,
                "FailedPasswordAnswerAttemptCount" = $17,
                "FailedPasswordAnswerAttemptWindowStart" = $18,
                "Comment" = $19
            WHERE "ApplicationId" = $1 AND "UserId" = $2
            "#,
        )
        .bind(self.application_id)
        .bind(self.id)
        .bind(&self.password)
        .bind(&self.password_salt)
        .bind(self.password_format)
        .bind(&self.email)
        .bind(&self.lowered_email)
        .bind(&self.password_question)
        .bind(&self.password_answer)
        .bind(self.is_approved)
        .bind(self.is_locked_out)
        .bind(self.last_login_date)
        .bind(self.last_password_changed_date)
        .bind(self.last_lockout_date)
        .bind(self.failed_password_attempt_count)
        .bind(self.failed_password_attempt_window_start)
        .bind(self.failed_password_answer_attempt_count)
        .bind(self.failed_password_answer_attempt_window_start)
        .bind(&self.comment)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete the credential row for a user.
    pub async fn delete_credentials(
        conn: &mut sqlx::PgConnection,
        application_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query(r#"DELETE FROM "Credentials" WHERE "ApplicationId" = $1 AND "UserId" = $2"#)
                .bind(application_id)
                .bind(id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected())
    }

    /// Delete the identity row for a user.
    pub async fn delete_identity(
        conn: &mut sqlx::PgConnection,
        application_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query(r#"DELETE FROM "Users" WHERE "ApplicationId" = $1 AND "UserId" = $2"#)
                .bind(application_id)
                .bind(id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected())
    }

    /// Replace a user's credential material in a single statement.
    pub async fn update_password(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        id: uuid::Uuid,
        password: &str,
        password_salt: &str,
        password_format: i32,
        changed_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "Credentials"
            SET "Password" = $3,
                "PasswordSalt" = $4,
                "PasswordFormat" = $5,
                "LastPasswordChangedDate" = $6
            WHERE "ApplicationId" = $1 AND "UserId" = $2
            "#,
        )
        .bind(application_id)
        .bind(id)
        .bind(password)
        .bind(password_salt)
        .bind(password_format)
        .bind(changed_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clear the lockout flag and all failure bookkeeping for a user,
    /// resetting window starts and the lockout date to `sentinel`.
    ///
    /// Single statement; keyed by lowered username.
    pub async fn unlock(
        pool: &sqlx::PgPool,
        application_id: uuid::Uuid,
        lowered_user_name: &str,
        sentinel: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "Credentials" c
            SET "IsLockedOut" = FALSE,
                "FailedPasswordAttemptCount" = 0,
                "FailedPasswordAnswerAttemptCount" = 0,
                "FailedPasswordAttemptWindowStart" = $3,
                "FailedPasswordAnswerAttemptWindowStart" = $3,
                "LastLockoutDate" = $3
            FROM "Users" u
            WHERE u."UserId" = c."UserId"
              AND u."ApplicationId" = $1
              AND u."LoweredUserName" = $2
            "#,
        )
        .bind(application_id)
        .bind(lowered_user_name)
        .bind(sentinel)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::never_date;

    fn sample_user() -> MembershipUser {
        MembershipUser {
            id: uuid::Uuid::new_v4(),
            application_id: uuid::Uuid::new_v4(),
            user_name: "Alice".to_string(),
            lowered_user_name: "alice".to_string(),
            password: "digest".to_string(),
            password_salt: "c2FsdA==".to_string(),
            password_format: 1,
            email: Some("Alice@Example.com".to_string()),
            lowered_email: Some("alice@example.com".to_string()),
            password_question: None,
            password_answer: None,
            is_approved: true,
            is_locked_out: false,
            create_date: Utc::now(),
            last_login_date: never_date(),
            last_password_changed_date: never_date(),
            last_lockout_date: never_date(),
            failed_password_attempt_count: 0,
            failed_password_attempt_window_start: never_date(),
            failed_password_answer_attempt_count: 0,
            failed_password_answer_attempt_window_start: never_date(),
            comment: None,
        }
    }

    #[test]
    fn test_typed_id_conversions() {
        let user = sample_user();
        assert_eq!(*user.user_id().as_uuid(), user.id);
        assert_eq!(*user.tenant_id().as_uuid(), user.application_id);
    }

    #[test]
    fn test_credential_format_parsing() {
        let mut user = sample_user();
        assert_eq!(
            user.credential_format(),
            Some(PasswordFormat::Pbkdf2Sha256)
        );

        user.password_format = 0;
        assert_eq!(user.credential_format(), Some(PasswordFormat::Plain));

        // Unsupported tags must fail closed
        user.password_format = 7;
        assert_eq!(user.credential_format(), None);
    }

    #[test]
    fn test_has_security_question() {
        let mut user = sample_user();
        assert!(!user.has_security_question());

        user.password_question = Some("First pet?".to_string());
        assert!(!user.has_security_question());

        user.password_answer = Some("Rex".to_string());
        assert!(user.has_security_question());
    }
}
