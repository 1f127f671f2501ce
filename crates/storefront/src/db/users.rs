//! User repository for profiles, password hashes and roles.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use essence_core::{AppRole, Email, UserId};

use super::RepositoryError;
use crate::models::{Profile, UserWithRole};

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            full_name: row.full_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRoleRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
    role: Option<AppRole>,
}

/// Stored password hash for a login attempt.
#[derive(Debug, sqlx::FromRow)]
pub struct PasswordRecord {
    pub user_id: Uuid,
    pub password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a profile together with its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create_with_password(
        &self,
        email: &Email,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO profiles (email, full_name)
            VALUES ($1, $2)
            RETURNING id, email, full_name, created_at
            ",
        )
        .bind(email.as_str())
        .bind(full_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "account"))?;

        sqlx::query("INSERT INTO user_password (user_id, password_hash) VALUES ($1, $2)")
            .bind(row.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Profile::try_from(row)
    }

    /// Look up the password hash for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<PasswordRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, PasswordRecord>(
            r"
            SELECT p.id AS user_id, up.password_hash
            FROM profiles p
            JOIN user_password up ON up.user_id = p.id
            WHERE p.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Get a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, full_name, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Get a profile by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, full_name, created_at FROM profiles WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// A user's role. Users without a role row are plain users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role(&self, user_id: UserId) -> Result<AppRole, RepositoryError> {
        let role: Option<AppRole> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(role.unwrap_or_default())
    }

    /// Every profile with its role, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_with_roles(&self) -> Result<Vec<UserWithRole>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRoleRow>(
            r"
            SELECT p.id, p.email, p.full_name, p.created_at, r.role
            FROM profiles p
            LEFT JOIN user_roles r ON r.user_id = p.id
            ORDER BY p.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let role = row.role.unwrap_or_default();
                let profile = Profile::try_from(ProfileRow {
                    id: row.id,
                    email: row.email,
                    full_name: row.full_name,
                    created_at: row.created_at,
                })?;
                Ok(UserWithRole { profile, role })
            })
            .collect()
    }

    /// Replace a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_role(&self, user_id: UserId, role: AppRole) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
