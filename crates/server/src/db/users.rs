//! User repository.

use sqlx::SqlitePool;

use evergreen_core::{UserId, UserRole};

use super::{RepositoryError, map_unique_violation};
use crate::models::user::User;

/// Fields for a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub phone: String,
    pub address: String,
}

/// Partial update applied by the admin user-management route.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a user and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: NewUser) -> Result<User, RepositoryError> {
        sqlx::query(
            "INSERT INTO users (username, full_name, email, password_hash, role, phone, address)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.username)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.to_string())
        .bind(&new.phone)
        .bind(&new.address)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username"))?;

        self.get_by_username(&new.username)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// All users, newest first, optionally filtered by role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, role: Option<&str>) -> Result<Vec<User>, RepositoryError> {
        let rows = match role {
            Some(role) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE role = ? ORDER BY created DESC, id DESC",
                )
                .bind(role)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created DESC, id DESC")
                    .fetch_all(self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Apply a partial update and return the fresh row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist,
    /// `RepositoryError::Conflict` if the new username is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError> {
        let current = self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        let username = patch.username.unwrap_or(current.username);
        let password_hash = patch.password_hash.unwrap_or(current.password_hash);
        let phone = patch.phone.unwrap_or(current.phone);

        sqlx::query(
            "UPDATE users
             SET username = ?, password_hash = ?, phone = ?, updated = datetime('now')
             WHERE id = ?",
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(&phone)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username"))?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}
