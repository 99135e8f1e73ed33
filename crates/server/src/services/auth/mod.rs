//! Authentication service.
//!
//! Password registration and login on top of the user repository. Token
//! issuance is a separate concern, see [`crate::services::token`].

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use evergreen_core::{Email, UserRole};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::user::User;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer account.
    ///
    /// Username and email are trimmed and lowercased. The full name is
    /// derived from the username; the role is always customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` on an empty username,
    /// `AuthError::InvalidEmail` on a malformed email,
    /// `AuthError::UsernameTaken` / `AuthError::EmailTaken` on duplicates.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let email = Email::parse(email)?;

        if self.users.get_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.get_by_email(email.as_str()).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;
        let full_name = title_case(&username);

        let user = self
            .users
            .create(NewUser {
                username,
                full_name,
                email: email.into_inner(),
                password_hash,
                role: UserRole::Customer,
                phone: phone.trim().to_owned(),
                address: String::new(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password; the two cases are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim().to_lowercase();

        let user = self
            .users
            .get_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

/// Hash a password with argon2 and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// An unparseable stored hash verifies as false rather than erroring.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Uppercase the first character of each whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
