//! Authentication service
//!
//! Password hashing (argon2) and credential checks against the users table.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{info, warn};

use crate::db::DbPool;
use crate::models::{Role, User};

/// Username of the account seeded on first startup
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

pub struct AuthService {
    pool: DbPool,
}

impl AuthService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Check credentials. Returns the account on success, `None` on unknown
    /// username or wrong password. The two cases are indistinguishable to
    /// callers.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up user")?;

        match user {
            Some(user) if Self::verify_password(password, &user.password_hash) => Ok(Some(user)),
            Some(_) => {
                warn!(username, "failed login attempt");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Seed a super_admin account when the users table is empty.
    ///
    /// Skipped when no bootstrap password is configured; an empty table with
    /// no seed account means nobody can log in, so that case is logged loudly.
    pub async fn ensure_bootstrap_admin(&self, password: Option<&str>) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("failed to count users")?;

        if count > 0 {
            return Ok(());
        }

        let Some(password) = password else {
            warn!("users table is empty and no bootstrap admin password is configured");
            return Ok(());
        };

        let hash = Self::hash_password(password)?;
        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)")
            .bind(BOOTSTRAP_ADMIN_USERNAME)
            .bind(hash)
            .bind(Role::SuperAdmin)
            .execute(&self.pool)
            .await
            .context("failed to create bootstrap admin")?;

        info!(username = BOOTSTRAP_ADMIN_USERNAME, "created bootstrap super_admin account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = AuthService::hash_password("correct horse battery").unwrap();
        assert!(AuthService::verify_password("correct horse battery", &hash));
        assert!(!AuthService::verify_password("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = AuthService::hash_password("same password").unwrap();
        let b = AuthService::hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_hash_never_verifies() {
        assert!(!AuthService::verify_password("anything", "not-a-phc-string"));
    }
}
