//! Default account seeding for fresh databases.

use cardvault_core::roles::{ROLE_ADMIN, ROLE_USER};

use crate::models::user::CreateUser;
use crate::repositories::UserRepo;
use crate::DbPool;

/// An account created on first start.
#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub role: &'static str,
}

/// Accounts created when the `users` table is empty.
pub const DEFAULT_USERS: [SeedUser; 2] = [
    SeedUser {
        username: "admin",
        email: "admin@cardvault.local",
        password: "admin123",
        role: ROLE_ADMIN,
    },
    SeedUser {
        username: "user",
        email: "user@cardvault.local",
        password: "user123",
        role: ROLE_USER,
    },
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to hash password for '{username}': {message}")]
    Hash { username: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create [`DEFAULT_USERS`] if no user exists yet.
///
/// `hash_password` turns a plaintext password into the stored hash. Returns
/// the number of accounts created, which is zero on any database that
/// already has users.
pub async fn seed_default_users<F, E>(pool: &DbPool, hash_password: F) -> Result<usize, SeedError>
where
    F: Fn(&str) -> Result<String, E>,
    E: std::fmt::Display,
{
    if UserRepo::count(pool).await? > 0 {
        tracing::debug!("Users already present, skipping default account seeding");
        return Ok(0);
    }

    for seed in &DEFAULT_USERS {
        let password_hash = hash_password(seed.password).map_err(|e| SeedError::Hash {
            username: seed.username.to_string(),
            message: e.to_string(),
        })?;
        let input = CreateUser {
            username: seed.username.to_string(),
            email: seed.email.to_string(),
            password_hash,
            role: seed.role.to_string(),
        };
        UserRepo::create(pool, &input).await?;
        tracing::info!(username = seed.username, role = seed.role, "Seeded default account");
    }

    Ok(DEFAULT_USERS.len())
}
