//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- issuing and verifying HS256 access tokens.

pub mod jwt;
pub mod password;
