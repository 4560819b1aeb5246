//! Request extractors guarding the card endpoints.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, from a JWT Bearer token.

pub mod auth;
