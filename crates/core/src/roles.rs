//! Well-known role name constants.
//!
//! These must match the roles written by `cardvault_db::seed`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
