//! Request handlers.
//!
//! Handlers delegate to repositories in `cardvault_db` or to the batch
//! ingestor and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod cards;
