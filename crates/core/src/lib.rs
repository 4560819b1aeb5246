//! Domain types and rules for the card vault: card number validation,
//! batch file parsing, and batch ingestion over a pluggable store.

pub mod batch_file;
pub mod card;
pub mod error;
pub mod ingest;
pub mod roles;
pub mod types;
