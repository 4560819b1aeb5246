//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity matching its table and a
//! `Deserialize` create DTO for inserts.

pub mod card;
pub mod user;
