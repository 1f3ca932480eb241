//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` input DTO for writes
//! - A validated field set that the repository binds

pub mod project;
