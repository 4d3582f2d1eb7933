//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) where updates exist

pub mod project;
pub mod project_lock;
pub mod timeseries_profile;
pub mod timeseries_profile_instance;
pub mod timeseries_profile_parser;
