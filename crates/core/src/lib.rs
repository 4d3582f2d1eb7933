//! Domain logic for the CDA water-resource service.
//!
//! Zero I/O: everything here is usable from the repository layer, the HTTP
//! layer, and tests without a database.

pub mod cursor;
pub mod error;
pub mod lock;
pub mod mask;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod validation;
