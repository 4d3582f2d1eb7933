//! Well-known role name constants.
//!
//! These must match the `role` claim issued in access tokens.

pub const ROLE_ADMIN: &str = "admin";
