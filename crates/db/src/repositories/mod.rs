//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. [`PgLockStore`] instead owns
//! a pool because it implements the lock protocol's store trait.

pub mod project_lock_repo;
pub mod project_repo;
pub mod timeseries_profile_instance_repo;
pub mod timeseries_profile_parser_repo;
pub mod timeseries_profile_repo;

pub use project_lock_repo::{LockCensus, PgLockStore};
pub use project_repo::ProjectRepo;
pub use timeseries_profile_instance_repo::TimeSeriesProfileInstanceRepo;
pub use timeseries_profile_parser_repo::TimeSeriesProfileParserRepo;
pub use timeseries_profile_repo::TimeSeriesProfileRepo;
