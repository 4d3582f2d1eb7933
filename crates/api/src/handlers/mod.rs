pub mod lock_revoker_rights;
pub mod project;
pub mod project_lock;
pub mod timeseries_profile;
pub mod timeseries_profile_instance;
pub mod timeseries_profile_parser;
