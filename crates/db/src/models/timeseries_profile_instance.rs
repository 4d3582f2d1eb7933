//! Time-series profile instance model and DTOs.

use cda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timeseries_profile_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeSeriesProfileInstance {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub office_id: String,
    pub location_id: String,
    pub key_parameter_id: String,
    pub version_id: String,
    pub version_date: Timestamp,
    pub first_date: Timestamp,
    pub last_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing an instance. With `fail-if-exists=false` it replaces the
/// time window of an existing instance with the same key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateTimeSeriesProfileInstance {
    pub office_id: String,
    pub location_id: String,
    pub key_parameter_id: String,
    pub version_id: String,
    pub version_date: Timestamp,
    pub first_date: Timestamp,
    pub last_date: Timestamp,
}

/// Full key of one instance.
#[derive(Debug, Clone)]
pub struct InstanceKey<'a> {
    pub office_id: &'a str,
    pub location_id: &'a str,
    pub key_parameter_id: &'a str,
    pub version_id: &'a str,
    pub version_date: Timestamp,
}
