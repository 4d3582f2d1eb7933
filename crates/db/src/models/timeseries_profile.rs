//! Time-series profile model and DTOs.

use cda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timeseries_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeSeriesProfile {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub office_id: String,
    pub location_id: String,
    pub key_parameter_id: String,
    pub parameter_list: Vec<String>,
    pub description: Option<String>,
    pub reference_ts_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing a time-series profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateTimeSeriesProfile {
    pub office_id: String,
    pub location_id: String,
    pub key_parameter_id: String,
    pub parameter_list: Vec<String>,
    pub description: Option<String>,
    pub reference_ts_id: Option<String>,
}
