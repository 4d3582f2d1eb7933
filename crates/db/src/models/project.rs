//! Project entity model and DTOs.

use cda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub office_id: String,
    pub name: String,
    pub authorizing_law: Option<String>,
    pub project_owner: Option<String>,
    pub hydropower_description: Option<String>,
    pub sedimentation_description: Option<String>,
    pub downstream_urban_description: Option<String>,
    pub bank_full_capacity_description: Option<String>,
    pub pump_back_location_id: Option<String>,
    pub near_gage_location_id: Option<String>,
    pub project_remarks: Option<String>,
    pub federal_cost: Option<f64>,
    pub nonfederal_cost: Option<f64>,
    pub federal_om_cost: Option<f64>,
    pub nonfederal_om_cost: Option<f64>,
    pub cost_year: Option<Timestamp>,
    pub cost_unit: Option<String>,
    pub yield_time_frame_start: Option<Timestamp>,
    pub yield_time_frame_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing a project. With `fail-if-exists=false` it replaces an
/// existing project of the same office and name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateProject {
    pub office_id: String,
    pub name: String,
    pub authorizing_law: Option<String>,
    pub project_owner: Option<String>,
    pub hydropower_description: Option<String>,
    pub sedimentation_description: Option<String>,
    pub downstream_urban_description: Option<String>,
    pub bank_full_capacity_description: Option<String>,
    pub pump_back_location_id: Option<String>,
    pub near_gage_location_id: Option<String>,
    pub project_remarks: Option<String>,
    pub federal_cost: Option<f64>,
    pub nonfederal_cost: Option<f64>,
    pub federal_om_cost: Option<f64>,
    pub nonfederal_om_cost: Option<f64>,
    pub cost_year: Option<Timestamp>,
    pub cost_unit: Option<String>,
    pub yield_time_frame_start: Option<Timestamp>,
    pub yield_time_frame_end: Option<Timestamp>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateProject {
    pub authorizing_law: Option<String>,
    pub project_owner: Option<String>,
    pub hydropower_description: Option<String>,
    pub sedimentation_description: Option<String>,
    pub downstream_urban_description: Option<String>,
    pub bank_full_capacity_description: Option<String>,
    pub pump_back_location_id: Option<String>,
    pub near_gage_location_id: Option<String>,
    pub project_remarks: Option<String>,
    pub federal_cost: Option<f64>,
    pub nonfederal_cost: Option<f64>,
    pub federal_om_cost: Option<f64>,
    pub nonfederal_om_cost: Option<f64>,
    pub cost_year: Option<Timestamp>,
    pub cost_unit: Option<String>,
    pub yield_time_frame_start: Option<Timestamp>,
    pub yield_time_frame_end: Option<Timestamp>,
}

/// How much to remove when deleting a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteMethod {
    /// Remove the project only; refused while locks are held on it.
    #[default]
    DeleteKey,
    /// Remove the project together with its locks.
    DeleteAll,
}
