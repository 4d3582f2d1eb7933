//! Time-series profile parser model and DTOs.

use cda_core::error::CoreError;
use cda_core::types::{DbId, Timestamp};
use cda_core::validation::{validate_identifier, validate_office_id, validate_parameter_list};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timeseries_profile_parsers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeSeriesProfileParser {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub office_id: String,
    pub location_id: String,
    pub key_parameter_id: String,
    pub record_delimiter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<String>,
    pub time_format: String,
    pub time_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_field: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start_column: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end_column: Option<i32>,
    pub time_in_two_fields: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Where one parameter sits in a record: a field index for indexed parsers,
/// a column range for columnar ones.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterInfo {
    pub parameter_id: String,
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<i32>,
}

/// A parser with its parameters in record order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeSeriesProfileParserWithParameters {
    #[serde(flatten)]
    pub parser: TimeSeriesProfileParser,
    pub parameter_info_list: Vec<ParameterInfo>,
}

/// DTO for storing a parser. With `fail-if-exists=false` it replaces the
/// profile's existing parser and its parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateTimeSeriesProfileParser {
    pub office_id: String,
    pub location_id: String,
    pub key_parameter_id: String,
    pub record_delimiter: String,
    pub field_delimiter: Option<String>,
    pub time_format: String,
    pub time_zone: String,
    pub time_field: Option<i32>,
    pub time_start_column: Option<i32>,
    pub time_end_column: Option<i32>,
    #[serde(default)]
    pub time_in_two_fields: bool,
    pub parameter_info_list: Vec<ParameterInfo>,
}

impl CreateTimeSeriesProfileParser {
    /// Whether the parser splits records on a field delimiter.
    pub fn is_indexed(&self) -> bool {
        self.time_field.is_some()
    }

    /// Check identifiers, delimiters and that the parser is consistently
    /// indexed or columnar.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_office_id(&self.office_id)?;
        validate_identifier("location-id", &self.location_id)?;
        validate_identifier("time-format", &self.time_format)?;
        validate_identifier("time-zone", &self.time_zone)?;
        single_char("record-delimiter", &self.record_delimiter)?;

        let parameters: Vec<String> = self
            .parameter_info_list
            .iter()
            .map(|p| p.parameter_id.clone())
            .collect();
        validate_parameter_list(&self.key_parameter_id, &parameters)?;

        if self.is_indexed() {
            let delimiter = self.field_delimiter.as_deref().ok_or_else(|| {
                CoreError::Validation("An indexed parser needs a field-delimiter".into())
            })?;
            single_char("field-delimiter", delimiter)?;
            if self.time_start_column.is_some() || self.time_end_column.is_some() {
                return Err(CoreError::Validation(
                    "A parser has either a time-field or time columns, not both".into(),
                ));
            }
            positive("time-field", self.time_field)?;
            for info in &self.parameter_info_list {
                if info.start_column.is_some() || info.end_column.is_some() {
                    return Err(CoreError::Validation(format!(
                        "Parameter {} of an indexed parser must not have columns",
                        info.parameter_id
                    )));
                }
                positive("index", info.index).map_err(|_| {
                    CoreError::Validation(format!(
                        "Parameter {} needs an index of at least 1",
                        info.parameter_id
                    ))
                })?;
            }
        } else {
            if self.field_delimiter.is_some() {
                return Err(CoreError::Validation(
                    "A columnar parser must not have a field-delimiter".into(),
                ));
            }
            column_range("time", self.time_start_column, self.time_end_column)?;
            for info in &self.parameter_info_list {
                if info.index.is_some() {
                    return Err(CoreError::Validation(format!(
                        "Parameter {} of a columnar parser must not have an index",
                        info.parameter_id
                    )));
                }
                column_range(&info.parameter_id, info.start_column, info.end_column)?;
            }
        }
        Ok(())
    }
}

fn single_char(field: &str, value: &str) -> Result<(), CoreError> {
    if value.chars().count() == 1 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("{field} must be a single character")))
    }
}

fn positive(field: &str, value: Option<i32>) -> Result<(), CoreError> {
    match value {
        Some(v) if v >= 1 => Ok(()),
        _ => Err(CoreError::Validation(format!("{field} must be at least 1"))),
    }
}

fn column_range(name: &str, start: Option<i32>, end: Option<i32>) -> Result<(), CoreError> {
    match (start, end) {
        (Some(start), Some(end)) if start >= 1 && end >= start => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "{name} needs a start-column of at least 1 and an end-column not before it"
        ))),
    }
}
