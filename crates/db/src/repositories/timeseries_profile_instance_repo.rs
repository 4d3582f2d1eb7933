//! Repository for the `timeseries_profile_instances` table.

use cda_core::error::CoreError;
use cda_core::mask::Mask;
use cda_core::pagination::{Page, PageRequest};
use cda_core::types::Timestamp;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::PgPool;

use crate::error::{is_foreign_key_violation, DbError};
use crate::models::timeseries_profile_instance::{
    CreateTimeSeriesProfileInstance, InstanceKey, TimeSeriesProfileInstance,
};

const COLUMNS: &str = "id, office_id, location_id, key_parameter_id, version_id, \
    version_date, first_date, last_date, created_at, updated_at";

/// `$1` office, `$2` location, `$3` key parameter, `$4` version.
const CATALOG_FILTER: &str = "($1::text IS NULL OR office_id ~ $1)
    AND ($2::text IS NULL OR location_id ~ $2)
    AND ($3::text IS NULL OR key_parameter_id ~ $3)
    AND ($4::text IS NULL OR version_id ~ $4)";

const KEY_FILTER: &str = "office_id = $1 AND location_id = $2 AND key_parameter_id = $3
    AND version_id = $4 AND version_date = $5";

/// Provides store, retrieve, delete and catalog operations for instances.
pub struct TimeSeriesProfileInstanceRepo;

impl TimeSeriesProfileInstanceRepo {
    /// Store an instance. With `fail_if_exists` a duplicate key violates
    /// `uq_timeseries_profile_instances_key`; otherwise the existing row's
    /// time window is replaced. An instance of a profile that does not exist
    /// is a `NotFound`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimeSeriesProfileInstance,
        fail_if_exists: bool,
    ) -> Result<TimeSeriesProfileInstance, DbError> {
        let on_conflict = if fail_if_exists {
            ""
        } else {
            "ON CONFLICT ON CONSTRAINT uq_timeseries_profile_instances_key DO UPDATE SET
                first_date = EXCLUDED.first_date,
                last_date = EXCLUDED.last_date"
        };
        let query = format!(
            "INSERT INTO timeseries_profile_instances (office_id, location_id, key_parameter_id,
                version_id, version_date, first_date, last_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             {on_conflict}
             RETURNING {COLUMNS}"
        );
        let result = sqlx::query_as::<_, TimeSeriesProfileInstance>(&query)
            .bind(&input.office_id)
            .bind(&input.location_id)
            .bind(&input.key_parameter_id)
            .bind(&input.version_id)
            .bind(input.version_date)
            .bind(input.first_date)
            .bind(input.last_date)
            .fetch_one(pool)
            .await;

        match result {
            Ok(instance) => Ok(instance),
            Err(err) if is_foreign_key_violation(&err) => {
                tracing::debug!(
                    office = %input.office_id,
                    location = %input.location_id,
                    parameter = %input.key_parameter_id,
                    "Instance stored for unknown profile"
                );
                Err(CoreError::not_found(
                    "TimeSeriesProfile",
                    &input.office_id,
                    &format!("{}/{}", input.location_id, input.key_parameter_id),
                )
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find(
        pool: &PgPool,
        key: &InstanceKey<'_>,
    ) -> Result<Option<TimeSeriesProfileInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeseries_profile_instances WHERE {KEY_FILTER}");
        sqlx::query_as::<_, TimeSeriesProfileInstance>(&query)
            .bind(key.office_id)
            .bind(key.location_id)
            .bind(key.key_parameter_id)
            .bind(key.version_id)
            .bind(key.version_date)
            .fetch_optional(pool)
            .await
    }

    /// One page of the instance catalog, ordered by
    /// `(office_id, location_id, key_parameter_id, version_id, version_date)`.
    pub async fn catalog(
        pool: &PgPool,
        office: &Mask,
        location: &Mask,
        parameter: &Mask,
        version: &Mask,
        request: &PageRequest,
    ) -> Result<Page<TimeSeriesProfileInstance>, DbError> {
        let after = request.after_key(5)?;
        let after_date = after.map(|k| cursor_date(&k[4])).transpose()?;

        let total = if request.is_first_page() {
            let query =
                format!("SELECT COUNT(*) FROM timeseries_profile_instances WHERE {CATALOG_FILTER}");
            let (count,): (i64,) = sqlx::query_as(&query)
                .bind(office.to_pg_regex())
                .bind(location.to_pg_regex())
                .bind(parameter.to_pg_regex())
                .bind(version.to_pg_regex())
                .fetch_one(pool)
                .await?;
            Some(count)
        } else {
            None
        };

        let query = format!(
            "SELECT {COLUMNS} FROM timeseries_profile_instances
             WHERE {CATALOG_FILTER}
               AND ($5::text IS NULL
                    OR (office_id, location_id, key_parameter_id, version_id, version_date)
                       > ($5, $6, $7, $8, $9))
             ORDER BY office_id, location_id, key_parameter_id, version_id, version_date
             LIMIT $10"
        );
        let rows = sqlx::query_as::<_, TimeSeriesProfileInstance>(&query)
            .bind(office.to_pg_regex())
            .bind(location.to_pg_regex())
            .bind(parameter.to_pg_regex())
            .bind(version.to_pg_regex())
            .bind(after.map(|k| k[0].as_str()))
            .bind(after.map(|k| k[1].as_str()))
            .bind(after.map(|k| k[2].as_str()))
            .bind(after.map(|k| k[3].as_str()))
            .bind(after_date)
            .bind(request.page_size)
            .fetch_all(pool)
            .await?;

        Ok(Page::from_rows(rows, request, total, |i| {
            vec![
                i.office_id.clone(),
                i.location_id.clone(),
                i.key_parameter_id.clone(),
                i.version_id.clone(),
                i.version_date.to_rfc3339_opts(SecondsFormat::Micros, true),
            ]
        }))
    }

    /// Delete an instance. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &InstanceKey<'_>) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM timeseries_profile_instances WHERE {KEY_FILTER}");
        let result = sqlx::query(&query)
            .bind(key.office_id)
            .bind(key.location_id)
            .bind(key.key_parameter_id)
            .bind(key.version_id)
            .bind(key.version_date)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn cursor_date(raw: &str) -> Result<Timestamp, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| CoreError::Validation(format!("Malformed page cursor: {e}")))
}
