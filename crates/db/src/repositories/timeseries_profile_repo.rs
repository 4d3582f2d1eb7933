//! Repository for the `timeseries_profiles` table.

use cda_core::mask::Mask;
use cda_core::pagination::{Page, PageRequest};
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::timeseries_profile::{CreateTimeSeriesProfile, TimeSeriesProfile};

const COLUMNS: &str = "id, office_id, location_id, key_parameter_id, parameter_list, \
    description, reference_ts_id, created_at, updated_at";

/// `$1` office, `$2` location, `$3` key parameter.
const CATALOG_FILTER: &str = "($1::text IS NULL OR office_id ~ $1)
    AND ($2::text IS NULL OR location_id ~ $2)
    AND ($3::text IS NULL OR key_parameter_id ~ $3)";

/// Provides store, retrieve, delete and catalog operations for profiles.
pub struct TimeSeriesProfileRepo;

impl TimeSeriesProfileRepo {
    /// Store a profile. With `fail_if_exists` a duplicate key violates
    /// `uq_timeseries_profiles_key`; otherwise the existing row is replaced.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimeSeriesProfile,
        fail_if_exists: bool,
    ) -> Result<TimeSeriesProfile, sqlx::Error> {
        let on_conflict = if fail_if_exists {
            ""
        } else {
            "ON CONFLICT ON CONSTRAINT uq_timeseries_profiles_key DO UPDATE SET
                parameter_list = EXCLUDED.parameter_list,
                description = EXCLUDED.description,
                reference_ts_id = EXCLUDED.reference_ts_id"
        };
        let query = format!(
            "INSERT INTO timeseries_profiles (office_id, location_id, key_parameter_id,
                parameter_list, description, reference_ts_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             {on_conflict}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeSeriesProfile>(&query)
            .bind(&input.office_id)
            .bind(&input.location_id)
            .bind(&input.key_parameter_id)
            .bind(&input.parameter_list)
            .bind(&input.description)
            .bind(&input.reference_ts_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        office_id: &str,
        location_id: &str,
        key_parameter_id: &str,
    ) -> Result<Option<TimeSeriesProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeseries_profiles
             WHERE office_id = $1 AND location_id = $2 AND key_parameter_id = $3"
        );
        sqlx::query_as::<_, TimeSeriesProfile>(&query)
            .bind(office_id)
            .bind(location_id)
            .bind(key_parameter_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of the profile catalog, ordered by
    /// `(office_id, location_id, key_parameter_id)`.
    pub async fn catalog(
        pool: &PgPool,
        office: &Mask,
        location: &Mask,
        parameter: &Mask,
        request: &PageRequest,
    ) -> Result<Page<TimeSeriesProfile>, DbError> {
        let after = request.after_key(3)?;

        let total = if request.is_first_page() {
            let query = format!("SELECT COUNT(*) FROM timeseries_profiles WHERE {CATALOG_FILTER}");
            let (count,): (i64,) = sqlx::query_as(&query)
                .bind(office.to_pg_regex())
                .bind(location.to_pg_regex())
                .bind(parameter.to_pg_regex())
                .fetch_one(pool)
                .await?;
            Some(count)
        } else {
            None
        };

        let query = format!(
            "SELECT {COLUMNS} FROM timeseries_profiles
             WHERE {CATALOG_FILTER}
               AND ($4::text IS NULL
                    OR (office_id, location_id, key_parameter_id) > ($4, $5, $6))
             ORDER BY office_id, location_id, key_parameter_id
             LIMIT $7"
        );
        let rows = sqlx::query_as::<_, TimeSeriesProfile>(&query)
            .bind(office.to_pg_regex())
            .bind(location.to_pg_regex())
            .bind(parameter.to_pg_regex())
            .bind(after.map(|k| k[0].as_str()))
            .bind(after.map(|k| k[1].as_str()))
            .bind(after.map(|k| k[2].as_str()))
            .bind(request.page_size)
            .fetch_all(pool)
            .await?;

        Ok(Page::from_rows(rows, request, total, |p| {
            vec![
                p.office_id.clone(),
                p.location_id.clone(),
                p.key_parameter_id.clone(),
            ]
        }))
    }

    /// Delete a profile. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        office_id: &str,
        location_id: &str,
        key_parameter_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM timeseries_profiles
             WHERE office_id = $1 AND location_id = $2 AND key_parameter_id = $3",
        )
        .bind(office_id)
        .bind(location_id)
        .bind(key_parameter_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
