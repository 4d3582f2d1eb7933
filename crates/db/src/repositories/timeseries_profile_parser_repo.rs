//! Repository for the `timeseries_profile_parsers` and
//! `timeseries_profile_parser_parameters` tables.

use std::collections::HashMap;

use cda_core::error::CoreError;
use cda_core::mask::Mask;
use cda_core::pagination::{Page, PageRequest};
use cda_core::types::DbId;
use sqlx::{FromRow, PgPool};

use crate::error::{is_foreign_key_violation, DbError};
use crate::models::timeseries_profile_parser::{
    CreateTimeSeriesProfileParser, ParameterInfo, TimeSeriesProfileParser,
    TimeSeriesProfileParserWithParameters,
};

const COLUMNS: &str = "id, office_id, location_id, key_parameter_id, record_delimiter, \
    field_delimiter, time_format, time_zone, time_field, time_start_column, time_end_column, \
    time_in_two_fields, created_at, updated_at";

const PARAMETER_COLUMNS: &str = "parser_id, parameter_id, unit, field_index AS \"index\", \
    start_column, end_column";

/// `$1` office, `$2` location, `$3` key parameter.
const CATALOG_FILTER: &str = "($1::text IS NULL OR office_id ~ $1)
    AND ($2::text IS NULL OR location_id ~ $2)
    AND ($3::text IS NULL OR key_parameter_id ~ $3)";

#[derive(FromRow)]
struct ParameterInfoRow {
    parser_id: DbId,
    #[sqlx(flatten)]
    info: ParameterInfo,
}

/// Provides store, retrieve, delete and catalog operations for parsers.
pub struct TimeSeriesProfileParserRepo;

impl TimeSeriesProfileParserRepo {
    /// Store a parser and its parameters.
    ///
    /// With `fail_if_exists` a second parser for the same profile violates
    /// `uq_timeseries_profile_parsers_key`; otherwise it replaces the stored
    /// parser and all of its parameters. A parser for a profile that does not
    /// exist is a `NotFound`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimeSeriesProfileParser,
        fail_if_exists: bool,
    ) -> Result<TimeSeriesProfileParserWithParameters, DbError> {
        let mut tx = pool.begin().await?;

        let on_conflict = if fail_if_exists {
            ""
        } else {
            "ON CONFLICT ON CONSTRAINT uq_timeseries_profile_parsers_key DO UPDATE SET
                record_delimiter = EXCLUDED.record_delimiter,
                field_delimiter = EXCLUDED.field_delimiter,
                time_format = EXCLUDED.time_format,
                time_zone = EXCLUDED.time_zone,
                time_field = EXCLUDED.time_field,
                time_start_column = EXCLUDED.time_start_column,
                time_end_column = EXCLUDED.time_end_column,
                time_in_two_fields = EXCLUDED.time_in_two_fields"
        };
        let query = format!(
            "INSERT INTO timeseries_profile_parsers (office_id, location_id, key_parameter_id,
                record_delimiter, field_delimiter, time_format, time_zone, time_field,
                time_start_column, time_end_column, time_in_two_fields)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             {on_conflict}
             RETURNING {COLUMNS}"
        );
        let result = sqlx::query_as::<_, TimeSeriesProfileParser>(&query)
            .bind(&input.office_id)
            .bind(&input.location_id)
            .bind(&input.key_parameter_id)
            .bind(&input.record_delimiter)
            .bind(&input.field_delimiter)
            .bind(&input.time_format)
            .bind(&input.time_zone)
            .bind(input.time_field)
            .bind(input.time_start_column)
            .bind(input.time_end_column)
            .bind(input.time_in_two_fields)
            .fetch_one(&mut *tx)
            .await;

        let parser = match result {
            Ok(parser) => parser,
            Err(err) if is_foreign_key_violation(&err) => {
                tracing::debug!(
                    office = %input.office_id,
                    location = %input.location_id,
                    parameter = %input.key_parameter_id,
                    "Parser stored for unknown profile"
                );
                return Err(CoreError::not_found(
                    "TimeSeriesProfile",
                    &input.office_id,
                    &format!("{}/{}", input.location_id, input.key_parameter_id),
                )
                .into());
            }
            Err(err) => return Err(err.into()),
        };

        Self::set_parameters_inner(&mut tx, parser.id, &input.parameter_info_list).await?;
        tx.commit().await?;

        Ok(TimeSeriesProfileParserWithParameters {
            parser,
            parameter_info_list: input.parameter_info_list.clone(),
        })
    }

    pub async fn find(
        pool: &PgPool,
        office_id: &str,
        location_id: &str,
        key_parameter_id: &str,
    ) -> Result<Option<TimeSeriesProfileParserWithParameters>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeseries_profile_parsers
             WHERE office_id = $1 AND location_id = $2 AND key_parameter_id = $3"
        );
        let parser = sqlx::query_as::<_, TimeSeriesProfileParser>(&query)
            .bind(office_id)
            .bind(location_id)
            .bind(key_parameter_id)
            .fetch_optional(pool)
            .await?;

        match parser {
            Some(parser) => {
                let mut with = Self::with_parameters(pool, vec![parser]).await?;
                Ok(with.pop())
            }
            None => Ok(None),
        }
    }

    /// One page of the parser catalog, ordered by
    /// `(office_id, location_id, key_parameter_id)`.
    pub async fn catalog(
        pool: &PgPool,
        office: &Mask,
        location: &Mask,
        parameter: &Mask,
        request: &PageRequest,
    ) -> Result<Page<TimeSeriesProfileParserWithParameters>, DbError> {
        let after = request.after_key(3)?;

        let total = if request.is_first_page() {
            let query =
                format!("SELECT COUNT(*) FROM timeseries_profile_parsers WHERE {CATALOG_FILTER}");
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
            "SELECT {COLUMNS} FROM timeseries_profile_parsers
             WHERE {CATALOG_FILTER}
               AND ($4::text IS NULL
                    OR (office_id, location_id, key_parameter_id) > ($4, $5, $6))
             ORDER BY office_id, location_id, key_parameter_id
             LIMIT $7"
        );
        let parsers = sqlx::query_as::<_, TimeSeriesProfileParser>(&query)
            .bind(office.to_pg_regex())
            .bind(location.to_pg_regex())
            .bind(parameter.to_pg_regex())
            .bind(after.map(|k| k[0].as_str()))
            .bind(after.map(|k| k[1].as_str()))
            .bind(after.map(|k| k[2].as_str()))
            .bind(request.page_size)
            .fetch_all(pool)
            .await?;

        let rows = Self::with_parameters(pool, parsers).await?;
        Ok(Page::from_rows(rows, request, total, |p| {
            vec![
                p.parser.office_id.clone(),
                p.parser.location_id.clone(),
                p.parser.key_parameter_id.clone(),
            ]
        }))
    }

    /// Delete a parser and its parameters. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        office_id: &str,
        location_id: &str,
        key_parameter_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM timeseries_profile_parsers
             WHERE office_id = $1 AND location_id = $2 AND key_parameter_id = $3",
        )
        .bind(office_id)
        .bind(location_id)
        .bind(key_parameter_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Attach parameters to `parsers` with one query, keeping parser order.
    async fn with_parameters(
        pool: &PgPool,
        parsers: Vec<TimeSeriesProfileParser>,
    ) -> Result<Vec<TimeSeriesProfileParserWithParameters>, sqlx::Error> {
        if parsers.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = parsers.iter().map(|p| p.id).collect();
        let query = format!(
            "SELECT {PARAMETER_COLUMNS} FROM timeseries_profile_parser_parameters
             WHERE parser_id = ANY($1)
             ORDER BY parser_id, position"
        );
        let rows = sqlx::query_as::<_, ParameterInfoRow>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_parser: HashMap<DbId, Vec<ParameterInfo>> = HashMap::new();
        for row in rows {
            by_parser.entry(row.parser_id).or_default().push(row.info);
        }

        Ok(parsers
            .into_iter()
            .map(|parser| TimeSeriesProfileParserWithParameters {
                parameter_info_list: by_parser.remove(&parser.id).unwrap_or_default(),
                parser,
            })
            .collect())
    }

    /// Replace a parser's parameters within an existing transaction.
    async fn set_parameters_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        parser_id: DbId,
        parameters: &[ParameterInfo],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM timeseries_profile_parser_parameters WHERE parser_id = $1")
            .bind(parser_id)
            .execute(&mut **tx)
            .await?;

        let ids: Vec<&str> = parameters.iter().map(|p| p.parameter_id.as_str()).collect();
        let units: Vec<Option<&str>> = parameters.iter().map(|p| p.unit.as_deref()).collect();
        let indexes: Vec<Option<i32>> = parameters.iter().map(|p| p.index).collect();
        let starts: Vec<Option<i32>> = parameters.iter().map(|p| p.start_column).collect();
        let ends: Vec<Option<i32>> = parameters.iter().map(|p| p.end_column).collect();

        sqlx::query(
            "INSERT INTO timeseries_profile_parser_parameters
                (parser_id, position, parameter_id, unit, field_index, start_column, end_column)
             SELECT $1, p.ord, p.parameter_id, p.unit, p.field_index, p.start_column, p.end_column
             FROM UNNEST($2::text[], $3::text[], $4::int[], $5::int[], $6::int[])
                  WITH ORDINALITY AS p(parameter_id, unit, field_index, start_column, end_column, ord)",
        )
        .bind(parser_id)
        .bind(&ids)
        .bind(&units)
        .bind(&indexes)
        .bind(&starts)
        .bind(&ends)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
