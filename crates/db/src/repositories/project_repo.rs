//! Repository for the `projects` table.

use cda_core::error::CoreError;
use cda_core::mask::Mask;
use cda_core::pagination::{Page, PageRequest};
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::project::{CreateProject, DeleteMethod, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, office_id, name, authorizing_law, project_owner, \
    hydropower_description, sedimentation_description, downstream_urban_description, \
    bank_full_capacity_description, pump_back_location_id, near_gage_location_id, \
    project_remarks, federal_cost, nonfederal_cost, federal_om_cost, nonfederal_om_cost, \
    cost_year, cost_unit, yield_time_frame_start, yield_time_frame_end, created_at, updated_at";

/// Catalog filter shared by the count and page queries. `$1` office, `$2` name.
const CATALOG_FILTER: &str =
    "($1::text IS NULL OR office_id ~ $1) AND ($2::text IS NULL OR name ~ $2)";

/// Provides CRUD and catalog operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project, returning the stored row.
    ///
    /// With `fail_if_exists` a duplicate `(office_id, name)` violates
    /// `uq_projects_office_name`; otherwise the existing row is replaced.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        fail_if_exists: bool,
    ) -> Result<Project, sqlx::Error> {
        let on_conflict = if fail_if_exists {
            ""
        } else {
            "ON CONFLICT ON CONSTRAINT uq_projects_office_name DO UPDATE SET
                authorizing_law = EXCLUDED.authorizing_law,
                project_owner = EXCLUDED.project_owner,
                hydropower_description = EXCLUDED.hydropower_description,
                sedimentation_description = EXCLUDED.sedimentation_description,
                downstream_urban_description = EXCLUDED.downstream_urban_description,
                bank_full_capacity_description = EXCLUDED.bank_full_capacity_description,
                pump_back_location_id = EXCLUDED.pump_back_location_id,
                near_gage_location_id = EXCLUDED.near_gage_location_id,
                project_remarks = EXCLUDED.project_remarks,
                federal_cost = EXCLUDED.federal_cost,
                nonfederal_cost = EXCLUDED.nonfederal_cost,
                federal_om_cost = EXCLUDED.federal_om_cost,
                nonfederal_om_cost = EXCLUDED.nonfederal_om_cost,
                cost_year = EXCLUDED.cost_year,
                cost_unit = EXCLUDED.cost_unit,
                yield_time_frame_start = EXCLUDED.yield_time_frame_start,
                yield_time_frame_end = EXCLUDED.yield_time_frame_end"
        };
        let query = format!(
            "INSERT INTO projects (office_id, name, authorizing_law, project_owner,
                hydropower_description, sedimentation_description, downstream_urban_description,
                bank_full_capacity_description, pump_back_location_id, near_gage_location_id,
                project_remarks, federal_cost, nonfederal_cost, federal_om_cost,
                nonfederal_om_cost, cost_year, cost_unit, yield_time_frame_start,
                yield_time_frame_end)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19)
             {on_conflict}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.office_id)
            .bind(&input.name)
            .bind(&input.authorizing_law)
            .bind(&input.project_owner)
            .bind(&input.hydropower_description)
            .bind(&input.sedimentation_description)
            .bind(&input.downstream_urban_description)
            .bind(&input.bank_full_capacity_description)
            .bind(&input.pump_back_location_id)
            .bind(&input.near_gage_location_id)
            .bind(&input.project_remarks)
            .bind(input.federal_cost)
            .bind(input.nonfederal_cost)
            .bind(input.federal_om_cost)
            .bind(input.nonfederal_om_cost)
            .bind(input.cost_year)
            .bind(&input.cost_unit)
            .bind(input.yield_time_frame_start)
            .bind(input.yield_time_frame_end)
            .fetch_one(pool)
            .await
    }

    /// Find a project by office and name.
    pub async fn find(
        pool: &PgPool,
        office_id: &str,
        name: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE office_id = $1 AND name = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(office_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// One page of the project catalog, ordered by `(office_id, name)`.
    ///
    /// The total is counted on the first page only; continuation pages carry
    /// it in the cursor.
    pub async fn catalog(
        pool: &PgPool,
        office: &Mask,
        name: &Mask,
        request: &PageRequest,
    ) -> Result<Page<Project>, DbError> {
        let after = request.after_key(2)?;

        let total = if request.is_first_page() {
            let query = format!("SELECT COUNT(*) FROM projects WHERE {CATALOG_FILTER}");
            let (count,): (i64,) = sqlx::query_as(&query)
                .bind(office.to_pg_regex())
                .bind(name.to_pg_regex())
                .fetch_one(pool)
                .await?;
            Some(count)
        } else {
            None
        };

        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE {CATALOG_FILTER}
               AND ($3::text IS NULL OR (office_id, name) > ($3, $4))
             ORDER BY office_id, name
             LIMIT $5"
        );
        let rows = sqlx::query_as::<_, Project>(&query)
            .bind(office.to_pg_regex())
            .bind(name.to_pg_regex())
            .bind(after.map(|k| k[0].as_str()))
            .bind(after.map(|k| k[1].as_str()))
            .bind(request.page_size)
            .fetch_all(pool)
            .await?;

        Ok(Page::from_rows(rows, request, total, |p| {
            vec![p.office_id.clone(), p.name.clone()]
        }))
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no such project exists.
    pub async fn update(
        pool: &PgPool,
        office_id: &str,
        name: &str,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                authorizing_law = COALESCE($3, authorizing_law),
                project_owner = COALESCE($4, project_owner),
                hydropower_description = COALESCE($5, hydropower_description),
                sedimentation_description = COALESCE($6, sedimentation_description),
                downstream_urban_description = COALESCE($7, downstream_urban_description),
                bank_full_capacity_description = COALESCE($8, bank_full_capacity_description),
                pump_back_location_id = COALESCE($9, pump_back_location_id),
                near_gage_location_id = COALESCE($10, near_gage_location_id),
                project_remarks = COALESCE($11, project_remarks),
                federal_cost = COALESCE($12, federal_cost),
                nonfederal_cost = COALESCE($13, nonfederal_cost),
                federal_om_cost = COALESCE($14, federal_om_cost),
                nonfederal_om_cost = COALESCE($15, nonfederal_om_cost),
                cost_year = COALESCE($16, cost_year),
                cost_unit = COALESCE($17, cost_unit),
                yield_time_frame_start = COALESCE($18, yield_time_frame_start),
                yield_time_frame_end = COALESCE($19, yield_time_frame_end)
             WHERE office_id = $1 AND name = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(office_id)
            .bind(name)
            .bind(&input.authorizing_law)
            .bind(&input.project_owner)
            .bind(&input.hydropower_description)
            .bind(&input.sedimentation_description)
            .bind(&input.downstream_urban_description)
            .bind(&input.bank_full_capacity_description)
            .bind(&input.pump_back_location_id)
            .bind(&input.near_gage_location_id)
            .bind(&input.project_remarks)
            .bind(input.federal_cost)
            .bind(input.nonfederal_cost)
            .bind(input.federal_om_cost)
            .bind(input.nonfederal_om_cost)
            .bind(input.cost_year)
            .bind(&input.cost_unit)
            .bind(input.yield_time_frame_start)
            .bind(input.yield_time_frame_end)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project. Returns `true` if a row was removed.
    ///
    /// [`DeleteMethod::DeleteKey`] refuses while the project is locked;
    /// [`DeleteMethod::DeleteAll`] removes its locks too.
    pub async fn delete(
        pool: &PgPool,
        office_id: &str,
        name: &str,
        method: DeleteMethod,
    ) -> Result<bool, DbError> {
        if method == DeleteMethod::DeleteKey {
            let (locked,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (
                    SELECT 1 FROM project_locks WHERE office_id = $1 AND project_id = $2
                 )",
            )
            .bind(office_id)
            .bind(name)
            .fetch_one(pool)
            .await?;
            if locked {
                tracing::debug!(office = %office_id, project = %name, "Refusing to delete locked project");
                return Err(CoreError::Conflict(format!(
                    "Project {office_id}/{name} is locked; use delete-all to remove it with its locks"
                ))
                .into());
            }
        }

        let result = sqlx::query("DELETE FROM projects WHERE office_id = $1 AND name = $2")
            .bind(office_id)
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
