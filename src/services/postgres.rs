use crate::core::store::{MatchStore, ProjectStore, StoreError, VendorStore};
use crate::models::{Match, Project, ProjectStatus, UpsertOutcome, Vendor};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

const PROJECT_COLUMNS: &str =
    "id, client_id, country, services_needed, budget, status, created_at, updated_at";

const VENDOR_COLUMNS: &str = "id, name, countries_supported, services_offered, rating, \
     response_sla_hours, created_at, updated_at";

const MATCH_COLUMNS: &str = "id, project_id, vendor_id, score, created_at, updated_at";

/// PostgreSQL-backed project, vendor and match stores
///
/// Country and service sets live in `TEXT[]` columns, so eligibility is
/// exact membership (`= ANY`) and array overlap (`&&`), never `LIKE`.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(db_err.message().to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            StoreError::InvalidData(db_err.message().to_string())
        }
        other => StoreError::Database(other),
    }
}

fn project_from_row(row: &PgRow) -> Result<Project, StoreError> {
    Ok(Project {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        country: row.try_get("country")?,
        services_needed: row.try_get("services_needed")?,
        budget: row.try_get("budget")?,
        status: row.try_get::<ProjectStatus, _>("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn vendor_from_row(row: &PgRow) -> Result<Vendor, StoreError> {
    let countries: Vec<String> = row.try_get("countries_supported")?;
    let services: Vec<String> = row.try_get("services_offered")?;

    Ok(Vendor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        countries_supported: countries.into_iter().collect(),
        services_offered: services.into_iter().collect(),
        rating: row.try_get("rating")?,
        response_sla_hours: row.try_get("response_sla_hours")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    Ok(Match {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        vendor_id: row.try_get("vendor_id")?,
        score: row.try_get("score")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ProjectStore for PostgresClient {
    async fn get_by_id(&self, id: i64) -> Result<Option<Project>, StoreError> {
        let query = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Project>, StoreError> {
        let query = format!(
            "SELECT {} FROM projects WHERE status = $1 ORDER BY id",
            PROJECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(ProjectStatus::Active)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(project_from_row).collect()
    }
}

#[async_trait]
impl VendorStore for PostgresClient {
    async fn find_by_country_and_services(
        &self,
        country: &str,
        services: &[String],
    ) -> Result<Vec<Vendor>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM vendors
            WHERE $1 = ANY(countries_supported)
              AND services_offered && $2
            ORDER BY id
            "#,
            VENDOR_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(country)
            .bind(services)
            .fetch_all(&self.pool)
            .await?;

        let vendors: Result<Vec<Vendor>, _> = rows.iter().map(vendor_from_row).collect();

        tracing::debug!("Vendor query for {} returned {} rows", country, rows.len());

        vendors
    }
}

#[async_trait]
impl MatchStore for PostgresClient {
    async fn find_by_project_and_vendor(
        &self,
        project_id: i64,
        vendor_id: i64,
    ) -> Result<Option<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches WHERE project_id = $1 AND vendor_id = $2",
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(project_id)
            .bind(vendor_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    /// Uses INSERT ... ON CONFLICT so concurrent rebuilds never create a
    /// second row. `xmax = 0` only holds for a freshly inserted tuple.
    async fn upsert(
        &self,
        project_id: i64,
        vendor_id: i64,
        score: Decimal,
    ) -> Result<UpsertOutcome, StoreError> {
        let query = format!(
            r#"
            INSERT INTO matches (project_id, vendor_id, score, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (project_id, vendor_id)
            DO UPDATE SET
                score = EXCLUDED.score,
                updated_at = NOW()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(project_id)
            .bind(vendor_id)
            .bind(score)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let record = match_from_row(&row)?;
        let inserted: bool = row.try_get("inserted")?;

        if inserted {
            Ok(UpsertOutcome::Created(record))
        } else {
            Ok(UpsertOutcome::Updated(record))
        }
    }

    async fn list_for_project(&self, project_id: i64, limit: usize) -> Result<Vec<Match>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM matches
            WHERE project_id = $1
            ORDER BY score DESC, vendor_id
            LIMIT $2
            "#,
            MATCH_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(project_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }
}
