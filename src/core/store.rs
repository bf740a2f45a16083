//! Collaborator contracts the match engine depends on.
//!
//! The engine only ever sees these narrow capabilities; PostgreSQL and the
//! in-memory stores in `services` both implement them.

use crate::models::{Match, Project, RefreshReport, UpsertOutcome, Vendor};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by any store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Unique key already taken by a concurrent writer
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Errors from a notification sink
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification rejected with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<Project>, StoreError>;

    /// Projects whose status is `active`
    async fn list_active(&self) -> Result<Vec<Project>, StoreError>;
}

#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Vendors where `country` is in `countries_supported` and
    /// `services` intersects `services_offered`
    async fn find_by_country_and_services(
        &self,
        country: &str,
        services: &[String],
    ) -> Result<Vec<Vendor>, StoreError>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_by_project_and_vendor(
        &self,
        project_id: i64,
        vendor_id: i64,
    ) -> Result<Option<Match>, StoreError>;

    /// Insert, or update the score of, the single row for `(project_id, vendor_id)`.
    ///
    /// Must be atomic with respect to the unique key.
    async fn upsert(
        &self,
        project_id: i64,
        vendor_id: i64,
        score: Decimal,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Matches for a project, highest score first
    async fn list_for_project(&self, project_id: i64, limit: usize) -> Result<Vec<Match>, StoreError>;
}

/// Best-effort sink for match lifecycle events
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    async fn on_new_match(&self, created: &Match) -> Result<(), NotificationError>;

    async fn on_refresh_completed(&self, _report: &RefreshReport) -> Result<(), NotificationError> {
        Ok(())
    }
}
