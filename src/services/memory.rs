use crate::core::store::{MatchStore, ProjectStore, StoreError, VendorStore};
use crate::models::{Match, Project, ProjectStatus, UpsertOutcome, Vendor};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    projects: BTreeMap<i64, Project>,
    vendors: BTreeMap<i64, Vendor>,
    matches: BTreeMap<(i64, i64), Match>,
    next_match_id: i64,
}

/// In-process implementation of every store
///
/// All tables sit behind one lock, so each upsert is atomic on the
/// `(project_id, vendor_id)` key just like the unique index in PostgreSQL.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panicked writer cannot leave a half-applied upsert behind
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace a project
    pub fn insert_project(&self, project: Project) {
        self.lock().projects.insert(project.id, project);
    }

    /// Insert or replace a vendor
    pub fn insert_vendor(&self, vendor: Vendor) {
        self.lock().vendors.insert(vendor.id, vendor);
    }

    pub fn match_count(&self) -> usize {
        self.lock().matches.len()
    }

    /// Every stored match, ordered by `(project_id, vendor_id)`
    pub fn all_matches(&self) -> Vec<Match> {
        self.lock().matches.values().cloned().collect()
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Project>, StoreError> {
        Ok(self.lock().projects.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .lock()
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VendorStore for InMemoryStore {
    async fn find_by_country_and_services(
        &self,
        country: &str,
        services: &[String],
    ) -> Result<Vec<Vendor>, StoreError> {
        Ok(self
            .lock()
            .vendors
            .values()
            .filter(|v| v.countries_supported.contains(country))
            .filter(|v| services.iter().any(|s| v.services_offered.contains(s)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn find_by_project_and_vendor(
        &self,
        project_id: i64,
        vendor_id: i64,
    ) -> Result<Option<Match>, StoreError> {
        Ok(self.lock().matches.get(&(project_id, vendor_id)).cloned())
    }

    async fn upsert(
        &self,
        project_id: i64,
        vendor_id: i64,
        score: Decimal,
    ) -> Result<UpsertOutcome, StoreError> {
        let now = chrono::Utc::now();
        let mut tables = self.lock();

        if let Some(existing) = tables.matches.get_mut(&(project_id, vendor_id)) {
            existing.score = score;
            existing.updated_at = now;
            return Ok(UpsertOutcome::Updated(existing.clone()));
        }

        tables.next_match_id += 1;
        let created = Match {
            id: tables.next_match_id,
            project_id,
            vendor_id,
            score,
            created_at: now,
            updated_at: now,
        };
        tables.matches.insert((project_id, vendor_id), created.clone());

        Ok(UpsertOutcome::Created(created))
    }

    async fn list_for_project(&self, project_id: i64, limit: usize) -> Result<Vec<Match>, StoreError> {
        let mut matches: Vec<Match> = self
            .lock()
            .matches
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.vendor_id.cmp(&b.vendor_id)));
        matches.truncate(limit);

        Ok(matches)
    }
}
