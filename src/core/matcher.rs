use crate::core::{
    filters::is_candidate,
    scoring::calculate_match_score,
    store::{MatchNotifier, MatchStore, ProjectStore, StoreError, VendorStore},
};
use crate::models::{Match, MatchGenerationResult, RefreshReport, ScoringWeights, UpsertOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors that abort a rebuild
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Project not found: {0}")]
    ProjectNotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Vendor match engine - rebuilds the persisted matches of a project
///
/// # Pipeline Stages
/// 1. Project lookup
/// 2. Candidate query (country + service overlap)
/// 3. Eligibility re-check and scoring
/// 4. Per-candidate upsert into the match store
#[derive(Clone)]
pub struct MatchEngine {
    projects: Arc<dyn ProjectStore>,
    vendors: Arc<dyn VendorStore>,
    matches: Arc<dyn MatchStore>,
    notifier: Option<Arc<dyn MatchNotifier>>,
    weights: ScoringWeights,
}

impl MatchEngine {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        vendors: Arc<dyn VendorStore>,
        matches: Arc<dyn MatchStore>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            projects,
            vendors,
            matches,
            notifier: None,
            weights,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn MatchNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Recompute and persist the matches for a project
    ///
    /// Every qualifying vendor's score is rewritten, even when unchanged.
    /// Vendors that stopped qualifying keep their existing match untouched.
    /// A store failure aborts the call; candidates already written stay written.
    ///
    /// # Returns
    /// Counts of the rows created and updated by this call
    pub async fn rebuild_matches(&self, project_id: i64) -> Result<MatchGenerationResult, MatchError> {
        let project = self
            .projects
            .get_by_id(project_id)
            .await?
            .ok_or(MatchError::ProjectNotFound(project_id))?;

        let services: Vec<String> = project
            .distinct_services()
            .into_iter()
            .map(str::to_owned)
            .collect();

        if services.is_empty() {
            tracing::info!("Project {} needs no services, nothing to match", project_id);
            return Ok(MatchGenerationResult::new(project_id, 0, 0));
        }

        let candidates = self
            .vendors
            .find_by_country_and_services(&project.country, &services)
            .await?;

        tracing::debug!(
            "Found {} candidate vendors for project {} ({})",
            candidates.len(),
            project_id,
            project.country
        );

        let mut seen_vendors = HashSet::new();
        let mut matches_created = 0;
        let mut matches_updated = 0;

        for vendor in candidates {
            if !seen_vendors.insert(vendor.id) {
                continue;
            }

            // Store queries may be looser than exact membership
            if !is_candidate(&vendor, &project) {
                tracing::debug!("Vendor {} does not qualify for project {}", vendor.id, project_id);
                continue;
            }

            let (score, shared) = match calculate_match_score(&project, &vendor, &self.weights) {
                Ok(scored) => scored,
                Err(e) => {
                    tracing::warn!("Skipping vendor {} for project {}: {}", vendor.id, project_id, e);
                    continue;
                }
            };

            let existing = self
                .matches
                .find_by_project_and_vendor(project_id, vendor.id)
                .await?;

            match self.matches.upsert(project_id, vendor.id, score).await {
                Ok(UpsertOutcome::Created(created)) => {
                    matches_created += 1;
                    tracing::debug!(
                        "Created match {} for vendor {} (score {}, shared {:?})",
                        created.id,
                        vendor.id,
                        score,
                        shared
                    );
                    self.notify_new_match(&created).await;
                }
                Ok(UpsertOutcome::Updated(updated)) => {
                    matches_updated += 1;
                    match existing {
                        Some(previous) => tracing::debug!(
                            "Updated match {} for vendor {}: {} -> {}",
                            updated.id,
                            vendor.id,
                            previous.score,
                            score
                        ),
                        None => tracing::debug!(
                            "Match for vendor {} was created concurrently, updated instead",
                            vendor.id
                        ),
                    }
                }
                Err(StoreError::Conflict(reason)) => {
                    matches_updated += 1;
                    tracing::debug!(
                        "Concurrent rebuild already wrote vendor {} for project {}: {}",
                        vendor.id,
                        project_id,
                        reason
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        let result = MatchGenerationResult::new(project_id, matches_created, matches_updated);

        tracing::info!(
            "Rebuilt matches for project {}: {} created, {} updated",
            project_id,
            result.matches_created,
            result.matches_updated
        );

        Ok(result)
    }

    /// Rebuild the matches of every active project
    ///
    /// A failing project is logged and counted; the remaining projects still run.
    pub async fn refresh_active_projects(&self) -> Result<RefreshReport, MatchError> {
        let projects = self.projects.list_active().await?;
        let mut report = RefreshReport::default();

        for project in projects {
            match self.rebuild_matches(project.id).await {
                Ok(result) => report.absorb(&result),
                Err(e) => {
                    tracing::error!("Failed to refresh matches for project {}: {}", project.id, e);
                    report.projects_failed += 1;
                }
            }
        }

        tracing::info!(
            "Refreshed {} active projects ({} failed): {} created, {} updated",
            report.projects_processed,
            report.projects_failed,
            report.matches_created,
            report.matches_updated
        );

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.on_refresh_completed(&report).await {
                tracing::warn!("Refresh report notification failed: {}", e);
            }
        }

        Ok(report)
    }

    async fn notify_new_match(&self, created: &Match) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        if let Err(e) = notifier.on_new_match(created).await {
            tracing::warn!(
                "New match notification failed for project {} vendor {}: {}",
                created.project_id,
                created.vendor_id,
                e
            );
        }
    }
}
