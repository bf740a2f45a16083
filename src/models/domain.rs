use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of an expansion project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

/// A client's expansion project into a single target country
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub client_id: i64,
    pub country: String,
    /// Ordered as entered by the client; duplicates carry no extra weight
    pub services_needed: Vec<String>,
    pub budget: Decimal,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Project {
    /// Distinct services the project asks for
    pub fn distinct_services(&self) -> BTreeSet<&str> {
        self.services_needed.iter().map(String::as_str).collect()
    }
}

/// A service provider from the vendor directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub countries_supported: BTreeSet<String>,
    pub services_offered: BTreeSet<String>,
    /// 0.00 - 5.00
    pub rating: Decimal,
    #[serde(default = "default_sla_hours")]
    pub response_sla_hours: i32,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub fn default_sla_hours() -> i32 {
    24
}

/// Persisted pairing of a project with a qualifying vendor.
///
/// At most one exists per `(project_id, vendor_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub project_id: i64,
    pub vendor_id: i64,
    pub score: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// What an upsert did to the `(project_id, vendor_id)` row
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(Match),
    Updated(Match),
}

impl UpsertOutcome {
    pub fn record(&self) -> &Match {
        match self {
            UpsertOutcome::Created(m) | UpsertOutcome::Updated(m) => m,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// Scoring weights
///
/// score = overlap * service_overlap + rating + sla_baseline_hours / response_sla_hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub service_overlap: u32,
    pub sla_baseline_hours: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            service_overlap: 2,
            sla_baseline_hours: 24,
        }
    }
}

/// Counts produced by a single rebuild of one project's matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGenerationResult {
    pub project_id: i64,
    pub matches_created: usize,
    pub matches_updated: usize,
    /// Rows touched by this call, not the project's overall match count
    pub total_matches: usize,
}

impl MatchGenerationResult {
    pub fn new(project_id: i64, matches_created: usize, matches_updated: usize) -> Self {
        Self {
            project_id,
            matches_created,
            matches_updated,
            total_matches: matches_created + matches_updated,
        }
    }
}

/// Summary of a refresh across every active project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub projects_processed: usize,
    pub projects_failed: usize,
    pub matches_created: usize,
    pub matches_updated: usize,
}

impl RefreshReport {
    pub fn absorb(&mut self, result: &MatchGenerationResult) {
        self.projects_processed += 1;
        self.matches_created += result.matches_created;
        self.matches_updated += result.matches_updated;
    }
}
