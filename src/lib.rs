//! Vendor Match - matching service for cross-border expansion projects
//!
//! This library provides the engine that pairs a client's expansion project
//! with vendors covering its target country and overlapping its needed
//! services, scores each pairing, and upserts one match per vendor.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

// Re-export commonly used types
pub use crate::core::{calculate_match_score, MatchEngine, MatchError};
pub use models::{Match, MatchGenerationResult, Project, ProjectStatus, ScoringWeights, Vendor};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let result = MatchGenerationResult::new(1, 2, 3);
        assert_eq!(result.total_matches, 5);
        assert_eq!(ScoringWeights::default().service_overlap, 2);
    }
}
