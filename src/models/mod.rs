// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Match, MatchGenerationResult, Project, ProjectStatus, RefreshReport, ScoringWeights,
    UpsertOutcome, Vendor,
};
pub use requests::ListMatchesQuery;
pub use responses::{ErrorResponse, HealthResponse, ProjectMatchesResponse};
