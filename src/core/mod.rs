// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod store;

pub use filters::{is_candidate, offers_any_service, shared_services, supports_country};
pub use matcher::{MatchEngine, MatchError};
pub use scoring::{calculate_match_score, max_stored_score, ScoreError, SCORE_SCALE};
pub use store::{MatchNotifier, MatchStore, NotificationError, ProjectStore, StoreError, VendorStore};
