use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for listing a project's persisted matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListMatchesQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500))]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl Default for ListMatchesQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}
