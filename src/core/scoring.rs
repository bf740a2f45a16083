use crate::core::filters::shared_services;
use crate::models::{Project, ScoringWeights, Vendor};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Fractional digits kept on a persisted score (NUMERIC(5,2))
pub const SCORE_SCALE: u32 = 2;

/// Per-candidate scoring failures. Never fatal to sibling candidates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("Invalid vendor config: vendor {vendor_id} has response SLA of {hours} hours")]
    InvalidVendorConfig { vendor_id: i64, hours: i32 },

    #[error("Score {score} for vendor {vendor_id} exceeds the storable maximum {max}")]
    ScoreOutOfRange {
        vendor_id: i64,
        score: Decimal,
        max: Decimal,
    },
}

/// Largest value a NUMERIC(5,2) column can hold
pub fn max_stored_score() -> Decimal {
    Decimal::new(99_999, SCORE_SCALE)
}

/// Calculate a vendor's match score for a project
///
/// Scoring formula (default weights):
/// score = (
///     services_overlap * 2 +      # distinct shared services
///     vendor.rating +             # 0-5
///     24 / response_sla_hours     # faster SLA = higher
/// )
///
/// The result is rounded to two decimals (midpoint away from zero) so that it
/// persists without truncation. Returns the score and the shared services.
pub fn calculate_match_score(
    project: &Project,
    vendor: &Vendor,
    weights: &ScoringWeights,
) -> Result<(Decimal, Vec<String>), ScoreError> {
    if vendor.response_sla_hours <= 0 {
        return Err(ScoreError::InvalidVendorConfig {
            vendor_id: vendor.id,
            hours: vendor.response_sla_hours,
        });
    }

    let shared = shared_services(project, vendor);

    let overlap_score = Decimal::from(shared.len() as u64) * Decimal::from(weights.service_overlap);
    let sla_score = calculate_sla_score(vendor.response_sla_hours, weights.sla_baseline_hours);

    let raw = overlap_score + vendor.rating + sla_score;
    let score = round_for_storage(raw);

    let max = max_stored_score();
    if score > max {
        return Err(ScoreError::ScoreOutOfRange {
            vendor_id: vendor.id,
            score,
            max,
        });
    }

    Ok((score, shared))
}

/// SLA component: baseline hours over the vendor's promised response time
#[inline]
fn calculate_sla_score(response_sla_hours: i32, baseline_hours: u32) -> Decimal {
    Decimal::from(baseline_hours) / Decimal::from(response_sla_hours)
}

#[inline]
fn round_for_storage(score: Decimal) -> Decimal {
    score.round_dp_with_strategy(SCORE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
