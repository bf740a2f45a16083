// Unit tests for vendor eligibility and scoring

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vendor_match::core::{
    calculate_match_score, filters::{is_candidate, shared_services, supports_country},
    max_stored_score, ScoreError,
};
use vendor_match::models::{Project, ProjectStatus, ScoringWeights, Vendor};

fn create_vendor(countries: &[&str], services: &[&str], rating: Decimal, sla: i32) -> Vendor {
    Vendor {
        id: 1,
        name: "Tax Solutions Pro".to_string(),
        countries_supported: countries.iter().map(|c| c.to_string()).collect(),
        services_offered: services.iter().map(|s| s.to_string()).collect(),
        rating,
        response_sla_hours: sla,
        created_at: None,
        updated_at: None,
    }
}

fn create_project(country: &str, services: &[&str]) -> Project {
    Project {
        id: 1,
        client_id: 1,
        country: country.to_string(),
        services_needed: services.iter().map(|s| s.to_string()).collect(),
        budget: dec!(35000.00),
        status: ProjectStatus::Active,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn test_supports_country_is_exact() {
    let vendor = create_vendor(&["Germany", "Netherlands"], &["tax_services"], dec!(4.2), 48);

    assert!(supports_country(&vendor, "Germany"));
    assert!(!supports_country(&vendor, "germany"));
    assert!(!supports_country(&vendor, "German"));
    assert!(!supports_country(&vendor, "Netherlands Antilles"));
}

#[test]
fn test_country_mismatch_excludes_despite_overlap() {
    let vendor = create_vendor(&["Belgium"], &["tax_services", "accounting"], dec!(5.0), 1);
    let project = create_project("Germany", &["tax_services", "accounting"]);

    assert!(!is_candidate(&vendor, &project));
}

#[test]
fn test_zero_overlap_excludes() {
    let vendor = create_vendor(&["Germany"], &["tax_services"], dec!(4.2), 48);
    let project = create_project("Germany", &["legal_services", "compliance"]);

    assert!(shared_services(&project, &vendor).is_empty());
    assert!(!is_candidate(&vendor, &project));
}

#[test]
fn test_service_names_are_case_sensitive() {
    let vendor = create_vendor(&["Germany"], &["Tax_Services"], dec!(4.2), 48);
    let project = create_project("Germany", &["tax_services"]);

    assert!(!is_candidate(&vendor, &project));
}

#[test]
fn test_score_example_two_shared_fast_sla() {
    let vendor = create_vendor(&["Germany"], &["tax_services", "accounting"], dec!(4.5), 24);
    let project = create_project("Germany", &["tax_services", "accounting"]);

    let (score, shared) = calculate_match_score(&project, &vendor, &ScoringWeights::default()).unwrap();

    assert_eq!(score, dec!(9.5));
    assert_eq!(shared, vec!["tax_services", "accounting"]);
}

#[test]
fn test_score_example_one_shared_slow_sla() {
    let vendor = create_vendor(&["Germany"], &["tax_services"], dec!(4.0), 48);
    let project = create_project("Germany", &["tax_services", "compliance"]);

    let (score, _) = calculate_match_score(&project, &vendor, &ScoringWeights::default()).unwrap();

    assert_eq!(score, dec!(6.5));
}

#[test]
fn test_score_is_deterministic() {
    let vendor = create_vendor(&["Germany"], &["tax_services"], dec!(4.6), 36);
    let project = create_project("Germany", &["tax_services"]);
    let weights = ScoringWeights::default();

    let first = calculate_match_score(&project, &vendor, &weights).unwrap();
    let second = calculate_match_score(&project, &vendor, &weights).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.0, dec!(7.27));
}

#[test]
fn test_negative_sla_rejected() {
    let vendor = create_vendor(&["Germany"], &["tax_services"], dec!(4.0), -6);
    let project = create_project("Germany", &["tax_services"]);

    let err = calculate_match_score(&project, &vendor, &ScoringWeights::default()).unwrap_err();

    assert!(matches!(err, ScoreError::InvalidVendorConfig { vendor_id: 1, hours: -6 }));
}

#[test]
fn test_stored_scores_fit_column() {
    let vendor = create_vendor(&["Germany"], &["tax_services"], dec!(5.0), 1);
    let project = create_project("Germany", &["tax_services"]);

    // 2 + 5 + 24
    let (score, _) = calculate_match_score(&project, &vendor, &ScoringWeights::default()).unwrap();

    assert_eq!(score, dec!(31));
    assert!(score <= max_stored_score());
    assert!(score.scale() <= 2);
}
