// HTTP API tests against in-memory stores

use actix_web::{http::StatusCode, test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal_macros::dec;
use std::sync::Arc;
use vendor_match::core::MatchEngine;
use vendor_match::models::{
    ErrorResponse, HealthResponse, MatchGenerationResult, Project, ProjectMatchesResponse,
    ProjectStatus, RefreshReport, ScoringWeights, Vendor,
};
use vendor_match::routes::{
    self,
    auth::{Claims, JwtValidator, Role},
    matches::AppState,
};
use vendor_match::services::InMemoryStore;

const SECRET: &str = "api-test-secret";

fn token(role: Role) -> String {
    let claims = Claims {
        sub: 1,
        email: "client@example.com".to_string(),
        role,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn bearer(role: Role) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(role)))
}

fn seeded_state() -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());

    store.insert_project(Project {
        id: 1,
        client_id: 1,
        country: "Germany".to_string(),
        services_needed: vec!["legal_services".to_string(), "compliance".to_string()],
        budget: dec!(50000.00),
        status: ProjectStatus::Active,
        created_at: None,
        updated_at: None,
    });
    store.insert_vendor(Vendor {
        id: 1,
        name: "Legal Partners International".to_string(),
        countries_supported: ["Germany", "France", "Spain"].iter().map(|c| c.to_string()).collect(),
        services_offered: ["legal_services", "compliance", "contract_negotiation"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rating: dec!(4.5),
        response_sla_hours: 24,
        created_at: None,
        updated_at: None,
    });
    store.insert_vendor(Vendor {
        id: 2,
        name: "Tax Solutions Pro".to_string(),
        countries_supported: ["Germany", "Netherlands"].iter().map(|c| c.to_string()).collect(),
        services_offered: ["tax_services", "compliance"].iter().map(|s| s.to_string()).collect(),
        rating: dec!(4.2),
        response_sla_hours: 48,
        created_at: None,
        updated_at: None,
    });

    let engine = MatchEngine::new(store.clone(), store.clone(), store.clone(), ScoringWeights::default());
    let state = AppState {
        engine,
        projects: store.clone(),
        matches: store.clone(),
        auth: JwtValidator::new(SECRET),
        database: None,
    };

    (state, store)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.status, "healthy");
}

#[actix_web::test]
async fn test_rebuild_returns_counts() {
    let (state, store) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/1/matches/rebuild")
        .insert_header(bearer(Role::Client))
        .to_request();
    let first: MatchGenerationResult = test::call_and_read_body_json(&app, req).await;

    assert_eq!(first, MatchGenerationResult::new(1, 2, 0));

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/1/matches/rebuild")
        .insert_header(bearer(Role::Admin))
        .to_request();
    let second: MatchGenerationResult = test::call_and_read_body_json(&app, req).await;

    assert_eq!(second, MatchGenerationResult::new(1, 0, 2));
    assert_eq!(store.match_count(), 2);
}

#[actix_web::test]
async fn test_rebuild_unknown_project_is_404() {
    let (state, store) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/999/matches/rebuild")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.status_code, 404);
    assert_eq!(store.match_count(), 0);
}

#[actix_web::test]
async fn test_rebuild_requires_token() {
    let (state, store) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/1/matches/rebuild")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.match_count(), 0);
}

#[actix_web::test]
async fn test_rebuild_rejects_bad_signature() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let claims = Claims {
        sub: 1,
        email: "client@example.com".to_string(),
        role: Role::Admin,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let forged = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"other")).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/1/matches/rebuild")
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_non_numeric_project_id_is_400() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/abc/matches/rebuild")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_path");
}

#[actix_web::test]
async fn test_list_matches_highest_score_first() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/1/matches/rebuild")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/v1/projects/1/matches?limit=10")
        .insert_header(bearer(Role::Client))
        .to_request();
    let body: ProjectMatchesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.project_id, 1);
    assert_eq!(body.total_results, 2);
    let vendor_ids: Vec<i64> = body.matches.iter().map(|m| m.vendor_id).collect();
    assert_eq!(vendor_ids, vec![1, 2]);
    assert_eq!(body.matches[0].score, dec!(9.5));
}

#[actix_web::test]
async fn test_list_matches_rejects_zero_limit() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/projects/1/matches?limit=0")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_refresh_is_admin_only() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/refresh")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_refresh_as_admin() {
    let (state, store) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/refresh")
        .insert_header(bearer(Role::Admin))
        .to_request();
    let report: RefreshReport = test::call_and_read_body_json(&app, req).await;

    assert_eq!(report.projects_processed, 1);
    assert_eq!(report.matches_created, 2);
    assert_eq!(store.match_count(), 2);
}

#[actix_web::test]
async fn test_client_cannot_list_foreign_project() {
    let (state, store) = seeded_state();
    store.insert_project(Project {
        id: 2,
        client_id: 2,
        country: "Germany".to_string(),
        services_needed: vec!["compliance".to_string()],
        budget: dec!(20000.00),
        status: ProjectStatus::Active,
        created_at: None,
        updated_at: None,
    });
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/2/matches/rebuild")
        .insert_header(bearer(Role::Admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    // Token subject is client 1
    let req = test::TestRequest::get()
        .uri("/api/v1/projects/2/matches")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.status_code, 404);

    let req = test::TestRequest::get()
        .uri("/api/v1/projects/2/matches")
        .insert_header(bearer(Role::Admin))
        .to_request();
    let body: ProjectMatchesResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.total_results, 2);
}

#[actix_web::test]
async fn test_missing_token_wins_over_bad_project_id() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects/abc/matches/rebuild")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/projects/abc/matches?limit=oops")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_list_matches_rejects_malformed_limit() {
    let (state, _) = seeded_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/projects/1/matches?limit=many")
        .insert_header(bearer(Role::Client))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_query");
}
