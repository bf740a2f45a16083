use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{MatchEngine, MatchError, MatchStore, ProjectStore};
use crate::models::{ErrorResponse, HealthResponse, ListMatchesQuery, ProjectMatchesResponse};
use crate::routes::auth::{JwtValidator, Role};
use crate::services::PostgresClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchEngine,
    pub projects: Arc<dyn ProjectStore>,
    pub matches: Arc<dyn MatchStore>,
    pub auth: JwtValidator,
    /// Probed by the health check; absent when running on in-memory stores
    pub database: Option<Arc<PostgresClient>>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/projects/{id}/matches/rebuild", web::post().to(rebuild_matches))
        .route("/projects/{id}/matches", web::get().to(list_project_matches))
        .route("/matches/refresh", web::post().to(refresh_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match &state.database {
        Some(db) => db.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Parse the `{id}` segment once the caller is authorized
fn parse_project_id(raw: &str) -> Result<i64, HttpResponse> {
    raw.parse::<i64>().map_err(|e| {
        HttpResponse::BadRequest().json(ErrorResponse::new(
            "invalid_path",
            format!("Invalid path: project id {:?}: {}", raw, e),
            400,
        ))
    })
}

fn project_not_found(project_id: i64) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "Project not found",
        format!("Project {} does not exist", project_id),
        404,
    ))
}

/// Rebuild matches endpoint
///
/// POST /api/v1/projects/{id}/matches/rebuild
///
/// Response body:
/// ```json
/// {
///   "project_id": 1,
///   "matches_created": 2,
///   "matches_updated": 1,
///   "total_matches": 3
/// }
/// ```
async fn rebuild_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(e) = state.auth.authorize(&http_req, &[Role::Client, Role::Admin]) {
        return e.to_response();
    }

    let project_id = match parse_project_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    tracing::info!("Rebuilding matches for project: {}", project_id);

    match state.engine.rebuild_matches(project_id).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(MatchError::ProjectNotFound(id)) => project_not_found(id),
        Err(e) => {
            tracing::error!("Failed to rebuild matches for project {}: {}", project_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to rebuild matches",
                e.to_string(),
                500,
            ))
        }
    }
}

/// List a project's persisted matches, highest score first
///
/// GET /api/v1/projects/{id}/matches?limit=100
///
/// Clients only see their own projects; anything else is reported as 404.
async fn list_project_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    let claims = match state.auth.authorize(&http_req, &[Role::Client, Role::Admin]) {
        Ok(claims) => claims,
        Err(e) => return e.to_response(),
    };

    let project_id = match parse_project_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let query = match web::Query::<ListMatchesQuery>::from_query(http_req.query_string()) {
        Ok(query) => query.into_inner(),
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "invalid_query",
                format!("Invalid query: {}", e),
                400,
            ))
        }
    };

    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    match state.projects.get_by_id(project_id).await {
        Ok(Some(project)) if claims.role == Role::Client && project.client_id != claims.sub => {
            tracing::info!("Client {} denied access to project {}", claims.sub, project_id);
            return project_not_found(project_id);
        }
        Ok(Some(_)) => {}
        Ok(None) => return project_not_found(project_id),
        Err(e) => {
            tracing::error!("Failed to fetch project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to fetch project",
                e.to_string(),
                500,
            ));
        }
    }

    match state.matches.list_for_project(project_id, query.limit as usize).await {
        Ok(matches) => HttpResponse::Ok().json(ProjectMatchesResponse {
            project_id,
            total_results: matches.len(),
            matches,
        }),
        Err(e) => {
            tracing::error!("Failed to list matches for project {}: {}", project_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to list matches",
                e.to_string(),
                500,
            ))
        }
    }
}

/// Rebuild the matches of every active project (admin only)
///
/// POST /api/v1/matches/refresh
async fn refresh_matches(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let claims = match state.auth.authorize(&http_req, &[Role::Admin]) {
        Ok(claims) => claims,
        Err(e) => return e.to_response(),
    };

    tracing::info!("Match refresh requested by admin {}", claims.sub);

    match state.engine.refresh_active_projects().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            tracing::error!("Match refresh failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to refresh matches",
                e.to_string(),
                500,
            ))
        }
    }
}
