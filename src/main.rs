use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vendor_match::config::{LoggingSettings, Settings};
use vendor_match::core::{MatchEngine, MatchNotifier};
use vendor_match::models::ScoringWeights;
use vendor_match::routes::{self, auth::JwtValidator, matches::AppState};
use vendor_match::services::{LogNotifier, PostgresClient, WebhookNotifier};
use vendor_match::workers::RefreshWorker;

/// Initialize logging; LOG_LEVEL / LOG_FORMAT / RUST_LOG override the config file
fn init_logging(settings: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn build_notifier(settings: &Settings) -> Arc<dyn MatchNotifier> {
    let Some(url) = settings.notifications.webhook_url.clone() else {
        return Arc::new(LogNotifier);
    };

    let timeout = Duration::from_secs(settings.notifications.timeout_secs);
    match WebhookNotifier::new(url, timeout) {
        Ok(notifier) => {
            info!("Webhook notifications enabled");
            Arc::new(notifier)
        }
        Err(e) => {
            warn!("Failed to build webhook client ({}), falling back to log notifications", e);
            Arc::new(LogNotifier)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);

    info!("Starting vendor match service...");

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
        })?,
    );

    info!("PostgreSQL client initialized");

    let weights = ScoringWeights::from(&settings.scoring.weights);

    let engine = MatchEngine::new(postgres.clone(), postgres.clone(), postgres.clone(), weights)
        .with_notifier(build_notifier(&settings));

    info!("Match engine initialized with weights: {:?}", engine.weights());

    let refresh_handle = if settings.refresh.enabled {
        let worker = RefreshWorker::new(engine.clone(), Duration::from_secs(settings.refresh.interval_secs))
            .map_err(|e| {
                error!("Failed to start refresh worker: {}", e);
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
            })?;
        Some(worker.start())
    } else {
        None
    };

    let app_state = AppState {
        engine,
        projects: postgres.clone(),
        matches: postgres.clone(),
        auth: JwtValidator::new(&settings.auth.jwt_secret),
        database: Some(postgres),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    if let Some(handle) = refresh_handle {
        handle.stop().await;
    }

    result
}
