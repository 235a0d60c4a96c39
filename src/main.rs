mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::{MatchEngine, ScoringConfig};
use routes::matches::AppState;
use services::{
    CacheManager, LogSender, NotificationDispatcher, NotificationQueue, NotificationSender,
    PostgresClient, WebhookSender,
};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST),
        )
        .content_type("application/json")
        .json(serde_json::json!({
            "error": self.error,
            "message": self.message,
            "statusCode": self.status_code,
        }))
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt().with_target(false).with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Nexus Match scoring service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client (runs migrations)
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = Arc::new(
        PostgresClient::new(&settings.database.url, db_max_conn, db_min_conn)
            .await
            .unwrap_or_else(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                panic!("PostgreSQL connection error: {}", e);
            }),
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Initialize cache manager
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await
    {
        Ok(c) => {
            info!(
                "Cache manager initialized (L1: {} entries, TTL: {}s)",
                l1_cache_size, cache_ttl
            );
            Arc::new(c)
        }
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            return Err(std::io::Error::other("Redis connection required"));
        }
    };

    // Notification pipeline: queue shares the Postgres pool
    let queue = Arc::new(NotificationQueue::new(postgres.pool()));
    let dispatcher = Arc::new(NotificationDispatcher::new(postgres.clone(), queue.clone()));

    let sender: Arc<dyn NotificationSender> = match &settings.notifications.webhook_url {
        Some(url) => {
            info!("Notification delivery via webhook: {}", url);
            Arc::new(WebhookSender::new(url.clone()))
        }
        None => {
            info!("No delivery webhook configured, notifications go to the log");
            Arc::new(LogSender)
        }
    };

    // Initialize the match engine with configured scoring points
    let engine = MatchEngine::new(ScoringConfig {
        category_match_points: settings.scoring.points.category_match,
        category_base_points: settings.scoring.points.category_base,
        distance_bonus_max: settings.scoring.points.distance_bonus_max,
        recency_bonus_max: settings.scoring.points.recency_bonus_max,
        mutual_bonus: settings.scoring.points.mutual_bonus,
        ..ScoringConfig::default()
    });

    info!("Match engine initialized");

    if settings.notifications.cron_key.is_empty() {
        error!("notifications.cron_key is empty; cron endpoints will reject all requests");
    }

    // Build application state
    let app_state = AppState {
        postgres,
        cache,
        queue,
        dispatcher,
        sender,
        engine,
        cron_key: settings.notifications.cron_key.clone(),
        max_attempts: settings.notifications.max_attempts,
        drain_batch: settings.notifications.drain_batch,
        purge_after_days: settings.notifications.purge_after_days,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
