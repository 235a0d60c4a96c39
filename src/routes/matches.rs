use actix_web::{web, HttpResponse, Responder};
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

use crate::core::{bounding_box, MatchEngine, MatchInput};
use crate::models::{
    AckResponse, ComputeMatchesRequest, ComputeMatchesResponse, ErrorResponse, HealthResponse,
    HideListingRequest, InteractionAction, ListingIntent, MatchPreferences,
    RecordInteractionRequest, SavePreferencesRequest,
};
use crate::services::{
    CacheKey, CacheManager, NotificationDispatcher, NotificationQueue, NotificationSender,
    PostgresClient,
};

/// How many pool rows one computation will consider at most
const CANDIDATE_POOL_LIMIT: i64 = 500;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub queue: Arc<NotificationQueue>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub sender: Arc<dyn NotificationSender>,
    pub engine: MatchEngine,
    pub cron_key: String,
    pub max_attempts: i32,
    pub drain_batch: i64,
    pub purge_after_days: i64,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/compute", web::post().to(compute_matches))
        .route("/matches/preferences", web::get().to(get_preferences))
        .route("/matches/preferences", web::put().to(save_preferences))
        .route("/matches/interaction", web::post().to(record_interaction))
        .route("/matches/hide", web::post().to(hide_listing));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Compute tiered matches for a user
///
/// POST /api/v1/matches/compute
///
/// Request body:
/// ```json
/// {
///   "userId": 42,
///   "tenantId": 1,
///   "limit": 20
/// }
/// ```
///
/// Matches are computed on demand from the current listing snapshot and
/// never persisted; qualifying hot and mutual matches are handed to the
/// notification dispatcher as a side effect.
async fn compute_matches(
    state: web::Data<AppState>,
    req: web::Json<ComputeMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user_id = req.user_id;
    let limit = (req.limit.min(100)).max(1) as usize;

    tracing::info!("Computing matches for user {}, limit {}", user_id, limit);

    let preferences = match load_preferences(&state, user_id).await {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::error!("Failed to load preferences for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load preferences".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let user_listings = match state.postgres.get_user_listings(user_id, req.tenant_id).await {
        Ok(listings) => listings,
        Err(e) => {
            tracing::error!("Failed to fetch listings for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch user listings".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // Degraded inputs never fail the computation; they narrow it
    let user_location = match state.postgres.get_user_location(user_id).await {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!("Location lookup failed for {}, proceeding without: {}", user_id, e);
            None
        }
    };

    let hidden_listings = match state.postgres.get_hidden_listings(user_id).await {
        Ok(hidden) => hidden,
        Err(e) => {
            tracing::warn!("Hidden lookup failed for {}, proceeding without: {}", user_id, e);
            HashSet::new()
        }
    };

    let wanted_intents: Vec<ListingIntent> = {
        let set: HashSet<ListingIntent> = user_listings
            .iter()
            .filter(|l| l.is_active)
            .map(|l| l.intent.opposite())
            .collect();
        set.into_iter().collect()
    };

    let bbox = user_location
        .map(|(lat, lon)| bounding_box(lat, lon, preferences.max_distance_km as f64));

    let candidate_pool = match state
        .postgres
        .get_active_listings(
            req.tenant_id,
            user_id,
            &wanted_intents,
            bbox.as_ref(),
            CANDIDATE_POOL_LIMIT,
        )
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to query candidate pool for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let owner_ids: Vec<i64> = {
        let set: HashSet<i64> = candidate_pool.iter().map(|l| l.user_id).collect();
        set.into_iter().collect()
    };

    // Reverse lookup failures degrade those candidates to one-way
    let owner_listings = match state
        .postgres
        .get_listings_by_owners(req.tenant_id, &owner_ids)
        .await
    {
        Ok(grouped) => grouped,
        Err(e) => {
            tracing::warn!("Owner listing lookup failed, matches degrade to one-way: {}", e);
            Default::default()
        }
    };

    let input = MatchInput {
        user_id,
        now: chrono::Utc::now(),
        preferences: preferences.clone(),
        user_listings,
        candidate_pool,
        owner_listings,
        user_location,
        hidden_listings,
    };

    let mut tiers = state.engine.compute(&input);

    // Notification dispatch is best-effort; the response never waits on a
    // failed queue write
    if let Err(e) = state.dispatcher.dispatch(&preferences, &tiers).await {
        tracing::error!("Notification dispatch failed for {}: {}", user_id, e);
    }

    tiers.hot.truncate(limit);
    tiers.mutual.truncate(limit);
    tiers.good.truncate(limit);
    tiers.all.truncate(limit);

    tracing::info!(
        "Returning {} matches for user {} ({} hot, {} mutual)",
        tiers.all.len(),
        user_id,
        tiers.hot.len(),
        tiers.mutual.len()
    );

    HttpResponse::Ok().json(ComputeMatchesResponse {
        hot: tiers.hot,
        mutual: tiers.mutual,
        good: tiers.good,
        all: tiers.all,
        stats: tiers.stats,
    })
}

async fn load_preferences(
    state: &web::Data<AppState>,
    user_id: i64,
) -> Result<MatchPreferences, crate::services::PostgresError> {
    let cache_key = CacheKey::preferences(user_id);
    if let Ok(prefs) = state.cache.get::<MatchPreferences>(&cache_key).await {
        return Ok(prefs);
    }

    let prefs = state.postgres.get_preferences(user_id).await?.clamped();
    if let Err(e) = state.cache.set(&cache_key, &prefs).await {
        tracing::warn!("Failed to cache preferences for {}: {}", user_id, e);
    }
    Ok(prefs)
}

/// Get stored match preferences, creating defaults on first access
///
/// GET /api/v1/matches/preferences?userId={userId}
async fn get_preferences(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let user_id = match query.get("userId").and_then(|v| v.parse::<i64>().ok()) {
        Some(id) if id > 0 => id,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing userId parameter".to_string(),
                message: "userId query parameter is required and must be a positive integer"
                    .to_string(),
                status_code: 400,
            });
        }
    };

    match load_preferences(&state, user_id).await {
        Ok(prefs) => HttpResponse::Ok().json(prefs),
        Err(e) => {
            tracing::error!("Failed to fetch preferences for {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch preferences".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Save match preferences
///
/// PUT /api/v1/matches/preferences
///
/// Sliders outside their valid range are clamped to the nearest boundary
/// and snapped to the 5-step grid; the response echoes what was stored.
async fn save_preferences(
    state: web::Data<AppState>,
    req: web::Json<SavePreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let prefs = MatchPreferences {
        user_id: req.user_id,
        max_distance_km: req.max_distance_km,
        min_match_score: req.min_match_score,
        notification_frequency: req.notification_frequency,
        notify_hot_matches: req.notify_hot_matches,
        notify_mutual_matches: req.notify_mutual_matches,
        category_filter: req.category_filter.clone(),
    }
    .clamped();

    if let Err(e) = state.postgres.save_preferences(&prefs).await {
        tracing::error!("Failed to save preferences for {}: {}", req.user_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to save preferences".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    // Next read must see the new values
    let cache_key = CacheKey::preferences(req.user_id);
    if let Err(e) = state.cache.delete(&cache_key).await {
        tracing::warn!("Failed to invalidate preference cache: {}", e);
    }

    HttpResponse::Ok().json(prefs)
}

/// Record a viewed/contacted interaction
///
/// POST /api/v1/matches/interaction
///
/// Idempotent per (user, listing, action): replays are acknowledged
/// without writing a second row.
async fn record_interaction(
    state: web::Data<AppState>,
    req: web::Json<RecordInteractionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let action = match InteractionAction::parse(&req.action.to_lowercase()) {
        Some(action) => action,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid action".to_string(),
                message: "Action must be one of: viewed, contacted".to_string(),
                status_code: 400,
            });
        }
    };

    match state
        .postgres
        .record_interaction(
            req.user_id,
            req.listing_id,
            action,
            req.match_score,
            req.distance_km,
        )
        .await
    {
        Ok(inserted) => {
            tracing::debug!(
                "Interaction {} -> {} ({:?}), new: {}",
                req.user_id,
                req.listing_id,
                action,
                inserted
            );
            HttpResponse::Ok().json(AckResponse {
                acknowledged: true,
                event_id: uuid::Uuid::new_v4().to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to record interaction: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to record interaction".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Hide a listing from future match computations
///
/// POST /api/v1/matches/hide
async fn hide_listing(
    state: web::Data<AppState>,
    req: web::Json<HideListingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.postgres.hide_listing(req.user_id, req.listing_id).await {
        Ok(()) => HttpResponse::Ok().json(AckResponse {
            acknowledged: true,
            event_id: uuid::Uuid::new_v4().to_string(),
        }),
        Err(e) => {
            tracing::error!("Failed to hide listing: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to hide listing".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
