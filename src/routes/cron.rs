use actix_web::{web, HttpRequest, HttpResponse, Responder};
use subtle::ConstantTimeEq;

use crate::models::{ErrorResponse, NotificationFrequency, QueueStatsResponse, WorkerReportResponse};
use crate::routes::matches::AppState;

/// Configure the cron-triggered worker routes. Every endpoint requires the
/// shared `x-cron-key` header; the scheduler is the only intended caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/queue/run", web::post().to(run_queue))
        .route("/queue/retry", web::post().to(retry_queue))
        .route("/queue/purge", web::post().to(purge_queue))
        .route("/queue/stats", web::get().to(queue_stats))
        .route("/digest/daily", web::post().to(run_daily_digest))
        .route("/digest/weekly", web::post().to(run_weekly_digest));
}

/// Constant-time comparison of the presented cron key
fn authorized(req: &HttpRequest, expected: &str) -> bool {
    let presented = match req.headers().get("x-cron-key").and_then(|v| v.to_str().ok()) {
        Some(key) => key,
        None => return false,
    };
    if expected.is_empty() {
        return false;
    }
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorResponse {
        error: "Forbidden".to_string(),
        message: "Missing or invalid cron key".to_string(),
        status_code: 403,
    })
}

fn worker_error(job: &str, e: impl std::fmt::Display) -> HttpResponse {
    tracing::error!("Cron job {} failed: {}", job, e);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: format!("Cron job {} failed", job),
        message: e.to_string(),
        status_code: 500,
    })
}

/// Deliver a batch of pending notifications
///
/// POST /cron/queue/run
async fn run_queue(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state.cron_key) {
        return forbidden();
    }

    match state
        .queue
        .drain_pending(state.sender.as_ref(), state.drain_batch)
        .await
    {
        Ok(report) => HttpResponse::Ok().json(WorkerReportResponse {
            job: "queue_run".to_string(),
            processed: report.processed,
            failed: report.failed,
        }),
        Err(e) => worker_error("queue_run", e),
    }
}

/// Re-queue failed notifications that still have attempts left
///
/// POST /cron/queue/retry
async fn retry_queue(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state.cron_key) {
        return forbidden();
    }

    match state.queue.retry_failed(state.max_attempts).await {
        Ok(requeued) => HttpResponse::Ok().json(WorkerReportResponse {
            job: "queue_retry".to_string(),
            processed: requeued,
            failed: 0,
        }),
        Err(e) => worker_error("queue_retry", e),
    }
}

/// Delete sent notifications past the retention window
///
/// POST /cron/queue/purge
async fn purge_queue(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state.cron_key) {
        return forbidden();
    }

    match state.queue.purge_sent(state.purge_after_days).await {
        Ok(purged) => HttpResponse::Ok().json(WorkerReportResponse {
            job: "queue_purge".to_string(),
            processed: purged,
            failed: 0,
        }),
        Err(e) => worker_error("queue_purge", e),
    }
}

/// Pending / sent / failed counters for operators
///
/// GET /cron/queue/stats
async fn queue_stats(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state.cron_key) {
        return forbidden();
    }

    match state.queue.counts().await {
        Ok(counts) => HttpResponse::Ok().json(QueueStatsResponse {
            pending: counts.pending,
            sent: counts.sent,
            failed: counts.failed,
        }),
        Err(e) => worker_error("queue_stats", e),
    }
}

/// Flush accumulated daily-digest entries into the queue
///
/// POST /cron/digest/daily
async fn run_daily_digest(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state.cron_key) {
        return forbidden();
    }

    match state.queue.flush_digests(NotificationFrequency::Daily).await {
        Ok(digests) => HttpResponse::Ok().json(WorkerReportResponse {
            job: "digest_daily".to_string(),
            processed: digests,
            failed: 0,
        }),
        Err(e) => worker_error("digest_daily", e),
    }
}

/// Flush accumulated weekly-digest entries into the queue
///
/// POST /cron/digest/weekly
async fn run_weekly_digest(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !authorized(&req, &state.cron_key) {
        return forbidden();
    }

    match state.queue.flush_digests(NotificationFrequency::Weekly).await {
        Ok(digests) => HttpResponse::Ok().json(WorkerReportResponse {
            job: "digest_weekly".to_string(),
            processed: digests,
            failed: 0,
        }),
        Err(e) => worker_error("digest_weekly", e),
    }
}
