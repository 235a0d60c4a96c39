use serde::{Deserialize, Serialize};

use crate::models::domain::{MatchResult, MatchStats};

/// Response for the compute matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeMatchesResponse {
    pub hot: Vec<MatchResult>,
    pub mutual: Vec<MatchResult>,
    pub good: Vec<MatchResult>,
    pub all: Vec<MatchResult>,
    pub stats: MatchStats,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Acknowledgement for fire-and-forget writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub acknowledged: bool,
    #[serde(rename = "eventId")]
    pub event_id: String,
}

/// Operator-visible queue counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QueueStatsResponse {
    pub pending: i64,
    pub sent: i64,
    pub failed: i64,
}

/// Outcome of a cron-triggered worker pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReportResponse {
    pub job: String,
    pub processed: u64,
    pub failed: u64,
}
