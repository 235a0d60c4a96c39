use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::NotificationFrequency;

/// Request to compute tiered matches for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComputeMatchesRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "tenant_id", rename = "tenantId")]
    pub tenant_id: i64,
    #[serde(default = "default_limit")]
    pub limit: u16,
}

fn default_limit() -> u16 {
    20
}

/// Request to save match preferences. Out-of-range sliders are clamped
/// to the nearest valid boundary rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePreferencesRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[serde(alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: u16,
    #[serde(alias = "min_match_score", rename = "minMatchScore")]
    pub min_match_score: u8,
    #[serde(alias = "notification_frequency", rename = "notificationFrequency")]
    pub notification_frequency: NotificationFrequency,
    #[serde(alias = "notify_hot_matches", rename = "notifyHotMatches", default = "default_on")]
    pub notify_hot_matches: bool,
    #[serde(
        alias = "notify_mutual_matches",
        rename = "notifyMutualMatches",
        default = "default_on"
    )]
    pub notify_mutual_matches: bool,
    #[serde(alias = "category_filter", rename = "categoryFilter", default)]
    pub category_filter: Vec<i64>,
}

fn default_on() -> bool {
    true
}

/// Request to record a viewed/contacted interaction.
/// Fire-and-forget from the caller's perspective; duplicates are no-ops.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordInteractionRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: i64,
    pub action: String,
    #[serde(alias = "match_score", rename = "matchScore", default)]
    pub match_score: Option<i16>,
    #[serde(alias = "distance_km", rename = "distanceKm", default)]
    pub distance_km: Option<f64>,
}

/// Request to hide a listing from future match computations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HideListingRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: i64,
}
