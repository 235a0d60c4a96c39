//! Nexus Match - match scoring and notification dispatch engine
//!
//! Computes tiered listing matches (hot, mutual, good) on demand from the
//! current listing snapshot and routes qualifying matches into a durable
//! notification queue with per-user frequency control.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    bounding_box, calculate_match_score, classify, haversine_distance, is_mutual, MatchEngine,
    MatchInput, ScoringConfig,
};
pub use models::{
    Listing, ListingIntent, MatchPreferences, MatchResult, MatchType, NotificationFrequency,
    TieredMatches,
};
