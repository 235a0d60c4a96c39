use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tier thresholds on the 0-100 score scale.
pub const HOT_SCORE_THRESHOLD: u8 = 85;
pub const GOOD_SCORE_THRESHOLD: u8 = 70;

/// Preference slider bounds. Out-of-range saves are clamped, not rejected.
pub const MIN_DISTANCE_KM: u16 = 5;
pub const MAX_DISTANCE_KM: u16 = 100;
pub const MIN_SCORE_FLOOR: u8 = 30;
pub const MAX_SCORE_FLOOR: u8 = 90;
pub const PREFERENCE_STEP: u16 = 5;

/// Whether a listing offers something or asks for something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingIntent {
    Offer,
    Request,
}

impl ListingIntent {
    /// The intent a candidate must carry to satisfy this one
    pub fn opposite(self) -> Self {
        match self {
            ListingIntent::Offer => ListingIntent::Request,
            ListingIntent::Request => ListingIntent::Offer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingIntent::Offer => "offer",
            ListingIntent::Request => "request",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "offer" => Some(ListingIntent::Offer),
            "request" => Some(ListingIntent::Request),
            _ => None,
        }
    }
}

/// Active listing record as supplied by the listings subsystem.
/// Read-only from the engine's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "tenantId")]
    pub tenant_id: i64,
    pub intent: ListingIntent,
    #[serde(rename = "categoryId")]
    pub category_id: i64,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Both coordinates or nothing; a lone latitude is treated as unknown
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Notification cadence selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    Instant,
    Daily,
    Weekly,
    Never,
}

impl NotificationFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationFrequency::Instant => "instant",
            NotificationFrequency::Daily => "daily",
            NotificationFrequency::Weekly => "weekly",
            NotificationFrequency::Never => "never",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "instant" => Some(NotificationFrequency::Instant),
            "daily" => Some(NotificationFrequency::Daily),
            "weekly" => Some(NotificationFrequency::Weekly),
            "never" => Some(NotificationFrequency::Never),
            _ => None,
        }
    }
}

/// Per-user match preferences, created with defaults on first access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPreferences {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "maxDistanceKm")]
    pub max_distance_km: u16,
    #[serde(rename = "minMatchScore")]
    pub min_match_score: u8,
    #[serde(rename = "notificationFrequency")]
    pub notification_frequency: NotificationFrequency,
    #[serde(rename = "notifyHotMatches")]
    pub notify_hot_matches: bool,
    #[serde(rename = "notifyMutualMatches")]
    pub notify_mutual_matches: bool,
    #[serde(rename = "categoryFilter", default)]
    pub category_filter: Vec<i64>,
}

impl MatchPreferences {
    pub fn defaults_for(user_id: i64) -> Self {
        Self {
            user_id,
            max_distance_km: 25,
            min_match_score: 50,
            notification_frequency: NotificationFrequency::Daily,
            notify_hot_matches: true,
            notify_mutual_matches: true,
            category_filter: Vec::new(),
        }
    }

    /// Clamp sliders to their valid ranges and snap to the 5-step grid.
    /// Malformed values never fail a computation.
    pub fn clamped(mut self) -> Self {
        self.max_distance_km = snap_to_step(
            self.max_distance_km,
            MIN_DISTANCE_KM,
            MAX_DISTANCE_KM,
            PREFERENCE_STEP,
        );
        self.min_match_score = snap_to_step(
            self.min_match_score as u16,
            MIN_SCORE_FLOOR as u16,
            MAX_SCORE_FLOOR as u16,
            PREFERENCE_STEP,
        ) as u8;
        self
    }
}

/// Round to the nearest step, then clamp into [min, max]. Widened to u32
/// so values near u16::MAX cannot overflow during the rounding add.
fn snap_to_step(value: u16, min: u16, max: u16, step: u16) -> u16 {
    let step = step as u32;
    let snapped = ((value as u32 + step / 2) / step) * step;
    snapped.clamp(min as u32, max as u32) as u16
}

/// Whether a match is reciprocal (each party can satisfy the other)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    OneWay,
    Mutual,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::OneWay => "one_way",
            MatchType::Mutual => "mutual",
        }
    }
}

/// A scored candidate, computed on demand. Never a row of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "listingId")]
    pub listing_id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "matchType")]
    pub match_type: MatchType,
    #[serde(rename = "matchReasons")]
    pub match_reasons: Vec<String>,
    #[serde(rename = "categoryId")]
    pub category_id: i64,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn is_hot(&self) -> bool {
        self.match_score >= HOT_SCORE_THRESHOLD
    }

    pub fn is_mutual(&self) -> bool {
        self.match_type == MatchType::Mutual
    }
}

/// Aggregate stats returned with a match computation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub total: usize,
}

/// Classified match buckets. Hot and Good are disjoint by score range;
/// Mutual is an orthogonal tag; All is the score-floor-filtered superset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TieredMatches {
    pub hot: Vec<MatchResult>,
    pub mutual: Vec<MatchResult>,
    pub good: Vec<MatchResult>,
    pub all: Vec<MatchResult>,
    pub stats: MatchStats,
}

/// Funnel stage of a recorded interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Viewed,
    Contacted,
}

impl InteractionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionAction::Viewed => "viewed",
            InteractionAction::Contacted => "contacted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "viewed" => Some(InteractionAction::Viewed),
            "contacted" => Some(InteractionAction::Contacted),
            _ => None,
        }
    }
}

/// Append-only engagement event, at most one per (user, listing, action)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: i64,
    pub listing_id: i64,
    pub action: InteractionAction,
    pub match_score: Option<i16>,
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Geospatial bounding box for coarse candidate pre-filtering
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
