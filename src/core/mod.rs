pub mod classifier;
pub mod collector;
pub mod distance;
pub mod engine;
pub mod mutual;
pub mod scoring;

pub use classifier::classify;
pub use collector::{apply_preference_filter, collect_candidates};
pub use distance::{bounding_box, haversine_distance, within_bounding_box};
pub use engine::{MatchEngine, MatchInput};
pub use mutual::is_mutual;
pub use scoring::{calculate_match_score, ScoreBreakdown, ScoringConfig};
