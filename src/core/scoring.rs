use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::core::distance::haversine_distance;
use crate::models::Listing;

/// Tunable scoring constants. Only the tier thresholds (85 / 70) are part
/// of the external contract; these points shape the curve underneath them.
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    /// Points for a candidate in one of the user's interest categories
    pub category_match_points: f64,
    /// Baseline points when no category overlap exists
    pub category_base_points: f64,
    /// Maximum distance bonus, earned at 0 km, zero at max_distance_km
    pub distance_bonus_max: f64,
    /// Maximum recency bonus for listings newer than recency_full_days
    pub recency_bonus_max: f64,
    /// Age in days under which the full recency bonus applies
    pub recency_full_days: f64,
    /// Age in days at which the recency bonus reaches zero
    pub recency_zero_days: f64,
    /// Flat bonus for a confirmed two-way match
    pub mutual_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            category_match_points: 60.0,
            category_base_points: 30.0,
            distance_bonus_max: 25.0,
            recency_bonus_max: 10.0,
            recency_full_days: 7.0,
            recency_zero_days: 30.0,
            mutual_bonus: 5.0,
        }
    }
}

/// Score plus the facts that produced it
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub distance_km: Option<f64>,
    pub reasons: Vec<String>,
}

/// Compute an integer compatibility score in [0, 100] for one candidate.
///
/// Components: category affinity (60 on overlap, 30 baseline), distance
/// bonus (up to +25, linear decay to 0 at the preference ceiling, neutral
/// half-bonus when distance is unknown), recency (up to +10 within 7 days,
/// gone by 30), and a flat +5 when the match is mutual.
///
/// Deterministic: identical inputs (including `now`) yield the identical
/// score. Reasons are ordered by points contributed and capped at 3.
pub fn calculate_match_score(
    candidate: &Listing,
    interest_categories: &HashSet<i64>,
    user_location: Option<(f64, f64)>,
    max_distance_km: u16,
    is_mutual: bool,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    // Reasons carry the points that earned them so they can be ranked
    let mut contributions: Vec<(f64, String)> = Vec::with_capacity(4);

    // Category affinity
    let category_points = if interest_categories.contains(&candidate.category_id) {
        contributions.push((
            config.category_match_points,
            format!("Same category: {}", candidate.category_name),
        ));
        config.category_match_points
    } else {
        config.category_base_points
    };

    // Distance bonus: linear decay from the full bonus at 0 km to nothing
    // at the preference ceiling. Unknown distance takes the neutral
    // mid-scale factor so missing location data neither penalizes nor
    // advantages a candidate.
    let distance_km = match (user_location, candidate.coordinates()) {
        (Some((ulat, ulon)), Some((clat, clon))) => {
            Some(haversine_distance(ulat, ulon, clat, clon))
        }
        _ => None,
    };

    let distance_points = match distance_km {
        Some(d) => {
            let factor = (1.0 - d / max_distance_km as f64).max(0.0);
            let points = config.distance_bonus_max * factor;
            if d <= 5.0 {
                contributions.push((points, format!("Very close: {:.1} km away", d)));
            } else if factor >= 0.5 {
                contributions.push((points, format!("Nearby: {:.1} km away", d)));
            }
            points
        }
        None => config.distance_bonus_max * 0.5,
    };

    // Recency: full bonus within recency_full_days, linear decay to zero
    // at recency_zero_days
    let age_days = (now - candidate.created_at).num_seconds() as f64 / 86_400.0;
    let recency_points = if age_days <= config.recency_full_days {
        contributions.push((config.recency_bonus_max, "Posted recently".to_string()));
        config.recency_bonus_max
    } else if age_days < config.recency_zero_days {
        let span = config.recency_zero_days - config.recency_full_days;
        config.recency_bonus_max * (1.0 - (age_days - config.recency_full_days) / span)
    } else {
        0.0
    };

    let mutual_points = if is_mutual {
        contributions.push((config.mutual_bonus, "Mutual exchange possible".to_string()));
        config.mutual_bonus
    } else {
        0.0
    };

    let total = category_points + distance_points + recency_points + mutual_points;
    let score = total.clamp(0.0, 100.0).round() as u8;

    // Largest contribution first, top 3 for display
    contributions.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    let reasons = contributions
        .into_iter()
        .take(3)
        .map(|(_, reason)| reason)
        .collect();

    ScoreBreakdown {
        score,
        distance_km,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingIntent;
    use chrono::Duration;

    fn candidate(category_id: i64, lat: Option<f64>, lon: Option<f64>, age_days: i64) -> Listing {
        Listing {
            id: 10,
            user_id: 2,
            tenant_id: 1,
            intent: ListingIntent::Offer,
            category_id,
            category_name: "Gardening".to_string(),
            latitude: lat,
            longitude: lon,
            is_active: true,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn interests(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_close_same_category_fresh_listing_is_hot() {
        // ~3 km north of the user, same category, posted today
        let c = candidate(5, Some(53.3768), Some(-6.2603), 0);
        let breakdown = calculate_match_score(
            &c,
            &interests(&[5]),
            Some((53.3498, -6.2603)),
            25,
            false,
            Utc::now(),
            &ScoringConfig::default(),
        );

        assert!(breakdown.score >= 85, "score was {}", breakdown.score);
        assert!(breakdown.distance_km.unwrap() < 4.0);
        assert!(breakdown.reasons.iter().any(|r| r.contains("Same category")));
    }

    #[test]
    fn test_score_within_bounds() {
        let c = candidate(5, Some(53.3498), Some(-6.2603), 0);
        let breakdown = calculate_match_score(
            &c,
            &interests(&[5]),
            Some((53.3498, -6.2603)),
            25,
            true,
            Utc::now(),
            &ScoringConfig::default(),
        );
        assert!(breakdown.score <= 100);
    }

    #[test]
    fn test_category_mismatch_scores_lower() {
        let now = Utc::now();
        let c = candidate(5, Some(53.3498), Some(-6.2603), 0);
        let matched = calculate_match_score(
            &c,
            &interests(&[5]),
            Some((53.3498, -6.2603)),
            25,
            false,
            now,
            &ScoringConfig::default(),
        );
        let unmatched = calculate_match_score(
            &c,
            &interests(&[9]),
            Some((53.3498, -6.2603)),
            25,
            false,
            now,
            &ScoringConfig::default(),
        );
        assert_eq!(matched.score - unmatched.score, 30);
    }

    #[test]
    fn test_distance_monotonicity() {
        // Same candidate moved progressively further away never scores higher
        let now = Utc::now();
        let user = Some((53.3498, -6.2603));
        let mut last = u8::MAX;
        for step in 0..10 {
            let c = candidate(5, Some(53.3498 + step as f64 * 0.02), Some(-6.2603), 0);
            let b = calculate_match_score(
                &c,
                &interests(&[5]),
                user,
                25,
                false,
                now,
                &ScoringConfig::default(),
            );
            assert!(b.score <= last, "score increased with distance");
            last = b.score;
        }
    }

    #[test]
    fn test_unknown_distance_is_neutral() {
        let now = Utc::now();
        let no_coords = candidate(5, None, None, 0);
        let b = calculate_match_score(
            &no_coords,
            &interests(&[5]),
            Some((53.3498, -6.2603)),
            25,
            false,
            now,
            &ScoringConfig::default(),
        );
        assert!(b.distance_km.is_none());
        // category 60 + neutral 12.5 + recency 10 = 82.5 -> rounds to 83
        assert_eq!(b.score, 83);
    }

    #[test]
    fn test_recency_decays_to_zero() {
        let now = Utc::now();
        let fresh = candidate(5, None, None, 0);
        let stale = candidate(5, None, None, 45);
        let fresh_score = calculate_match_score(
            &fresh,
            &interests(&[5]),
            None,
            25,
            false,
            now,
            &ScoringConfig::default(),
        );
        let stale_score = calculate_match_score(
            &stale,
            &interests(&[5]),
            None,
            25,
            false,
            now,
            &ScoringConfig::default(),
        );
        assert_eq!(fresh_score.score - stale_score.score, 10);
    }

    #[test]
    fn test_mutual_bonus_is_flat_five() {
        let now = Utc::now();
        let c = candidate(5, None, None, 45);
        let one_way = calculate_match_score(
            &c,
            &interests(&[5]),
            None,
            25,
            false,
            now,
            &ScoringConfig::default(),
        );
        let mutual = calculate_match_score(
            &c,
            &interests(&[5]),
            None,
            25,
            true,
            now,
            &ScoringConfig::default(),
        );
        assert_eq!(mutual.score - one_way.score, 5);
        assert!(mutual.reasons.iter().any(|r| r.contains("Mutual")));
    }

    #[test]
    fn test_determinism() {
        let now = Utc::now();
        let c = candidate(5, Some(53.36), Some(-6.25), 3);
        let first = calculate_match_score(
            &c,
            &interests(&[5]),
            Some((53.3498, -6.2603)),
            25,
            true,
            now,
            &ScoringConfig::default(),
        );
        for _ in 0..5 {
            let again = calculate_match_score(
                &c,
                &interests(&[5]),
                Some((53.3498, -6.2603)),
                25,
                true,
                now,
                &ScoringConfig::default(),
            );
            assert_eq!(first.score, again.score);
            assert_eq!(first.reasons, again.reasons);
        }
    }

    #[test]
    fn test_reasons_capped_at_three() {
        let c = candidate(5, Some(53.3510), Some(-6.2603), 0);
        let b = calculate_match_score(
            &c,
            &interests(&[5]),
            Some((53.3498, -6.2603)),
            25,
            true,
            Utc::now(),
            &ScoringConfig::default(),
        );
        // category + very close + recent + mutual fired, display keeps 3
        assert_eq!(b.reasons.len(), 3);
        // ordered by contribution: category (60) first
        assert!(b.reasons[0].contains("Same category"));
    }
}
