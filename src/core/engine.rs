use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::classifier::classify;
use crate::core::collector::{apply_preference_filter, collect_candidates};
use crate::core::mutual::is_mutual;
use crate::core::scoring::{calculate_match_score, ScoringConfig};
use crate::models::{Listing, MatchPreferences, MatchResult, MatchType, TieredMatches};

/// Everything a single match computation needs, fetched up front so the
/// pipeline itself stays pure and deterministic.
#[derive(Debug, Clone)]
pub struct MatchInput {
    pub user_id: i64,
    /// Wall clock for the whole computation; every candidate ages against
    /// the same instant
    pub now: DateTime<Utc>,
    pub preferences: MatchPreferences,
    /// The requesting user's own active listings
    pub user_listings: Vec<Listing>,
    /// Tenant-wide pool of active listings to match against
    pub candidate_pool: Vec<Listing>,
    /// Active listings per candidate owner, for reciprocity detection.
    /// A missing owner id means the reverse lookup failed; that candidate
    /// is treated as one-way.
    pub owner_listings: HashMap<i64, Vec<Listing>>,
    pub user_location: Option<(f64, f64)>,
    pub hidden_listings: HashSet<i64>,
}

/// Read-only matching pipeline: collect, score, detect reciprocity, sort,
/// filter by preferences, classify into tiers.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    scoring: ScoringConfig,
}

impl MatchEngine {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    /// Run the full pipeline over a pre-fetched snapshot. Same snapshot and
    /// `now` always produce the same tiers.
    pub fn compute(&self, input: &MatchInput) -> TieredMatches {
        let preferences = input.preferences.clone().clamped();

        let candidates = collect_candidates(
            input.user_id,
            &input.user_listings,
            &input.candidate_pool,
            input.user_location,
            &preferences,
            &input.hidden_listings,
        );

        debug!(
            user_id = input.user_id,
            pool = input.candidate_pool.len(),
            candidates = candidates.len(),
            "candidate collection complete"
        );

        let interest_categories: HashSet<i64> = input
            .user_listings
            .iter()
            .filter(|l| l.is_active)
            .map(|l| l.category_id)
            .collect();

        let mut results: Vec<MatchResult> = candidates
            .iter()
            .map(|candidate| {
                let mutual = match input.owner_listings.get(&candidate.user_id) {
                    Some(owner) => is_mutual(&input.user_listings, owner),
                    None => {
                        warn!(
                            owner_id = candidate.user_id,
                            listing_id = candidate.id,
                            "owner listings unavailable, treating match as one-way"
                        );
                        false
                    }
                };

                let breakdown = calculate_match_score(
                    candidate,
                    &interest_categories,
                    input.user_location,
                    preferences.max_distance_km,
                    mutual,
                    input.now,
                    &self.scoring,
                );

                MatchResult {
                    listing_id: candidate.id,
                    user_id: candidate.user_id,
                    match_score: breakdown.score,
                    distance_km: breakdown.distance_km,
                    match_type: if mutual {
                        MatchType::Mutual
                    } else {
                        MatchType::OneWay
                    },
                    match_reasons: breakdown.reasons,
                    category_id: candidate.category_id,
                    category_name: candidate.category_name.clone(),
                    created_at: candidate.created_at,
                }
            })
            .collect();

        // Score descending; ties broken by distance ascending with unknown
        // distances last, then by listing id for a stable total order
        results.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| compare_distance(a.distance_km, b.distance_km))
                .then_with(|| a.listing_id.cmp(&b.listing_id))
        });

        let filtered = apply_preference_filter(results, &preferences);
        classify(filtered)
    }
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingIntent;
    use chrono::Duration;

    fn listing(
        id: i64,
        user_id: i64,
        intent: ListingIntent,
        category_id: i64,
        coords: Option<(f64, f64)>,
        age_days: i64,
    ) -> Listing {
        Listing {
            id,
            user_id,
            tenant_id: 1,
            intent,
            category_id,
            category_name: format!("Category {}", category_id),
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            is_active: true,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn input_with(pool: Vec<Listing>, owner_listings: HashMap<i64, Vec<Listing>>) -> MatchInput {
        MatchInput {
            user_id: 1,
            now: Utc::now(),
            preferences: MatchPreferences::defaults_for(1),
            user_listings: vec![listing(
                1,
                1,
                ListingIntent::Request,
                5,
                Some((53.3498, -6.2603)),
                0,
            )],
            candidate_pool: pool,
            owner_listings,
            user_location: Some((53.3498, -6.2603)),
            hidden_listings: HashSet::new(),
        }
    }

    #[test]
    fn test_pipeline_produces_sorted_tiers() {
        let engine = MatchEngine::default();
        let pool = vec![
            // same category, ~3 km, fresh: hot
            listing(10, 2, ListingIntent::Offer, 5, Some((53.3768, -6.2603)), 0),
            // same category, ~15 km, fresh: good
            listing(11, 3, ListingIntent::Offer, 5, Some((53.4848, -6.2603)), 0),
        ];
        let tiers = engine.compute(&input_with(pool, HashMap::new()));

        assert_eq!(tiers.all.len(), 2);
        assert_eq!(tiers.all[0].listing_id, 10);
        assert!(tiers.all[0].match_score > tiers.all[1].match_score);
        assert_eq!(tiers.hot.len(), 1);
        assert_eq!(tiers.hot[0].listing_id, 10);
    }

    #[test]
    fn test_mutual_detection_flows_through() {
        let engine = MatchEngine::default();
        let mut input = input_with(
            vec![listing(
                10,
                2,
                ListingIntent::Offer,
                5,
                Some((53.3768, -6.2603)),
                0,
            )],
            HashMap::from([(
                2,
                vec![
                    listing(10, 2, ListingIntent::Offer, 5, None, 0),
                    listing(20, 2, ListingIntent::Request, 9, None, 0),
                ],
            )]),
        );
        // The user also offers category 9, which owner 2 requests
        input
            .user_listings
            .push(listing(2, 1, ListingIntent::Offer, 9, None, 0));

        let tiers = engine.compute(&input);
        assert_eq!(tiers.mutual.len(), 1);
        assert_eq!(tiers.mutual[0].match_type, MatchType::Mutual);
    }

    #[test]
    fn test_missing_owner_snapshot_degrades_to_one_way() {
        let engine = MatchEngine::default();
        let tiers = engine.compute(&input_with(
            vec![listing(
                10,
                2,
                ListingIntent::Offer,
                5,
                Some((53.3768, -6.2603)),
                0,
            )],
            HashMap::new(),
        ));
        assert_eq!(tiers.all.len(), 1);
        assert_eq!(tiers.all[0].match_type, MatchType::OneWay);
    }

    #[test]
    fn test_no_user_listings_yields_empty_tiers() {
        let engine = MatchEngine::default();
        let mut input = input_with(
            vec![listing(10, 2, ListingIntent::Offer, 5, None, 0)],
            HashMap::new(),
        );
        input.user_listings.clear();
        let tiers = engine.compute(&input);
        assert!(tiers.all.is_empty());
        assert_eq!(tiers.stats.total, 0);
    }

    #[test]
    fn test_preference_floor_excludes_low_scores() {
        let engine = MatchEngine::default();
        let mut input = input_with(
            // different category, stale, far inside bbox edge: low score
            vec![listing(
                10,
                2,
                ListingIntent::Offer,
                9,
                Some((53.53, -6.2603)),
                40,
            )],
            HashMap::new(),
        );
        input.preferences.min_match_score = 70;
        let tiers = engine.compute(&input);
        assert!(tiers.all.is_empty());
    }

    #[test]
    fn test_determinism_over_repeated_runs() {
        let engine = MatchEngine::default();
        let input = input_with(
            vec![
                listing(10, 2, ListingIntent::Offer, 5, Some((53.3768, -6.2603)), 2),
                listing(11, 3, ListingIntent::Offer, 5, Some((53.41, -6.2603)), 9),
                listing(12, 4, ListingIntent::Offer, 9, Some((53.36, -6.2603)), 1),
            ],
            HashMap::new(),
        );
        let first = engine.compute(&input);
        for _ in 0..3 {
            let again = engine.compute(&input);
            let ids =
                |t: &TieredMatches| t.all.iter().map(|r| r.listing_id).collect::<Vec<_>>();
            assert_eq!(ids(&first), ids(&again));
            let scores =
                |t: &TieredMatches| t.all.iter().map(|r| r.match_score).collect::<Vec<_>>();
            assert_eq!(scores(&first), scores(&again));
        }
    }
}
