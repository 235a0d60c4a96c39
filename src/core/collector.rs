use std::collections::HashSet;

use crate::core::distance::{bounding_box, within_bounding_box};
use crate::models::{Listing, ListingIntent, MatchPreferences, MatchResult};

/// Select the candidates worth scoring for a user, from a pre-fetched pool.
///
/// A candidate survives when it is (a) active, (b) of an intent opposite to
/// one the user has open (a user holding both intents is evaluated against
/// both), (c) owned by someone else, and (d) not hidden/declined by the
/// user. When the user has coordinates, candidates with coordinates must
/// also fall inside the coarse bounding box; candidates without coordinates
/// pass and keep an unknown distance. Zero listings in means zero
/// candidates out, never an error.
pub fn collect_candidates(
    user_id: i64,
    user_listings: &[Listing],
    pool: &[Listing],
    user_location: Option<(f64, f64)>,
    preferences: &MatchPreferences,
    hidden: &HashSet<i64>,
) -> Vec<Listing> {
    let wanted_intents: HashSet<ListingIntent> = user_listings
        .iter()
        .filter(|l| l.is_active)
        .map(|l| l.intent.opposite())
        .collect();

    if wanted_intents.is_empty() {
        return Vec::new();
    }

    let bbox = user_location
        .map(|(lat, lon)| bounding_box(lat, lon, preferences.max_distance_km as f64));

    let mut seen_ids = HashSet::new();
    pool.iter()
        .filter(|c| c.is_active)
        .filter(|c| wanted_intents.contains(&c.intent))
        .filter(|c| c.user_id != user_id)
        .filter(|c| !hidden.contains(&c.id))
        .filter(|c| match (&bbox, c.coordinates()) {
            (Some(bbox), Some((lat, lon))) => within_bounding_box(lat, lon, bbox),
            // No geo data on either side: keep, distance stays unknown
            _ => true,
        })
        .filter(|c| seen_ids.insert(c.id))
        .cloned()
        .collect()
}

/// Narrow scored results to what the stored preferences allow, in order:
/// distance ceiling (only when distance is known), score floor, category
/// whitelist. Shapes the returned set only; listings are never mutated.
pub fn apply_preference_filter(
    results: Vec<MatchResult>,
    preferences: &MatchPreferences,
) -> Vec<MatchResult> {
    results
        .into_iter()
        .filter(|r| match r.distance_km {
            Some(d) => d <= preferences.max_distance_km as f64,
            None => true,
        })
        .filter(|r| r.match_score >= preferences.min_match_score)
        .filter(|r| {
            preferences.category_filter.is_empty()
                || preferences.category_filter.contains(&r.category_id)
        })
        .collect()
}
