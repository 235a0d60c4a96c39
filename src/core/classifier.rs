use crate::models::{
    MatchResult, MatchStats, TieredMatches, GOOD_SCORE_THRESHOLD, HOT_SCORE_THRESHOLD,
};

/// Bucket preference-filtered results into the four tiers.
///
/// The single source of truth for tier membership, so the API response and
/// the notification pipeline can never disagree:
/// - Hot: score >= 85
/// - Good: 70 <= score < 85 (disjoint from Hot by construction)
/// - Mutual: orthogonal tag, may co-occur with Hot or Good
/// - All: everything that passed the preference floor
///
/// Input order is preserved in every bucket; callers sort before
/// classifying.
pub fn classify(results: Vec<MatchResult>) -> TieredMatches {
    let mut tiers = TieredMatches {
        stats: MatchStats {
            total: results.len(),
        },
        ..Default::default()
    };

    for result in results {
        if result.match_score >= HOT_SCORE_THRESHOLD {
            tiers.hot.push(result.clone());
        } else if result.match_score >= GOOD_SCORE_THRESHOLD {
            tiers.good.push(result.clone());
        }
        if result.is_mutual() {
            tiers.mutual.push(result.clone());
        }
        tiers.all.push(result);
    }

    tiers
}
