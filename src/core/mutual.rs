use std::collections::HashSet;

use crate::models::{Listing, ListingIntent};

/// Decide whether two users form a reciprocal match: the user offers a
/// category the candidate's owner has an open request for, AND the owner
/// offers a category the user has an open request for.
///
/// Pure over the two listing snapshots and symmetric by construction:
/// swapping the arguments yields the same answer.
pub fn is_mutual(user_listings: &[Listing], owner_listings: &[Listing]) -> bool {
    if user_listings.is_empty() || owner_listings.is_empty() {
        return false;
    }

    let user_offers = categories_of(user_listings, ListingIntent::Offer);
    let user_requests = categories_of(user_listings, ListingIntent::Request);
    let owner_offers = categories_of(owner_listings, ListingIntent::Offer);
    let owner_requests = categories_of(owner_listings, ListingIntent::Request);

    let owner_needs_user = user_offers.intersection(&owner_requests).next().is_some();
    let user_needs_owner = owner_offers.intersection(&user_requests).next().is_some();

    owner_needs_user && user_needs_owner
}

fn categories_of(listings: &[Listing], intent: ListingIntent) -> HashSet<i64> {
    listings
        .iter()
        .filter(|l| l.is_active && l.intent == intent)
        .map(|l| l.category_id)
        .collect()
}
