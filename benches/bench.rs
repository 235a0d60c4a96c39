// Criterion benchmarks for Nexus Match

use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nexus_match::core::{bounding_box, haversine_distance, MatchEngine, MatchInput};
use nexus_match::models::{Listing, ListingIntent, MatchPreferences};

fn create_candidate(id: usize, lat: f64, lon: f64) -> Listing {
    Listing {
        id: id as i64 + 100,
        user_id: id as i64 + 2,
        tenant_id: 1,
        intent: ListingIntent::Offer,
        category_id: if id % 3 == 0 { 5 } else { 9 },
        category_name: "Gardening".to_string(),
        latitude: Some(lat),
        longitude: Some(lon),
        is_active: true,
        created_at: Utc::now() - Duration::days((id % 30) as i64),
    }
}

fn create_input(pool: Vec<Listing>) -> MatchInput {
    MatchInput {
        user_id: 1,
        now: Utc::now(),
        preferences: MatchPreferences::defaults_for(1),
        user_listings: vec![Listing {
            id: 1,
            user_id: 1,
            tenant_id: 1,
            intent: ListingIntent::Request,
            category_id: 5,
            category_name: "Gardening".to_string(),
            latitude: Some(53.3498),
            longitude: Some(-6.2603),
            is_active: true,
            created_at: Utc::now(),
        }],
        candidate_pool: pool,
        owner_listings: HashMap::new(),
        user_location: Some((53.3498, -6.2603)),
        hidden_listings: HashSet::new(),
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(53.3498),
                black_box(-6.2603),
                black_box(53.36),
                black_box(-6.25),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| bounding_box(black_box(53.3498), black_box(-6.2603), black_box(25.0)));
    });
}

fn bench_match_computation(c: &mut Criterion) {
    let engine = MatchEngine::default();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let pool: Vec<Listing> = (0..*candidate_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.3;
                let lon_offset = (i as f64 * 0.001) % 0.3;
                create_candidate(i, 53.3498 + lat_offset, -6.2603 + lon_offset)
            })
            .collect();
        let input = create_input(pool);

        group.bench_with_input(
            BenchmarkId::new("compute", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| engine.compute(black_box(&input)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_match_computation
);

criterion_main!(benches);
