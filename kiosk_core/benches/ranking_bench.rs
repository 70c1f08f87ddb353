use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kiosk_core::config::{KioskConfig, SearchCriterion};
use kiosk_core::feature::RawFeature;
use kiosk_core::geometry::RawGeometry;
use kiosk_core::ranking::RankingEngine;
use kiosk_core::types::{ClassId, FeatureId};
use serde_json::{Map, Value};

const KEYS: [&str; 6] = ["area", "price", "noise", "green", "transit", "schools"];

fn make_sites(n: usize) -> Vec<RawFeature> {
    (0..n)
        .map(|i| {
            let x = (i % 100) as f64 * 150.0;
            let y = (i / 100) as f64 * 150.0;
            let mut properties = Map::new();
            for (k, key) in KEYS.iter().enumerate() {
                // Deterministic spread of values per criterion
                let v = ((i * 37 + k * 101) % 997) as i64;
                properties.insert(key.to_string(), Value::from(v));
            }
            RawFeature {
                kind: "Feature".into(),
                id: Some(FeatureId::Number(i as i64)),
                geometry: RawGeometry::Polygon(vec![vec![
                    vec![x, y],
                    vec![x + 100.0, y],
                    vec![x + 100.0, y + 100.0],
                    vec![x, y + 100.0],
                    vec![x, y],
                ]]),
                properties,
            }
        })
        .collect()
}

fn bench_ranking(c: &mut Criterion) {
    let criteria = KEYS
        .iter()
        .enumerate()
        .map(|(i, k)| SearchCriterion::new(k, 10 + i as i32, "0, 0, 0"))
        .collect();
    let config = KioskConfig::new(criteria, ClassId(1), ClassId(2));

    let mut group = c.benchmark_group("ranking");

    for n in [100, 1000, 10000] {
        let mut engine = RankingEngine::new(&config);
        engine.load_features(&make_sites(n)).expect("valid sites");
        engine.calculate_max_values();
        engine.update_target_criteria("price", 0.3).expect("known key");
        engine.update_target_criteria("green", 0.8).expect("known key");

        group.bench_function(format!("best_match_{n}_sites"), |b| {
            b.iter(|| black_box(engine.best_match().expect("maxima computed")));
        });
        group.bench_function(format!("ranked_top10_{n}_sites"), |b| {
            b.iter(|| black_box(engine.ranked(10).expect("maxima computed")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ranking);
criterion_main!(benches);
