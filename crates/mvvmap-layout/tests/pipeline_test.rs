use mvvmap_layout::algo::{relax, seed_positions};
use mvvmap_layout::{
    CosineSimilarity, Entity, LayoutConfig, LayoutPreset, MapLayout, RelaxationOptions,
    SimilarityMatrix, build_map, build_map_from_matrix, layout,
};
use std::collections::BTreeSet;

fn abc() -> (Vec<Entity>, SimilarityMatrix) {
    let entities = vec![
        Entity::new("a", "Alpha").with_category("Retail"),
        Entity::new("b", "Beta").with_category("Retail"),
        Entity::new("c", "Gamma").with_category("Energy"),
    ];
    let sim = SimilarityMatrix::from_rows(&[
        vec![1.0, 0.9, 0.1],
        vec![0.9, 1.0, 0.2],
        vec![0.1, 0.2, 1.0],
    ])
    .unwrap();
    (entities, sim)
}

/// Twelve organizations with smooth, deterministic 8-dimensional embeddings.
fn synthetic_entities() -> Vec<Entity> {
    let categories = ["Finance", "Retail", "Energy", "Health", ""];
    (0..12)
        .map(|i| {
            let embedding: Vec<f64> = (0..8)
                .map(|k| ((i as f64) * 0.7 + (k as f64) * 1.3).sin() + 0.1 * (k as f64))
                .collect();
            let mut e = Entity::new(format!("company_{}", i + 1), format!("Company {i}"))
                .with_embedding(embedding);
            if !categories[i % 5].is_empty() {
                e = e.with_category(categories[i % 5]);
            }
            e
        })
        .collect()
}

fn dist(map: &MapLayout, a: &str, b: &str) -> f64 {
    let pa = map.position(a).unwrap().point();
    let pb = map.position(b).unwrap().point();
    pa.distance(&pb)
}

#[test]
fn near_identical_pair_ends_up_closest() {
    for preset in [LayoutPreset::CompetitiveMap, LayoutPreset::SimilarityCanvas] {
        let (entities, sim) = abc();
        let map = build_map_from_matrix(&entities, &sim, &LayoutConfig::preset(preset));
        assert!(!map.fallback_applied, "{preset:?}");
        let ab = dist(&map, "a", "b");
        assert!(ab < dist(&map, "a", "c"), "{preset:?}: ab={ab}");
        assert!(ab < dist(&map, "b", "c"), "{preset:?}: ab={ab}");
    }
}

#[test]
fn abc_scores_and_clusters() {
    let (entities, sim) = abc();
    let map = build_map_from_matrix(&entities, &sim, &LayoutConfig::default());
    assert_eq!(map.positions.len(), 3);
    assert_eq!(map.clusters.len(), 2);
    assert_eq!(map.clusters[0].category, "Retail");
    assert_eq!(map.clusters[1].category, "Energy");
    assert_eq!(map.position("c").unwrap().cluster_id, 1);
    let c = map.position("c").unwrap().uniqueness_score;
    let a = map.position("a").unwrap().uniqueness_score;
    assert!(c > a, "distinct entity should score higher: c={c} a={a}");
}

#[test]
fn uniform_similarity_terminates_with_finite_bounded_coordinates() {
    let n = 9;
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.5 }).collect())
        .collect();
    let sim = SimilarityMatrix::from_rows(&rows).unwrap();
    let entities: Vec<Entity> = (0..n).map(|i| Entity::new(i.to_string(), "x")).collect();
    let config = LayoutConfig::default();
    let map = build_map_from_matrix(&entities, &sim, &config);
    assert_eq!(map.positions.len(), n);
    for p in &map.positions {
        assert!(p.x.is_finite() && p.y.is_finite(), "{p:?}");
        assert!(p.x.abs() <= config.normalized_range && p.y.abs() <= config.normalized_range);
    }
    assert_eq!(map.clusters.len(), 1);
    assert_eq!(map.clusters[0].category, "Unclassified");
}

#[test]
fn missing_embeddings_give_an_empty_result() {
    let entities: Vec<Entity> = (0..5)
        .map(|i| Entity::new(i.to_string(), "no vector").with_category("Retail"))
        .collect();
    let map = layout(&entities, &LayoutConfig::default());
    assert!(map.positions.is_empty());
    assert!(map.clusters.is_empty());
    assert!(!map.fallback_applied);
}

#[test]
fn output_sizes_and_cluster_partition() {
    let entities = synthetic_entities();
    let map = layout(&entities, &LayoutConfig::default());
    assert_eq!(map.positions.len(), entities.len());

    let categories: BTreeSet<&str> = entities.iter().map(|e| e.category_or_default()).collect();
    assert_eq!(map.clusters.len(), categories.len());

    let mut seen: Vec<&str> = map
        .clusters
        .iter()
        .flat_map(|c| c.member_ids.iter().map(String::as_str))
        .collect();
    let total = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(total, seen.len(), "a member appears in two clusters");
    let ids: Vec<&str> = {
        let mut v: Vec<&str> = map.positions.iter().map(|p| p.id.as_str()).collect();
        v.sort_unstable();
        v
    };
    assert_eq!(seen, ids);

    for p in &map.positions {
        let cluster = map.cluster(p.cluster_id).expect("cluster exists");
        assert!(cluster.member_ids.contains(&p.id));
        assert_eq!(cluster.category, p.category);
        assert!((0.0..=1.0).contains(&p.uniqueness_score));
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let entities = synthetic_entities();
    for preset in [LayoutPreset::CompetitiveMap, LayoutPreset::SimilarityCanvas] {
        let config = LayoutConfig::preset(preset);
        let first = build_map(&entities, &CosineSimilarity, &config);
        let second = build_map(&entities, &CosineSimilarity, &config);
        assert_eq!(first.positions.len(), second.positions.len());
        for (a, b) in first.positions.iter().zip(&second.positions) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.cluster_id, b.cluster_id);
        }
        assert_eq!(first, second);
    }
}

#[test]
fn relaxation_never_leaves_the_coordinate_bound() {
    let entities = synthetic_entities();
    let sim = SimilarityMatrix::from_entities(&entities, &CosineSimilarity);
    let distances = sim.to_distances();
    let opts = RelaxationOptions {
        iterations: 1,
        max_force_magnitude: 5.0,
        learning_rate: 0.3,
        max_coordinate: 90.0,
        ..RelaxationOptions::default()
    };
    let mut points = seed_positions(entities.len(), 50.0, 10.0);
    for _ in 0..60 {
        relax(&distances, &mut points, &opts);
        for p in &points {
            assert!(p.x.abs() <= 90.0 && p.y.abs() <= 90.0, "{p:?}");
        }
    }
}

#[test]
fn custom_provider_is_used() {
    let entities: Vec<Entity> = (0..4)
        .map(|i| Entity::new(format!("e{i}"), "x").with_embedding(vec![i as f64]))
        .collect();
    // Entities 0 and 1 are "the same"; everything else is unrelated.
    let provider = |a: &[f64], b: &[f64]| {
        let pair = (a[0].min(b[0]) as i64, a[0].max(b[0]) as i64);
        if pair == (0, 1) { 1.0 } else { 0.0 }
    };
    let map = build_map(&entities, &provider, &LayoutConfig::default());
    assert_eq!(map.positions.len(), 4);
    let near = dist(&map, "e0", "e1");
    assert!(near < dist(&map, "e0", "e2"));
    assert!(near < dist(&map, "e1", "e3"));
}

#[test]
fn layout_serializes_with_camel_case_keys() {
    let (entities, sim) = abc();
    let map = build_map_from_matrix(&entities, &sim, &LayoutConfig::default());
    let json = serde_json::to_value(&map).unwrap();
    assert!(json["positions"][0]["uniquenessScore"].is_number());
    assert!(json["positions"][0]["clusterId"].is_number());
    assert!(json["clusters"][0]["memberIds"].is_array());
    assert_eq!(json["fallbackApplied"], serde_json::Value::Bool(false));
}
