use rustc_hash::FxHashSet;

use crate::algo::{normalize, relax, seed_positions};
use crate::cluster::aggregate_clusters;
use crate::config::LayoutConfig;
use crate::matrix::SimilarityMatrix;
use crate::model::{Entity, MapLayout, Position};
use crate::similarity::SimilarityProvider;
use crate::uniqueness::uniqueness_scores;

/// Fewest entities the relaxation is attempted for.
pub const MIN_ENTITIES: usize = 3;

/// Entities usable for the embedding path: non-empty embedding, first occurrence of each id.
pub fn valid_entities(entities: &[Entity]) -> Vec<Entity> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut out = Vec::with_capacity(entities.len());
    for e in entities {
        if !e.has_embedding() {
            continue;
        }
        if !seen.insert(e.id.as_str()) {
            tracing::warn!(id = %e.id, "duplicate entity id; keeping the first occurrence");
            continue;
        }
        out.push(e.clone());
    }
    out
}

/// Runs the full pipeline from embeddings: filter, score pairs with `provider`, lay out.
///
/// Returns an empty layout when fewer than [`MIN_ENTITIES`] entities carry an embedding.
pub fn build_map(
    entities: &[Entity],
    provider: &dyn SimilarityProvider,
    config: &LayoutConfig,
) -> MapLayout {
    let valid = valid_entities(entities);
    if valid.len() < MIN_ENTITIES {
        tracing::warn!(
            total = entities.len(),
            with_embedding = valid.len(),
            required = MIN_ENTITIES,
            "not enough entities with embeddings for a similarity map"
        );
        return MapLayout::empty();
    }
    let similarity = SimilarityMatrix::from_entities(&valid, provider);
    build_map_from_matrix(&valid, &similarity, config)
}

/// Lays out `entities` against a precomputed similarity matrix (row `i` ↔ `entities[i]`).
///
/// Returns an empty layout when `config` fails [`LayoutConfig::validate`], the matrix and entity
/// counts differ, or there are fewer than [`MIN_ENTITIES`] entities. Never fails: numerical
/// trouble is absorbed by the relaxation and the normalizer fallback.
pub fn build_map_from_matrix(
    entities: &[Entity],
    similarity: &SimilarityMatrix,
    config: &LayoutConfig,
) -> MapLayout {
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, "rejecting layout config");
        return MapLayout::empty();
    }
    let n = entities.len();
    if similarity.len() != n {
        tracing::warn!(
            entities = n,
            matrix = similarity.len(),
            "similarity matrix does not match the entity count"
        );
        return MapLayout::empty();
    }
    if n < MIN_ENTITIES {
        tracing::warn!(
            entities = n,
            required = MIN_ENTITIES,
            "not enough entities for a similarity map"
        );
        return MapLayout::empty();
    }

    let distances = similarity.to_distances();
    let mut points = seed_positions(n, config.seed_radius, config.seed_radius_step);
    let stats = relax(&distances, &mut points, &config.relaxation);
    if stats.skipped_pairs > 0 || stats.skipped_steps > 0 {
        tracing::debug!(
            skipped_pairs = stats.skipped_pairs,
            skipped_steps = stats.skipped_steps,
            "relaxation skipped non-finite contributions"
        );
    }

    let normalized = normalize(&points, config.normalized_range, config.fallback_radius);
    if normalized.fallback_applied {
        tracing::debug!(entities = n, "relaxed layout collapsed; using circular fallback");
    }

    let scores = uniqueness_scores(similarity);
    let mut positions: Vec<Position> = entities
        .iter()
        .zip(normalized.points)
        .zip(scores)
        .map(|((e, p), score)| Position {
            id: e.id.clone(),
            name: e.name.clone(),
            category: e.category_or_default().to_string(),
            x: p.x,
            y: p.y,
            uniqueness_score: score,
            cluster_id: 0,
        })
        .collect();
    let clusters = aggregate_clusters(&mut positions, config);

    tracing::trace!(
        entities = n,
        clusters = clusters.len(),
        iterations = stats.iterations,
        "similarity map built"
    );

    MapLayout {
        positions,
        clusters,
        fallback_applied: normalized.fallback_applied,
    }
}
