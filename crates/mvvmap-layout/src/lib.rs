#![forbid(unsafe_code)]

//! Headless similarity-to-layout engine.
//!
//! Turns a pairwise similarity matrix over organizations into bounded 2D map coordinates
//! (damped stress relaxation), a per-entity uniqueness score and category clusters. The engine
//! is pure: every call recomputes from scratch and identical input yields identical output.

pub mod algo;
pub mod cluster;
pub mod config;
pub mod error;
pub mod matrix;
pub mod model;
pub mod pipeline;
pub mod similarity;
pub mod uniqueness;
pub mod view;

pub use config::{DEFAULT_PALETTE, LayoutConfig, LayoutPreset, RelaxationOptions};
pub use error::{Error, Result};
pub use matrix::{DISTANCE_EPSILON, DistanceMatrix, SimilarityMatrix};
pub use model::{ClusterGroup, Entity, MapLayout, Point, Position, UNCLASSIFIED};
pub use pipeline::{MIN_ENTITIES, build_map, build_map_from_matrix, valid_entities};
pub use similarity::{CosineSimilarity, SimilarityProvider};
pub use uniqueness::{TextFeatures, text_feature_scores, uniqueness_scores};
pub use view::{ViewState, Viewport};

/// Headless entry point: lays out `entities` using cosine similarity over their embeddings.
pub fn layout(entities: &[Entity], config: &LayoutConfig) -> MapLayout {
    build_map(entities, &CosineSimilarity, config)
}
