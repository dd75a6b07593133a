use serde::{Deserialize, Serialize};

use crate::matrix::SimilarityMatrix;

/// `1 - mean(similarity to every other entity)`, clamped to `[0, 1]`.
///
/// Independent of the layout. Non-finite similarities count as 0 (unrelated). A matrix with a
/// single entity (or none) scores 0.
pub fn uniqueness_scores(similarity: &SimilarityMatrix) -> Vec<f64> {
    let n = similarity.len();
    if n <= 1 {
        return vec![0.0; n];
    }
    let others = (n - 1) as f64;
    (0..n)
        .map(|i| {
            let sum: f64 = (0..n)
                .filter(|&j| j != i)
                .map(|j| {
                    let s = similarity.get(i, j);
                    if s.is_finite() { s } else { 0.0 }
                })
                .sum();
            (1.0 - sum / others).clamp(0.0, 1.0)
        })
        .collect()
}

/// Character counts of a profile's text sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFeatures {
    pub mission_len: usize,
    pub vision_len: usize,
    pub values_len: usize,
}

impl TextFeatures {
    pub fn total(&self) -> usize {
        self.mission_len + self.vision_len + self.values_len
    }
}

/// Distinctiveness for profiles that have no embedding layout: how far an entity's total text
/// length sits from the mean, relative to the largest such deviation. Always in `[0, 1]`; all
/// zeros when every total is equal.
pub fn text_feature_scores(features: &[TextFeatures]) -> Vec<f64> {
    if features.is_empty() {
        return Vec::new();
    }
    let totals: Vec<f64> = features.iter().map(|f| f.total() as f64).collect();
    let mean = totals.iter().sum::<f64>() / (totals.len() as f64);
    let max_dev = totals
        .iter()
        .map(|t| (t - mean).abs())
        .fold(0.0f64, f64::max);
    if max_dev <= 0.0 {
        return vec![0.0; totals.len()];
    }
    totals
        .iter()
        .map(|t| ((t - mean).abs() / max_dev).clamp(0.0, 1.0))
        .collect()
}
