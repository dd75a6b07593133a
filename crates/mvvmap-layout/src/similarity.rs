/// Scores how close two embeddings are, on the cosine convention (`[-1, 1]`, 1 = identical
/// direction).
///
/// The pipeline only consumes this; callers plug in whatever their embedding backend uses.
pub trait SimilarityProvider {
    fn similarity(&self, a: &[f64], b: &[f64]) -> f64;
}

impl<F> SimilarityProvider for F
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    fn similarity(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Plain cosine similarity.
///
/// Mismatched lengths and zero-norm vectors score 0.0 (unrelated) instead of NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl SimilarityProvider for CosineSimilarity {
    fn similarity(&self, a: &[f64], b: &[f64]) -> f64 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;
        for (x, y) in a.iter().zip(b) {
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        let denom = norm_a.sqrt() * norm_b.sqrt();
        if !(denom.is_finite() && denom > 0.0) {
            return 0.0;
        }
        (dot / denom).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_parallel_and_opposite_vectors() {
        let c = CosineSimilarity;
        assert!((c.similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-12);
        assert!((c.similarity(&[1.0, 0.0], &[-3.0, 0.0]) + 1.0).abs() < 1e-12);
        assert_eq!(c.similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_degenerate_inputs_score_zero() {
        let c = CosineSimilarity;
        assert_eq!(c.similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(c.similarity(&[1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(c.similarity(&[], &[]), 0.0);
    }

    #[test]
    fn closures_are_providers() {
        let constant = |_: &[f64], _: &[f64]| 0.5;
        assert_eq!(constant.similarity(&[1.0], &[2.0]), 0.5);
    }
}
