use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Twelve distinct hues; clusters past the end wrap around.
pub const DEFAULT_PALETTE: [&str; 12] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#06B6D4", "#84CC16",
    "#F97316", "#6366F1", "#14B8A6", "#A855F7",
];

/// Named tunings of the relaxation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPreset {
    /// Wide target distances with a narrow damping band; slow, smooth convergence.
    #[default]
    CompetitiveMap,
    /// Fewer, stronger passes over a tighter target scale.
    SimilarityCanvas,
}

impl std::str::FromStr for LayoutPreset {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "competitive-map" | "competitive_map" | "map" => Ok(Self::CompetitiveMap),
            "similarity-canvas" | "similarity_canvas" | "canvas" => Ok(Self::SimilarityCanvas),
            _ => Err(()),
        }
    }
}

/// Parameters of the stress-relaxation pass loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelaxationOptions {
    /// Exact number of passes; there is no early exit.
    pub iterations: usize,
    pub learning_rate: f64,
    /// Floor for both the current and the target pair distance.
    pub min_distance: f64,
    /// Symmetric damping band applied to the per-pair relative force.
    pub max_force_magnitude: f64,
    /// Per-axis coordinate bound enforced after every point update.
    pub max_coordinate: f64,
    /// Multiplier turning a dissimilarity in `[0, 2]` into a screen distance.
    pub distance_scale: f64,
}

impl Default for RelaxationOptions {
    fn default() -> Self {
        Self::for_preset(LayoutPreset::CompetitiveMap)
    }
}

impl RelaxationOptions {
    pub fn for_preset(preset: LayoutPreset) -> Self {
        match preset {
            LayoutPreset::CompetitiveMap => Self {
                iterations: 50,
                learning_rate: 0.05,
                min_distance: 0.1,
                max_force_magnitude: 0.1,
                max_coordinate: 200.0,
                distance_scale: 100.0,
            },
            LayoutPreset::SimilarityCanvas => Self {
                iterations: 30,
                learning_rate: 0.1,
                min_distance: 0.1,
                max_force_magnitude: 5.0,
                max_coordinate: 200.0,
                distance_scale: 50.0,
            },
        }
    }
}

/// Full pipeline configuration. Every field has a default so partial JSON5 files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(flatten)]
    pub relaxation: RelaxationOptions,
    /// Radius of the innermost seed circle.
    pub seed_radius: f64,
    /// Radius added per `i mod 3` ring.
    pub seed_radius_step: f64,
    /// Normalized coordinates land in `[-normalized_range, normalized_range]`.
    pub normalized_range: f64,
    /// Circle radius used when the relaxed layout is degenerate.
    pub fallback_radius: f64,
    pub palette: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::preset(LayoutPreset::default())
    }
}

impl LayoutConfig {
    pub fn preset(preset: LayoutPreset) -> Self {
        Self {
            relaxation: RelaxationOptions::for_preset(preset),
            seed_radius: 50.0,
            seed_radius_step: 10.0,
            normalized_range: 80.0,
            fallback_radius: 60.0,
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Rejects values that would make the output unbounded or meaningless.
    pub fn validate(&self) -> Result<()> {
        let r = &self.relaxation;
        positive("learningRate", r.learning_rate)?;
        positive("minDistance", r.min_distance)?;
        positive("maxForceMagnitude", r.max_force_magnitude)?;
        positive("maxCoordinate", r.max_coordinate)?;
        positive("distanceScale", r.distance_scale)?;
        positive("seedRadius", self.seed_radius)?;
        non_negative("seedRadiusStep", self.seed_radius_step)?;
        positive("normalizedRange", self.normalized_range)?;
        positive("fallbackRadius", self.fallback_radius)?;
        if self.fallback_radius > self.normalized_range {
            return Err(Error::InvalidConfig {
                field: "fallbackRadius",
                reason: "must not exceed normalizedRange",
            });
        }
        if self.palette.iter().all(|c| c.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                field: "palette",
                reason: "must contain at least one color",
            });
        }
        Ok(())
    }

    /// Color for a cluster id; wraps past the end of the palette.
    pub fn color_for(&self, cluster_id: usize) -> String {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[cluster_id % DEFAULT_PALETTE.len()].to_string();
        }
        self.palette[cluster_id % self.palette.len()].clone()
    }
}

fn positive(field: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            reason: "must be a finite number greater than zero",
        })
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            reason: "must be a finite, non-negative number",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        LayoutConfig::default().validate().unwrap();
        LayoutConfig::preset(LayoutPreset::SimilarityCanvas)
            .validate()
            .unwrap();
        assert!(DEFAULT_PALETTE.len() >= 10);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{ "iterations": 12, "normalizedRange": 40 }"#).unwrap();
        assert_eq!(cfg.relaxation.iterations, 12);
        assert_eq!(cfg.normalized_range, 40.0);
        assert_eq!(cfg.relaxation.distance_scale, 100.0);
        assert_eq!(cfg.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn validate_rejects_non_positive_scale() {
        let mut cfg = LayoutConfig::default();
        cfg.relaxation.distance_scale = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidConfig {
                field: "distanceScale",
                ..
            })
        ));

        let mut cfg = LayoutConfig::default();
        cfg.palette = vec![" ".to_string()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn palette_wraps() {
        let mut cfg = LayoutConfig::default();
        cfg.palette = vec!["red".into(), "blue".into()];
        assert_eq!(cfg.color_for(0), "red");
        assert_eq!(cfg.color_for(3), "blue");
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!(
            "canvas".parse::<LayoutPreset>(),
            Ok(LayoutPreset::SimilarityCanvas)
        );
        assert_eq!(
            "Competitive-Map".parse::<LayoutPreset>(),
            Ok(LayoutPreset::CompetitiveMap)
        );
        assert!("spiral".parse::<LayoutPreset>().is_err());
    }
}
