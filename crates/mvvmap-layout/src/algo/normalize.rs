use crate::algo::seed::circle_positions;
use crate::model::Point;

/// Spans at or below this are treated as collapsed.
const MIN_SPAN: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub points: Vec<Point>,
    pub fallback_applied: bool,
}

/// Rescales each axis independently into `[-range, range]` from the empirical min/max of the
/// finite coordinates. A lone non-finite coordinate maps to the centre.
///
/// When nothing finite is left, or either axis has collapsed, the relaxed layout is discarded
/// and the points are placed on a circle of `fallback_radius`.
pub fn normalize(points: &[Point], range: f64, fallback_radius: f64) -> Normalized {
    let fallback = || Normalized {
        points: circle_positions(points.len(), fallback_radius),
        fallback_applied: true,
    };

    let Some((min_x, max_x)) = finite_extent(points.iter().map(|p| p.x)) else {
        return fallback();
    };
    let Some((min_y, max_y)) = finite_extent(points.iter().map(|p| p.y)) else {
        return fallback();
    };
    let span_x = max_x - min_x;
    let span_y = max_y - min_y;
    if !(span_x > MIN_SPAN && span_y > MIN_SPAN) {
        return fallback();
    }

    let width = range * 2.0;
    let scale = |v: f64, min: f64, span: f64| -> f64 {
        if !v.is_finite() {
            return 0.0;
        }
        (((v - min) / span - 0.5) * width).clamp(-range, range)
    };

    Normalized {
        points: points
            .iter()
            .map(|p| Point::new(scale(p.x, min_x, span_x), scale(p.y, min_y, span_y)))
            .collect(),
        fallback_applied: false,
    }
}

fn finite_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min <= max).then_some((min, max))
}
