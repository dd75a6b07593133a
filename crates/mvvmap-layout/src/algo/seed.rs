use std::f64::consts::TAU;

use crate::model::Point;

/// Deterministic start positions: index `i` sits at angle `2π·i/n` on one of three nested
/// rings (`radius + (i mod 3)·step`), so no start configuration is collinear.
pub fn seed_positions(n: usize, radius: f64, step: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let r = radius + ((i % 3) as f64) * step;
            on_circle(i, n, r)
        })
        .collect()
}

/// Single-ring placement used by the degeneracy fallback.
pub fn circle_positions(n: usize, radius: f64) -> Vec<Point> {
    (0..n).map(|i| on_circle(i, n, radius)).collect()
}

fn on_circle(i: usize, n: usize, r: f64) -> Point {
    let theta = TAU * (i as f64) / (n.max(1) as f64);
    Point::new(r * theta.cos(), r * theta.sin())
}
