use nalgebra::Vector2;

use crate::config::RelaxationOptions;
use crate::matrix::DistanceMatrix;
use crate::model::Point;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelaxationStats {
    pub iterations: usize,
    /// Pair contributions dropped because a distance was non-finite or zero.
    pub skipped_pairs: usize,
    /// Point updates dropped because the summed force was non-finite.
    pub skipped_steps: usize,
}

#[derive(Debug, Clone, Copy)]
struct PointForce {
    force: Vector2<f64>,
    skipped_pairs: usize,
}

/// Damped, clamped gradient descent on `Σ (current - target)²`.
///
/// Always runs exactly `opts.iterations` passes. Each pass computes every point's net force from
/// the positions at the start of the pass, then moves all points and clamps them to
/// `±max_coordinate`. Bad pairs and bad steps are skipped rather than propagated.
pub fn relax(
    distances: &DistanceMatrix,
    positions: &mut [Point],
    opts: &RelaxationOptions,
) -> RelaxationStats {
    let n = positions.len().min(distances.len());
    let mut stats = RelaxationStats::default();
    if n < 2 {
        return stats;
    }

    let bound = opts.max_coordinate.abs();
    let mut snapshot: Vec<Vector2<f64>> = Vec::with_capacity(n);

    for _ in 0..opts.iterations {
        snapshot.clear();
        snapshot.extend(positions[..n].iter().map(|p| Vector2::new(p.x, p.y)));

        let forces = pass_forces(distances, &snapshot, opts);

        for (p, f) in positions[..n].iter_mut().zip(&forces) {
            stats.skipped_pairs += f.skipped_pairs;
            if f.force.x.is_finite() && f.force.y.is_finite() {
                p.x -= f.force.x;
                p.y -= f.force.y;
            } else {
                stats.skipped_steps += 1;
            }
            p.x = p.x.clamp(-bound, bound);
            p.y = p.y.clamp(-bound, bound);
        }
        stats.iterations += 1;
    }

    stats
}

#[cfg(not(feature = "parallel"))]
fn pass_forces(
    distances: &DistanceMatrix,
    snapshot: &[Vector2<f64>],
    opts: &RelaxationOptions,
) -> Vec<PointForce> {
    (0..snapshot.len())
        .map(|i| net_force(i, distances, snapshot, opts))
        .collect()
}

#[cfg(feature = "parallel")]
fn pass_forces(
    distances: &DistanceMatrix,
    snapshot: &[Vector2<f64>],
    opts: &RelaxationOptions,
) -> Vec<PointForce> {
    use rayon::prelude::*;

    (0..snapshot.len())
        .into_par_iter()
        .map(|i| net_force(i, distances, snapshot, opts))
        .collect()
}

fn net_force(
    i: usize,
    distances: &DistanceMatrix,
    snapshot: &[Vector2<f64>],
    opts: &RelaxationOptions,
) -> PointForce {
    let mut force = Vector2::<f64>::zeros();
    let mut skipped_pairs = 0usize;
    let pi = snapshot[i];

    for (j, pj) in snapshot.iter().enumerate() {
        if i == j {
            continue;
        }
        let delta = pi - pj;
        // `f64::max` swallows NaN, so check before flooring.
        let current = delta.norm();
        let target = distances.get(i, j) * opts.distance_scale;
        if !(current.is_finite() && target.is_finite()) {
            skipped_pairs += 1;
            continue;
        }
        let current = current.max(opts.min_distance);
        let target = target.max(opts.min_distance);
        if current == 0.0 {
            skipped_pairs += 1;
            continue;
        }

        // Positive when the pair sits farther apart than its target (pull), negative when too
        // close (push).
        let raw = (current - target) / current;
        let damped = raw.clamp(-opts.max_force_magnitude, opts.max_force_magnitude);
        let contribution = delta * (damped * opts.learning_rate);
        if contribution.x.is_finite() && contribution.y.is_finite() {
            force += contribution;
        } else {
            skipped_pairs += 1;
        }
    }

    PointForce {
        force,
        skipped_pairs,
    }
}
