pub mod normalize;
pub mod seed;
pub mod stress;

pub use normalize::{Normalized, normalize};
pub use seed::{circle_positions, seed_positions};
pub use stress::{RelaxationStats, relax};
