#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("similarity matrix must be square: row {row} has {len} columns, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("similarity matrix is not symmetric at ({i}, {j}): {a} != {b}")]
    Asymmetric { i: usize, j: usize, a: f64, b: f64 },

    #[error("invalid layout config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
