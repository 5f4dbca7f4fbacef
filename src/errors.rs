//! Validation errors

use std::fmt::Display;

/// Ways the per-face topology and the flat normal array can disagree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SmoothingDataError {
    /// (TruncatedNormalArray) The flat array length is not a multiple of 3
    TruncatedNormalArray { len: usize },
    /// (NormalCountMismatch) Normal count differs from the total corner count
    NormalCountMismatch { expected: usize, actual: usize },
}

impl Display for SmoothingDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmoothingDataError::TruncatedNormalArray { len } => write!(
                f,
                "(TruncatedNormalArray) Flat normal array of {} floats is not a whole number of xyz triplets",
                len
            ),
            SmoothingDataError::NormalCountMismatch { expected, actual } => write!(
                f,
                "(NormalCountMismatch) Faces reference {} corner normals but {} were supplied",
                expected, actual
            ),
        }
    }
}
