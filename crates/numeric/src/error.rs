use thiserror::Error;

#[derive(Error, Debug)]
pub enum NumericError {
    #[error("Matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },

    #[error("Pseudo-inverse fallback failed: {0}")]
    PseudoInverse(String),
}
