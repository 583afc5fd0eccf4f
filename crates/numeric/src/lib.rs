//! # Numeric Kernel
//!
//! The numerical and combinatorial routines shared by both attribution
//! engines: row normalization and the matrix-power-to-infinity limit for the
//! Markov engine, exact factorial coalition weights for the Shapley engine.
//!
//! This is a pure computation crate with no knowledge of journeys or
//! channels; it operates on anonymous `DMatrix<f64>` values so the fragile
//! numerical path can be tested independently with synthetic matrices.

pub mod error;
pub mod matrix;
pub mod weights;

pub use error::NumericError;
pub use matrix::{normalize_rows, power_to_infinity, AbsorbingLimit};
pub use weights::{exclusion_weight, inclusion_weight};
