//! # Shapley Attribution Engine
//!
//! Exact cooperative-game attribution over channel combinations. Each
//! distinct combination of channels observed among converted journeys is a
//! game: the channels are the players, the characteristic function `v(S)` is
//! looked up from the conversion table (or an external value table), and each
//! channel receives its exact Shapley value: its marginal contribution
//! averaged over every coalition, computed by iterative bitmask enumeration
//! of all `2^n` subsets with factorial weighting instead of materializing
//! permutations.
//!
//! Cost is `O(2^n · n)` per combination, so `max_coalition_size` is a
//! mandatory safety valve: oversized combinations fail fast with
//! `CoalitionExplosion` unless truncation to the most recent channels is
//! explicitly enabled.

pub mod engine;
pub mod error;
pub mod report;
pub mod table;

pub use engine::{ShapleyConfig, ShapleyEngine, COALITION_CEILING};
pub use error::ShapleyError;
pub use report::{CombinationAttribution, ShapleyAttribution};
pub use table::{CombinationStats, ConversionTable};
