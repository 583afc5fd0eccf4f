//! # Core Types
//!
//! Foundational data types shared by every attribution engine in the
//! workspace. This is a Layer 0 crate: it depends on no other workspace
//! member, so both engines can consume the same read-only journey data
//! without any coupling between them.
//!
//! ## Public API
//!
//! - `Journey`: an ordered sequence of channel touchpoints with its outcome.
//! - `ValueMetric`: the closed set of characteristic functions the Shapley
//!   engine can play the cooperative game with.
//! - `Diagnostic`: recoverable conditions an engine reports without aborting
//!   the batch.
//! - `CoreError`: structural input validation failures.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Diagnostic, ValueMetric};
pub use error::CoreError;
pub use structs::{validate_journeys, Journey};

/// Separator used when a channel path is rendered as a single string, e.g.
/// `"Organic > Direct > Paid"`. Matches the path separator of the journey
/// file format, so combination keys are directly comparable to input paths.
pub const PATH_SEPARATOR: &str = " > ";
