//! # Markov Attribution Engine
//!
//! Models customer journeys as walks through an absorbing Markov chain and
//! quantifies each channel's causal contribution to conversion.
//!
//! Every journey becomes a state sequence `[start, c1, …, ck, terminal]`
//! where the terminal is the `conversion` or `null` absorbing state. The
//! engine derives the baseline probability of reaching `conversion` from
//! `start`, then simulates the removal of each channel and measures the drop
//! in that probability (the removal effect). Normalized removal effects are
//! the channel weights, which are projected back onto each journey to split
//! its conversion value across its touchpoints.
//!
//! The engine is a stateless batch calculator: it reads an immutable journey
//! slice and returns a `MarkovAttribution` value object. Recoverable
//! numerical conditions surface as `Diagnostic`s on the report, never as
//! errors.

pub mod engine;
pub mod error;
pub mod report;
pub mod transition;

pub use engine::{MarkovConfig, MarkovEngine};
pub use error::MarkovError;
pub use report::MarkovAttribution;
pub use transition::{TransitionMatrix, CONVERSION_STATE, NULL_STATE, START_STATE};
