use crate::transition::TransitionMatrix;
use core_types::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete output of one Markov attribution run.
///
/// This is a pure value object: all maps are ordered by channel name so two
/// runs over identical input produce identical reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovAttribution {
    /// Normalized transition matrix with state labels, for inspection.
    pub transition_matrix: TransitionMatrix,

    /// Probability of reaching the conversion state from the start state in
    /// the unmodified graph.
    pub baseline_conversion: f64,

    /// Fractional drop in baseline conversion probability when each channel
    /// is excised from the graph. Each value lies in [0, 1].
    pub removal_effects: BTreeMap<String, f64>,

    /// Removal effects normalized into a distribution summing to 1 (all
    /// zero when every removal effect is zero).
    pub weights: BTreeMap<String, f64>,

    /// Channel weights expressed in monetary units: weight multiplied by the
    /// total converted value of the journey set.
    pub attributed_value: BTreeMap<String, f64>,

    /// Per-journey split of each journey's converted value, one entry per
    /// touchpoint in the same order as the journey's channel sequence.
    pub journey_values: Vec<Vec<f64>>,

    /// Recoverable conditions encountered during the run.
    pub diagnostics: Vec<Diagnostic>,
}
