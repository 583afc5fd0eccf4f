use crate::error::MarkovError;
use crate::report::MarkovAttribution;
use crate::transition::{count_matrix, StateSpace, TransitionMatrix};
use core_types::{validate_journeys, Diagnostic, Journey};
use nalgebra::DMatrix;
use numeric::{normalize_rows, power_to_infinity, NumericError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Policy switches for the transition graph build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarkovConfig {
    /// Record `cᵢ → cᵢ` transitions for repeated identical touches. When
    /// false (default), consecutive duplicates collapse before counting.
    pub transition_to_same_state: bool,

    /// Weight edges by each journey's monetary conversion value instead of
    /// unit counts.
    pub conversion_value_as_frequency: bool,
}

impl Default for MarkovConfig {
    fn default() -> Self {
        Self {
            transition_to_same_state: false,
            conversion_value_as_frequency: true,
        }
    }
}

/// A stateless calculator deriving channel credit from removal effects on an
/// absorbing Markov chain.
#[derive(Debug, Default)]
pub struct MarkovEngine {
    config: MarkovConfig,
}

impl MarkovEngine {
    pub fn new(config: MarkovConfig) -> Self {
        Self { config }
    }

    /// Runs the full attribution over an immutable journey set.
    ///
    /// Fails fast on structurally invalid input; numerical edge cases (zero
    /// baseline, singular fundamental matrix) degrade gracefully and are
    /// reported through `MarkovAttribution::diagnostics`.
    pub fn attribute(&self, journeys: &[Journey]) -> Result<MarkovAttribution, MarkovError> {
        validate_journeys(journeys)?;

        let space = StateSpace::from_journeys(journeys);
        let counts = count_matrix(
            journeys,
            &space,
            self.config.transition_to_same_state,
            self.config.conversion_value_as_frequency,
        );
        let normalized = normalize_rows(&counts);

        let mut diagnostics = Vec::new();
        let limit = power_to_infinity(&normalized)?;
        let baseline = limit.matrix[(0, space.conversion_index())];
        let mut saw_singular = limit.used_pseudo_inverse;

        let removal_effects = if baseline <= 0.0 {
            warn!("baseline conversion probability is zero; removal effects degraded to 0");
            diagnostics.push(Diagnostic::UndefinedBaselineConversion);
            vec![0.0; space.channel_count()]
        } else {
            // Each channel's simulation is independent; fan out across the
            // thread pool and merge the per-channel probabilities.
            let simulated: Vec<(f64, bool)> = space
                .channel_indices()
                .into_par_iter()
                .map(|channel| removal_conversion(&counts, &space, channel))
                .collect::<Result<_, NumericError>>()?;
            saw_singular |= simulated.iter().any(|&(_, singular)| singular);
            simulated
                .iter()
                .map(|&(p, _)| (1.0 - p / baseline).max(0.0))
                .collect()
        };
        if saw_singular {
            warn!("singular transition matrix; absorption used a pseudo-inverse");
            diagnostics.push(Diagnostic::SingularTransitionMatrix);
        }

        let total_value: f64 = journeys.iter().map(Journey::converted_value).sum();
        let effect_sum: f64 = removal_effects.iter().sum();

        let mut removal_map = BTreeMap::new();
        let mut weights = BTreeMap::new();
        let mut attributed_value = BTreeMap::new();
        for (channel, effect) in space.states[space.channel_indices()]
            .iter()
            .zip(&removal_effects)
        {
            let weight = if effect_sum > 0.0 {
                effect / effect_sum
            } else {
                0.0
            };
            removal_map.insert(channel.clone(), *effect);
            weights.insert(channel.clone(), weight);
            attributed_value.insert(channel.clone(), weight * total_value);
        }

        let journey_values = journeys
            .iter()
            .map(|journey| distribute(journey, &weights))
            .collect();

        Ok(MarkovAttribution {
            transition_matrix: TransitionMatrix::from_dense(&space, &normalized),
            baseline_conversion: baseline,
            removal_effects: removal_map,
            weights,
            attributed_value,
            journey_values,
            diagnostics,
        })
    }
}

/// Conversion probability after excising one channel: its incoming mass is
/// redirected into the null column on the raw count matrix, the column is
/// zeroed, and the modified graph is renormalized and run to infinity.
fn removal_conversion(
    counts: &DMatrix<f64>,
    space: &StateSpace,
    channel: usize,
) -> Result<(f64, bool), NumericError> {
    let mut modified = counts.clone();
    let null = space.null_index();
    for row in 0..modified.nrows() {
        modified[(row, null)] += modified[(row, channel)];
        modified[(row, channel)] = 0.0;
    }

    let limit = power_to_infinity(&normalize_rows(&modified))?;
    Ok((
        limit.matrix[(0, space.conversion_index())],
        limit.used_pseudo_inverse,
    ))
}

/// Projects the global weight map onto one journey's touchpoints and splits
/// the journey's converted value proportionally. Repeated channels each
/// receive the same per-occurrence share. A journey whose channels all carry
/// zero weight splits uniformly instead of dividing by zero.
fn distribute(journey: &Journey, weights: &BTreeMap<String, f64>) -> Vec<f64> {
    let occurrence: Vec<f64> = journey
        .channels
        .iter()
        .map(|c| weights.get(c).copied().unwrap_or(0.0))
        .collect();
    let sum: f64 = occurrence.iter().sum();
    let value = journey.converted_value();

    if sum > 0.0 {
        occurrence.iter().map(|w| w / sum * value).collect()
    } else {
        vec![value / occurrence.len() as f64; occurrence.len()]
    }
}
