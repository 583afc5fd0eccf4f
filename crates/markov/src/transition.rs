use core_types::Journey;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Synthetic state prepended to every journey.
pub const START_STATE: &str = "(start)";
/// Absorbing terminal for journeys that did not convert.
pub const NULL_STATE: &str = "(null)";
/// Absorbing terminal for converted journeys.
pub const CONVERSION_STATE: &str = "(conversion)";

/// The ordered state list of the transition graph:
/// `[start] ∪ sorted(channels) ∪ [null, conversion]`.
///
/// Channels are sorted so the state ordering, and with it every downstream
/// artifact, is deterministic for a given journey set.
#[derive(Debug, Clone)]
pub(crate) struct StateSpace {
    pub states: Vec<String>,
    index: HashMap<String, usize>,
}

impl StateSpace {
    pub fn from_journeys(journeys: &[Journey]) -> Self {
        let channels: BTreeSet<&str> = journeys
            .iter()
            .flat_map(|j| j.channels.iter().map(String::as_str))
            .collect();

        let mut states = Vec::with_capacity(channels.len() + 3);
        states.push(START_STATE.to_string());
        states.extend(channels.into_iter().map(str::to_string));
        states.push(NULL_STATE.to_string());
        states.push(CONVERSION_STATE.to_string());

        let index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self { states, index }
    }

    pub fn index_of(&self, state: &str) -> usize {
        self.index[state]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Number of real channels (states minus start/null/conversion).
    pub fn channel_count(&self) -> usize {
        self.states.len() - 3
    }

    pub fn null_index(&self) -> usize {
        self.states.len() - 2
    }

    pub fn conversion_index(&self) -> usize {
        self.states.len() - 1
    }

    /// Channel states occupy the index range between start and the terminals.
    pub fn channel_indices(&self) -> std::ops::Range<usize> {
        1..self.states.len() - 2
    }
}

/// Accumulates one transition-count increment per consecutive state pair of
/// every journey. `value_weighted` selects monetary or unit counting;
/// `count_self_transitions` keeps or drops `cᵢ → cᵢ` repeats. The two
/// terminal rows get self-loops so they are absorbing after normalization.
pub(crate) fn count_matrix(
    journeys: &[Journey],
    space: &StateSpace,
    count_self_transitions: bool,
    value_weighted: bool,
) -> DMatrix<f64> {
    let mut counts = DMatrix::zeros(space.len(), space.len());

    for journey in journeys {
        let weight = if value_weighted {
            journey.conversion_value
        } else {
            1.0
        };
        let terminal = if journey.converted {
            space.conversion_index()
        } else {
            space.null_index()
        };

        let mut previous = space.index_of(START_STATE);
        for channel in &journey.channels {
            let current = space.index_of(channel);
            if current != previous || count_self_transitions {
                counts[(previous, current)] += weight;
            }
            previous = current;
        }
        counts[(previous, terminal)] += weight;
    }

    counts[(space.null_index(), space.null_index())] = 1.0;
    counts[(space.conversion_index(), space.conversion_index())] = 1.0;
    counts
}

/// The normalized transition matrix with channel-name labels, exposed on the
/// attribution report as a diagnostic artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMatrix {
    pub states: Vec<String>,
    /// Row-major transition probabilities; `rows[i][j]` is the probability
    /// of moving from `states[i]` to `states[j]`.
    pub rows: Vec<Vec<f64>>,
}

impl TransitionMatrix {
    pub(crate) fn from_dense(space: &StateSpace, matrix: &DMatrix<f64>) -> Self {
        let rows = (0..matrix.nrows())
            .map(|i| matrix.row(i).iter().copied().collect())
            .collect();
        Self {
            states: space.states.clone(),
            rows,
        }
    }

    /// Transition probability between two named states, if both exist.
    pub fn probability(&self, from: &str, to: &str) -> Option<f64> {
        let i = self.states.iter().position(|s| s == from)?;
        let j = self.states.iter().position(|s| s == to)?;
        Some(self.rows[i][j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey(channels: &[&str], converted: bool, value: f64) -> Journey {
        Journey::new(
            channels.iter().map(|c| c.to_string()).collect(),
            converted,
            value,
        )
    }

    #[test]
    fn state_space_is_sorted_and_bracketed_by_terminals() {
        let journeys = vec![journey(&["z", "a"], true, 1.0), journey(&["m"], false, 1.0)];
        let space = StateSpace::from_journeys(&journeys);
        assert_eq!(
            space.states,
            vec![START_STATE, "a", "m", "z", NULL_STATE, CONVERSION_STATE]
        );
        assert_eq!(space.channel_count(), 3);
        assert_eq!(space.channel_indices(), 1..4);
    }

    #[test]
    fn self_transitions_are_dropped_by_default_policy() {
        let journeys = vec![journey(&["a", "a", "b"], true, 1.0)];
        let space = StateSpace::from_journeys(&journeys);
        let a = space.index_of("a");

        let dropped = count_matrix(&journeys, &space, false, false);
        assert_eq!(dropped[(a, a)], 0.0);

        let kept = count_matrix(&journeys, &space, true, false);
        assert_eq!(kept[(a, a)], 1.0);
    }

    #[test]
    fn terminal_rows_are_self_loops() {
        let journeys = vec![journey(&["a"], true, 1.0), journey(&["b"], false, 1.0)];
        let space = StateSpace::from_journeys(&journeys);
        let counts = count_matrix(&journeys, &space, false, false);
        let null = space.null_index();
        let conv = space.conversion_index();
        assert_eq!(counts[(null, null)], 1.0);
        assert_eq!(counts[(conv, conv)], 1.0);
        assert_eq!(counts.row(null).iter().sum::<f64>(), 1.0);
        assert_eq!(counts.row(conv).iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn value_weighting_scales_edges_by_conversion_value() {
        let journeys = vec![journey(&["a"], true, 7.0)];
        let space = StateSpace::from_journeys(&journeys);
        let start = space.index_of(START_STATE);
        let a = space.index_of("a");

        let weighted = count_matrix(&journeys, &space, false, true);
        assert_eq!(weighted[(start, a)], 7.0);

        let unit = count_matrix(&journeys, &space, false, false);
        assert_eq!(unit[(start, a)], 1.0);
    }
}
