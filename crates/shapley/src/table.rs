use crate::error::ShapleyError;
use core_types::{Journey, PATH_SEPARATOR};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated outcome of every journey that reduced to one canonical channel
/// combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationStats {
    /// The canonical channel sequence behind the key.
    pub channels: Vec<String>,
    pub conversions: u64,
    pub total_journeys: u64,
    pub conversion_value: f64,
}

impl CombinationStats {
    pub fn conversion_rate(&self) -> f64 {
        if self.total_journeys == 0 {
            0.0
        } else {
            self.conversions as f64 / self.total_journeys as f64
        }
    }
}

/// Per-combination conversion statistics, keyed by the canonical channel
/// sequence joined with the path separator. Rebuilt fully on every
/// invocation; never mutated incrementally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionTable {
    pub combinations: BTreeMap<String, CombinationStats>,
}

impl ConversionTable {
    pub fn get(&self, key: &str) -> Option<&CombinationStats> {
        self.combinations.get(key)
    }

    /// Combinations observed among converted journeys, the ones the game is
    /// played over.
    pub fn converted(&self) -> impl Iterator<Item = (&String, &CombinationStats)> {
        self.combinations.iter().filter(|(_, s)| s.conversions > 0)
    }
}

/// Canonical combination of a journey's channels: deduplicated in
/// first-occurrence order, truncated to the `max_size` most recent channels
/// when truncation is enabled, and sorted when order does not distinguish
/// combinations.
pub(crate) fn canonical_combination(
    channels: &[String],
    order_sensitive: bool,
    max_size: usize,
    truncate: bool,
) -> Result<Vec<String>, ShapleyError> {
    let mut combination: Vec<String> = channels.iter().unique().cloned().collect();

    if combination.len() > max_size {
        if !truncate {
            return Err(ShapleyError::CoalitionExplosion {
                size: combination.len(),
                max: max_size,
            });
        }
        combination = combination.split_off(combination.len() - max_size);
    }
    if !order_sensitive {
        combination.sort();
    }
    Ok(combination)
}

pub(crate) fn join_key(combination: &[String]) -> String {
    combination.join(PATH_SEPARATOR)
}

/// Builds the conversion table over a validated journey set.
pub(crate) fn build_table(
    journeys: &[Journey],
    order_sensitive: bool,
    max_size: usize,
    truncate: bool,
) -> Result<ConversionTable, ShapleyError> {
    let mut combinations: BTreeMap<String, CombinationStats> = BTreeMap::new();

    for journey in journeys {
        let combination =
            canonical_combination(&journey.channels, order_sensitive, max_size, truncate)?;
        let stats = combinations
            .entry(join_key(&combination))
            .or_insert_with(|| CombinationStats {
                channels: combination,
                conversions: 0,
                total_journeys: 0,
                conversion_value: 0.0,
            });
        stats.total_journeys += 1;
        if journey.converted {
            stats.conversions += 1;
        }
        stats.conversion_value += journey.conversion_value;
    }

    Ok(ConversionTable { combinations })
}
