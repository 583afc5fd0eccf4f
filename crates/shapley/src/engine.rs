use crate::error::ShapleyError;
use crate::report::{CombinationAttribution, ShapleyAttribution};
use crate::table::{build_table, CombinationStats, ConversionTable};
use core_types::{validate_journeys, Journey, ValueMetric, PATH_SEPARATOR};
use numeric::{exclusion_weight, inclusion_weight};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard ceiling on the coalition size the engine will enumerate. `2^n`
/// subsets per combination makes anything beyond this unreasonable on a
/// single machine.
pub const COALITION_CEILING: usize = 20;

/// Absolute tolerance for the per-combination efficiency identity.
const EFFICIENCY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapleyConfig {
    /// Cap on combination size. Combinations above it either fail with
    /// `CoalitionExplosion` or, when `truncate_oversized` is set, keep their
    /// most recent channels.
    pub max_coalition_size: usize,

    /// Silently reduce oversized combinations instead of failing.
    pub truncate_oversized: bool,

    /// Whether channel order distinguishes combinations.
    pub order_sensitive: bool,

    /// Which conversion-table column plays the characteristic function.
    pub value_metric: ValueMetric,

    /// External per-combination values for `ValueMetric::Custom`, keyed like
    /// the conversion table. Missing combinations are worth 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_values: Option<BTreeMap<String, f64>>,
}

impl Default for ShapleyConfig {
    fn default() -> Self {
        Self {
            max_coalition_size: 4,
            truncate_oversized: false,
            order_sensitive: false,
            value_metric: ValueMetric::ConversionRate,
            custom_values: None,
        }
    }
}

/// A stateless calculator for exact Shapley-value attribution.
#[derive(Debug, Default)]
pub struct ShapleyEngine {
    config: ShapleyConfig,
}

impl ShapleyEngine {
    pub fn new(config: ShapleyConfig) -> Self {
        Self { config }
    }

    /// Runs the full attribution over an immutable journey set.
    ///
    /// Journeys that never converted still shape the conversion table (they
    /// lower conversion rates) but no game is played for their combinations.
    pub fn attribute(&self, journeys: &[Journey]) -> Result<ShapleyAttribution, ShapleyError> {
        validate_journeys(journeys)?;
        if self.config.max_coalition_size > COALITION_CEILING {
            return Err(ShapleyError::UnsupportedCoalitionSize {
                requested: self.config.max_coalition_size,
                ceiling: COALITION_CEILING,
            });
        }

        let table = build_table(
            journeys,
            self.config.order_sensitive,
            self.config.max_coalition_size,
            self.config.truncate_oversized,
        )?;

        // Each converted combination is an independent game; map them in
        // parallel and reduce by summation afterwards.
        let converted: Vec<(&String, &CombinationStats)> = table.converted().collect();
        tracing::debug!(
            combinations = table.combinations.len(),
            converted = converted.len(),
            "conversion table built"
        );
        let combinations: Vec<CombinationAttribution> = converted
            .par_iter()
            .map(|(key, stats)| CombinationAttribution {
                key: (*key).clone(),
                channels: stats.channels.clone(),
                values: self.combination_values(stats, &table),
            })
            .collect();

        let mut channel_values: BTreeMap<String, f64> = BTreeMap::new();
        for combination in &combinations {
            for (channel, value) in combination.channels.iter().zip(&combination.values) {
                *channel_values.entry(channel.clone()).or_insert(0.0) += value;
            }
        }

        Ok(ShapleyAttribution {
            conversion_table: table,
            combinations,
            channel_values,
        })
    }

    /// Exact Shapley values for one combination, rescaled to monetary credit
    /// when the metric is a rate.
    fn combination_values(&self, stats: &CombinationStats, table: &ConversionTable) -> Vec<f64> {
        let players = &stats.channels;
        let shapley = self.raw_shapley(players, table);

        if !self.config.value_metric.is_rate() {
            return shapley;
        }

        // A rate split is relative: weight it by how often the combination
        // was traversed, renormalize the shares, and convert into the
        // combination's absolute conversion value.
        let scaled: Vec<f64> = shapley
            .iter()
            .map(|v| v * stats.total_journeys as f64)
            .collect();
        let total: f64 = scaled.iter().sum();
        if total.abs() < f64::EPSILON {
            return vec![0.0; players.len()];
        }
        scaled
            .iter()
            .map(|v| v / total * stats.conversion_value)
            .collect()
    }

    /// Signed factorial-weighted accumulation over all `2^n` coalitions.
    ///
    /// Algebraically equivalent to averaging `v(S ∪ {i}) − v(S)` over all
    /// orderings, without materializing permutations. Coalitions absent from
    /// the conversion table (the empty one included) are worth 0.
    fn raw_shapley(&self, players: &[String], table: &ConversionTable) -> Vec<f64> {
        let n = players.len();
        let names: Vec<&str> = players.iter().map(String::as_str).collect();
        let mut shapley = vec![0.0; n];

        for mask in 0u64..(1u64 << n) {
            let size = mask.count_ones() as usize;
            // Borrowed coalition; this loop runs 2^n times.
            let coalition: Vec<&str> = (0..n)
                .filter(|&i| mask & (1 << i) != 0)
                .map(|i| names[i])
                .collect();
            let value = self.coalition_value(&coalition, table);
            if value == 0.0 {
                continue;
            }

            for (i, contribution) in shapley.iter_mut().enumerate() {
                if mask & (1 << i) != 0 {
                    *contribution += inclusion_weight(size, n) * value;
                } else {
                    *contribution -= exclusion_weight(size, n) * value;
                }
            }
        }

        // Efficiency: the shares must sum to v(full) − v(∅) in every build.
        let full = self.coalition_value(&names, table);
        let empty = self.coalition_value(&[], table);
        let drift = (shapley.iter().sum::<f64>() - (full - empty)).abs();
        if drift > EFFICIENCY_EPS {
            tracing::warn!(drift, "Shapley efficiency identity violated");
        }
        shapley
    }

    /// `v(S)`: the selected metric of the coalition's table entry, or the
    /// custom table's value. Missing entries are silently 0.
    fn coalition_value(&self, coalition: &[&str], table: &ConversionTable) -> f64 {
        let key = coalition.join(PATH_SEPARATOR);
        match self.config.value_metric {
            ValueMetric::ConversionRate => table
                .get(&key)
                .map(CombinationStats::conversion_rate)
                .unwrap_or(0.0),
            ValueMetric::ConversionCount => table
                .get(&key)
                .map(|s| s.conversions as f64)
                .unwrap_or(0.0),
            ValueMetric::ConversionValue => table
                .get(&key)
                .map(|s| s.conversion_value)
                .unwrap_or(0.0),
            ValueMetric::Custom => self
                .config
                .custom_values
                .as_ref()
                .and_then(|values| values.get(&key).copied())
                .unwrap_or(0.0),
        }
    }
}
