use crate::table::ConversionTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shapley split for one converted combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationAttribution {
    /// The combination key in the conversion table.
    pub key: String,
    /// The combination's channels, in canonical order.
    pub channels: Vec<String>,
    /// One value per channel, aligned with `channels`. Monetary when the
    /// value metric is a rate, in metric units otherwise.
    pub values: Vec<f64>,
}

/// The complete output of one Shapley attribution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapleyAttribution {
    /// The underlying per-combination conversion statistics.
    pub conversion_table: ConversionTable,

    /// Per-combination Shapley splits, one entry per distinct converted
    /// combination, in table key order.
    pub combinations: Vec<CombinationAttribution>,

    /// Each channel's value summed across every combination it appears in.
    pub channel_values: BTreeMap<String, f64>,
}
