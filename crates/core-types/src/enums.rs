use serde::{Deserialize, Serialize};

/// Selects which column of the conversion table acts as the cooperative
/// game's characteristic function `v(S)`.
///
/// A closed enum dispatched with `match`, so adding a metric is a
/// compile-time exhaustive change rather than a runtime lookup by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueMetric {
    /// Conversions divided by total journeys for the combination.
    #[default]
    ConversionRate,
    /// Raw conversion count for the combination.
    ConversionCount,
    /// Summed monetary conversion value for the combination.
    ConversionValue,
    /// An externally supplied per-combination value table fully replaces the
    /// metric; combinations missing from the table are worth 0.
    Custom,
}

impl ValueMetric {
    /// Whether the metric is a relative rate that must be rescaled into
    /// absolute monetary credit after the Shapley computation. Custom tables
    /// are treated like rates, as the original models did.
    pub fn is_rate(self) -> bool {
        matches!(self, ValueMetric::ConversionRate | ValueMetric::Custom)
    }
}

/// A recoverable condition encountered during attribution.
///
/// Diagnostics degrade gracefully: the engine substitutes a safe value,
/// records the diagnostic on its result, and keeps going. Structural input
/// problems are errors, not diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Diagnostic {
    /// The fundamental matrix of the transition graph was not invertible;
    /// absorption probabilities were computed through a pseudo-inverse.
    /// Check for transient states trapped in a cycle with no path out.
    SingularTransitionMatrix,

    /// The baseline conversion probability is zero, so the removal-effect
    /// ratio is undefined. Every removal effect was reported as 0.
    UndefinedBaselineConversion,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::SingularTransitionMatrix => write!(
                f,
                "singular transition matrix; fell back to a pseudo-inverse"
            ),
            Diagnostic::UndefinedBaselineConversion => write!(
                f,
                "baseline conversion probability is zero; removal effects reported as 0"
            ),
        }
    }
}
