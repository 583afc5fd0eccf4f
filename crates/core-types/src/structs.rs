use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// One customer journey: the ordered sequence of channel touchpoints a user
/// encountered before the conversion attempt resolved.
///
/// Journeys are immutable once handed to an engine. Both engines consume the
/// same journey slice without mutating it, so they may run concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    /// Channel labels in touch order. Identity is by string equality.
    pub channels: Vec<String>,

    /// Whether the journey ended in a conversion.
    pub converted: bool,

    /// Monetary value of the conversion. Non-negative.
    #[serde(default)]
    pub conversion_value: f64,

    /// Hours until the moment of conversion, one entry per touchpoint,
    /// non-increasing toward the conversion. Optional; only needed by
    /// time-based journey rewrites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_conversion: Option<Vec<f64>>,
}

impl Journey {
    pub fn new(channels: Vec<String>, converted: bool, conversion_value: f64) -> Self {
        Self {
            channels,
            converted,
            conversion_value,
            time_to_conversion: None,
        }
    }

    /// The value this journey actually realized: its conversion value if it
    /// converted, otherwise 0.
    pub fn converted_value(&self) -> f64 {
        if self.converted {
            self.conversion_value
        } else {
            0.0
        }
    }

    /// Structural validation. `index` is the journey's position in its set,
    /// used only for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        if self.channels.is_empty() {
            return Err(CoreError::MalformedJourney {
                index,
                reason: "empty channel sequence".to_string(),
            });
        }
        if let Some(times) = &self.time_to_conversion {
            if times.len() != self.channels.len() {
                return Err(CoreError::MalformedJourney {
                    index,
                    reason: format!(
                        "{} channels but {} time-to-conversion entries",
                        self.channels.len(),
                        times.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Rewrites occurrences of `selected` with the previous channel in the
    /// journey when the gap between the two contacts is below `time_window`
    /// hours. One pass handles a single trailing occurrence; `passes` runs
    /// propagate through runs of the selected channel:
    ///
    /// `[Organic, Direct, Direct]` → pass 1 `[Organic, Organic, Direct]`
    /// → pass 2 `[Organic, Organic, Organic]`
    ///
    /// Returns `None` when the journey carries no time-to-conversion data.
    pub fn overwrite_channel_within_window(
        &self,
        selected: &str,
        time_window: f64,
        passes: usize,
    ) -> Option<Vec<String>> {
        let times = self.time_to_conversion.as_ref()?;

        // Gap between consecutive contacts; the first touch has no
        // predecessor and is never overwritten.
        let mut gaps = Vec::with_capacity(self.channels.len());
        gaps.push(time_window + 1.0);
        for pair in times.windows(2) {
            gaps.push((pair[0] - pair[1]).abs());
        }

        let mut channels = self.channels.clone();
        for _ in 0..passes {
            let previous = channels.clone();
            for i in 1..channels.len() {
                if previous[i] == selected && gaps[i] < time_window {
                    channels[i] = previous[i - 1].clone();
                }
            }
        }
        Some(channels)
    }
}

/// Fail-fast validation of a whole journey set, run by every engine before
/// any computation starts.
pub fn validate_journeys(journeys: &[Journey]) -> Result<(), CoreError> {
    if journeys.is_empty() {
        tracing::warn!("rejecting empty journey set");
        return Err(CoreError::EmptyJourneySet);
    }
    for (index, journey) in journeys.iter().enumerate() {
        if let Err(error) = journey.validate(index) {
            tracing::warn!(index, %error, "rejecting malformed journey");
            return Err(error);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey(channels: &[&str]) -> Journey {
        Journey::new(
            channels.iter().map(|c| c.to_string()).collect(),
            true,
            1.0,
        )
    }

    #[test]
    fn empty_channel_sequence_is_rejected() {
        let j = journey(&[]);
        assert!(matches!(
            j.validate(0),
            Err(CoreError::MalformedJourney { index: 0, .. })
        ));
    }

    #[test]
    fn time_length_mismatch_is_rejected() {
        let mut j = journey(&["a", "b"]);
        j.time_to_conversion = Some(vec![10.0]);
        assert!(j.validate(3).is_err());

        j.time_to_conversion = Some(vec![10.0, 0.0]);
        assert!(j.validate(3).is_ok());
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(
            validate_journeys(&[]),
            Err(CoreError::EmptyJourneySet)
        ));
    }

    #[test]
    fn converted_value_is_zero_for_lost_journeys() {
        let mut j = journey(&["a"]);
        j.conversion_value = 22.0;
        j.converted = false;
        assert_eq!(j.converted_value(), 0.0);
        j.converted = true;
        assert_eq!(j.converted_value(), 22.0);
    }

    #[test]
    fn journeys_round_trip_through_json() {
        let json = r#"[{"channels":["x","y"],"converted":true,"conversion_value":7.0}]"#;
        let journeys: Vec<Journey> = serde_json::from_str(json).unwrap();
        assert_eq!(journeys[0].channels, vec!["x", "y"]);
        assert!(journeys[0].time_to_conversion.is_none());

        let back = serde_json::to_string(&journeys).unwrap();
        let again: Vec<Journey> = serde_json::from_str(&back).unwrap();
        assert_eq!(journeys, again);
    }

    #[test]
    fn overwrite_rewrites_close_contacts_only() {
        let mut j = journey(&["Organic", "Direct", "Direct"]);
        j.time_to_conversion = Some(vec![30.0, 20.0, 0.0]);

        // Gap Organic→Direct is 10h (< 24), Direct→Direct is 20h (< 24).
        let one_pass = j
            .overwrite_channel_within_window("Direct", 24.0, 1)
            .unwrap();
        assert_eq!(one_pass, vec!["Organic", "Organic", "Direct"]);

        let two_passes = j
            .overwrite_channel_within_window("Direct", 24.0, 2)
            .unwrap();
        assert_eq!(two_passes, vec!["Organic", "Organic", "Organic"]);

        // A tight window leaves the journey untouched.
        let untouched = j.overwrite_channel_within_window("Direct", 5.0, 2).unwrap();
        assert_eq!(untouched, j.channels);
    }

    #[test]
    fn overwrite_requires_time_data() {
        let j = journey(&["Organic", "Direct"]);
        assert!(j.overwrite_channel_within_window("Direct", 24.0, 1).is_none());
    }
}
