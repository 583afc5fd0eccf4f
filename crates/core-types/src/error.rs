use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The journey is structurally invalid and no attribution can be
    /// computed from it. Raised before any computation starts.
    #[error("Malformed journey at index {index}: {reason}")]
    MalformedJourney { index: usize, reason: String },

    /// The journey collection itself is empty.
    #[error("The journey set is empty; nothing to attribute")]
    EmptyJourneySet,
}
