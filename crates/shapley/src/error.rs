use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapleyError {
    #[error("Invalid journey input: {0}")]
    Input(#[from] core_types::CoreError),

    /// A journey's combination has more channels than `max_coalition_size`
    /// and no truncation policy is configured. Enumeration is exponential in
    /// the combination size, so this fails fast instead of silently
    /// truncating.
    #[error(
        "Combination of {size} channels exceeds max_coalition_size {max} \
         and truncation is not enabled"
    )]
    CoalitionExplosion { size: usize, max: usize },

    /// `max_coalition_size` itself is above the hard ceiling the engine is
    /// willing to enumerate.
    #[error("max_coalition_size {requested} exceeds the hard ceiling {ceiling}")]
    UnsupportedCoalitionSize { requested: usize, ceiling: usize },
}
