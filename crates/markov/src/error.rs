use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkovError {
    #[error("Invalid journey input: {0}")]
    Input(#[from] core_types::CoreError),

    #[error("Numeric kernel failure: {0}")]
    Numeric(#[from] numeric::NumericError),
}
