use thiserror::Error;

/// Errors produced while building, filtering or analysing signals.
///
/// Failures are reported where they happen. No component clamps an
/// out-of-range parameter or hands back a signal carrying non-finite
/// samples.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numeric instability: {0}")]
    NumericInstability(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;

/// Shorthand for building an `InvalidParameter` error.
pub(crate) fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(FilterError::InvalidParameter(msg.into()))
}

/// Shorthand for building a `NumericInstability` error.
pub(crate) fn unstable<T>(msg: impl Into<String>) -> Result<T> {
    Err(FilterError::NumericInstability(msg.into()))
}
