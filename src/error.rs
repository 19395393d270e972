use thiserror::Error;

/// Errors returned by the clustering engine, the sweep and the table reader.
///
/// Empty clusters are not reported here. They surface as `NaN` centroids
/// (see [`crate::KMeansState::is_degenerate`]), unless [`crate::EmptyClusterPolicy::Reinitialize`] is selected.
#[derive(Error, Debug)]
pub enum KMeansError {
    /// Two vectors that have to share their dimensionality do not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Length that was found instead
        found: usize,
    },

    /// A parameter (k, restart count, iteration limit, ...) or the dataset itself is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A field of a numeric table could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number inside the input
        line: usize,
        /// Human-readable explanation
        message: String,
    },

    /// Reading the input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, KMeansError>;

pub(crate) fn invalid_config<T>(message: impl Into<String>) -> Result<T> {
    Err(KMeansError::InvalidConfiguration(message.into()))
}
