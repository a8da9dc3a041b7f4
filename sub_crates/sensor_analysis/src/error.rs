use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while recovering a response curve.
///
/// None of these are worth retrying: the computation is deterministic, so
/// feeding the same input back in gives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The exposure set itself is malformed: too few exposures, buffers
    /// that don't match the stated dimensions, bad exposure times, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The inputs are well formed but too small to sample from.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The least-squares system has no unique solution, or solving it
    /// produced non-finite values.
    #[error("singular system: {0}")]
    SingularSystem(String),
}
