use thiserror::Error;

/// Failure of one relay operation. The message is user facing and rendered inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Missing `auth`/`redirect` parameters or a forbidden redirect target.
    #[error("{0}")]
    Config(String),
    /// Missing user input; no network call was made.
    #[error("{0}")]
    Validation(String),
    /// Provider SDK or backend exchange failure.
    #[error("{0}")]
    Provider(String),
}

impl RelayError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config(message) | Self::Validation(message) | Self::Provider(message) => {
                message
            }
        }
    }
}
