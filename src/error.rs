use thiserror::Error;

/// Errors raised by the figure builders.
///
/// Every check runs before any panel or series is constructed, so a returned
/// error never comes with a half-built figure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// Caller-supplied data cannot be turned into a figure
    /// (length mismatch, empty sequence, too few tables, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ChartError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        log::warn!("rejecting chart input: {msg}");
        ChartError::InvalidInput(msg)
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ChartError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
