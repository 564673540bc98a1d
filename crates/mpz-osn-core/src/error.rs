/// Errors that can occur when using the Random OSN sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("invalid input: expected {0}")]
    InvalidInput(String),
    #[error("invalid COT: {0}")]
    InvalidCot(String),
}

/// Errors that can occur when using the Random OSN receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid input: expected {0}")]
    InvalidInput(String),
    #[error("invalid COT: {0}")]
    InvalidCot(String),
    #[error("invalid corrections: {0}")]
    InvalidCorrections(String),
}

impl SenderError {
    /// Returns `true` if the error was caused by the caller's input rather than
    /// by the peer or the COT functionality.
    pub fn is_input(&self) -> bool {
        matches!(self, SenderError::InvalidInput(_))
    }
}

impl ReceiverError {
    /// Returns `true` if the error was caused by the caller's input rather than
    /// by the peer or the COT functionality.
    pub fn is_input(&self) -> bool {
        matches!(self, ReceiverError::InvalidInput(_))
    }
}
