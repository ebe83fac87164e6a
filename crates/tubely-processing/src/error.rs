use thiserror::Error;

/// Failures of the external media tools
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Probe failed: {0}")]
    ProbeFailure(String),

    #[error("Remux failed: {0}")]
    RemuxFailure(String),

    #[error("Invalid tool configuration: {0}")]
    InvalidConfiguration(String),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
