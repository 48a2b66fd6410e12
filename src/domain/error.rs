//! Errors raised by the pure risk-computation layer.

/// Errors that can occur while looking up models or scoring scenarios.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("Unknown disease: {0}")]
    UnknownDisease(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid disease model: {0}")]
    InvalidModel(String),
}
