use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TrackError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid detection input: {0}")]
    InvalidInput(String),
    #[error("non-finite measurement: {0}")]
    NonFiniteMeasurement(String),
    #[error("projected covariance is not positive definite")]
    NonPositiveDefinite,
    #[error("assignment failed: {0}")]
    Assignment(String),
}
