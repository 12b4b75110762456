use thiserror::Error;

/// Policy errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Power share denominator is zero (zero-size piece with no network or baseline power)")]
    ZeroPowerDenominator,

    #[error("Invalid policy config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;
