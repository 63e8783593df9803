use thiserror::Error;

/// Unified error type for the phi engine.
#[derive(Debug, Error)]
pub enum PhiError {
    /// Malformed transition matrix, connectivity, labels, state or node references.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Distance requested between vectors of unequal length.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    /// An internal invariant of the search was violated.
    #[error("computation error: {0}")]
    Computation(String),
    /// Wrapper around I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failures.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Any other context dependent failure.
    #[error("{0}")]
    Other(String),
}

impl PhiError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn other<T: Into<String>>(msg: T) -> Self {
        Self::Other(msg.into())
    }
}

pub type Result<T, E = PhiError> = std::result::Result<T, E>;
