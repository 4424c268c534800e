//! Error types for token and sample configuration.

/// Error type for configuration loading and token construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading a sample file
    #[error("Failed to read sample file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Token type (or random replacement kind) is not one the engine knows
    #[error("Invalid type '{kind}' for token '{token}' in sample '{sample}'")]
    InvalidTokenType {
        sample: String,
        token: String,
        kind: String,
    },

    /// Token parameters are malformed for its type
    #[error("Invalid token '{token}' in sample '{sample}': {reason}")]
    InvalidToken {
        sample: String,
        token: String,
        reason: String,
    },

    /// Time window whose latest bound precedes its earliest bound
    #[error("Invalid time window: latest {latest} is before earliest {earliest}")]
    InvalidWindow { earliest: String, latest: String },

    /// Time specification that is neither relative nor RFC 3339
    #[error("Invalid time specification '{0}'")]
    InvalidTime(String),

    /// Sample not found in a sample set
    #[error("Sample not found: {0}")]
    SampleNotFound(String),
}
