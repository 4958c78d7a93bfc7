//! Error types for Drift

use thiserror::Error;

/// The main error type for Drift host operations.
///
/// The particle engine itself never fails; these are produced by the code
/// around it (configuration, window creation, presentation, image output).
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Invalid value: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Window error: {0}")]
    WindowError(String),

    #[error("Surface error: {0}")]
    SurfaceError(String),

    #[error("Image error: {0}")]
    ImageError(String),
}

/// Result type alias for Drift operations
pub type Result<T> = std::result::Result<T, DriftError>;

impl From<toml::de::Error> for DriftError {
    fn from(err: toml::de::Error) -> Self {
        DriftError::TomlParseError(err.to_string())
    }
}
