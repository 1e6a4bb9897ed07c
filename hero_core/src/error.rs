//! Error types for the hero_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hero_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Catalog missing, malformed or invalid
    #[error("Catalog load error: {0}")]
    Load(String),

    /// The location filter left nothing to plan from
    #[error("No exercises could be found for location '{location}'")]
    NoEligibleExercises { location: String },

    /// Configuration or template metadata inconsistent with the request
    #[error("Configuration error: {0}")]
    Config(String),

    /// Speech command failed
    #[error("Narration error: {0}")]
    Narration(String),

    /// Music command failed
    #[error("Music error: {0}")]
    Music(String),
}
