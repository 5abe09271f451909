use thiserror::Error;

/// Errors that can occur when persisting the contraction history
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to encode history: {0}")]
    EncodeError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while timing a contraction
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
    #[error("A contraction is already being timed")]
    AlreadyRunning,

    #[error("No contraction is being timed")]
    NotRunning,
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}
