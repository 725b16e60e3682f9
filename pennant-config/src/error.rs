// Error types for settings resolution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Failed to load settings: {0}")]
    LoadError(String),

    #[error("Failed to parse setting {key}: {message}")]
    ParseError { key: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

impl ConfigError {
    pub(crate) fn parse(key: &str, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
