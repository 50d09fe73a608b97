//! Error types shared across GIFTS crates

use thiserror::Error;

/// Result type alias for shared GIFTS operations
pub type Result<T> = std::result::Result<T, GiftsError>;

#[derive(Error, Debug)]
pub enum GiftsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment value or configuration entry could not be understood
    #[error("Configuration error: {0}")]
    Config(String),

    /// The global tracing subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl GiftsError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = GiftsError::config("LOG_LEVEL must be one of trace, debug, info, warn, error");
        assert!(err.to_string().starts_with("Configuration error: LOG_LEVEL"));
    }
}
