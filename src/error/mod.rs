//! Error types for promotion operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PromoterError>;

#[derive(Error, Debug)]
pub enum PromoterError {
    /// Configuration file or image-set errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Invalid or missing CLI inputs
    #[error("Validation error: {0}")]
    Validation(String),
    /// Docker API pull/tag/push failures
    #[error("Transport error: {0}")]
    Transport(String),
    /// Image or reference unknown to the daemon
    #[error("Not found: {0}")]
    NotFound(String),
    /// Docker daemon unreachable
    #[error("Docker connection error: {0}")]
    Connection(String),
    /// Configuration deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),
    /// Report file IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PromoterError {
    fn from(err: serde_json::Error) -> Self {
        PromoterError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for PromoterError {
    fn from(err: serde_yaml::Error) -> Self {
        PromoterError::Parse(err.to_string())
    }
}

impl From<bollard::errors::Error> for PromoterError {
    fn from(err: bollard::errors::Error) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => PromoterError::NotFound(err.to_string()),
            _ => {
                let message = err.to_string();
                if message.contains("Connection refused")
                    || message.contains("No such file or directory")
                {
                    PromoterError::Connection(message)
                } else {
                    PromoterError::Transport(message)
                }
            }
        }
    }
}
