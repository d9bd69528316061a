//! Error types for the task engine
//!
//! Data-shape problems inside documents never surface here; they degrade to
//! documented defaults. These errors only come from the edges:
//! - Config: reading or parsing `~/.taskline/config.json`
//! - Input: the document collection as a whole failed to decode
//! - Caller: an invalid value handed in by the presentation layer

use std::path::PathBuf;
use thiserror::Error;

/// Error types for engine edges
#[derive(Debug, Error)]
pub enum EngineError {
    // Config errors
    #[error("Failed to read config at {path}: {message}")]
    ConfigRead { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    // Input errors
    #[error("Failed to decode allocation documents: {0}")]
    DocumentDecode(String),

    #[error("IO error: {0}")]
    IoError(String),

    // Caller errors
    #[error("Invalid window direction '{0}' (expected 'prev' or 'next')")]
    InvalidDirection(String),
}

impl EngineError {
    /// Returns true if the error came from configuration rather than input
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigRead { .. }
                | EngineError::ConfigParse(_)
                | EngineError::InvalidTimezone(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EngineError::ConfigRead { .. } => "Check that ~/.taskline/config.json is readable.",
            EngineError::ConfigParse(_) => "Check the config file is valid JSON.",
            EngineError::InvalidTimezone(_) => {
                "Use an IANA timezone name such as \"Europe/Stockholm\"."
            }
            EngineError::DocumentDecode(_) => {
                "The document collection must be a JSON array of allocation documents."
            }
            EngineError::IoError(_) => "Check file permissions and that the path exists.",
            EngineError::InvalidDirection(_) => "Navigate with \"prev\" or \"next\".",
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::DocumentDecode(err.to_string())
    }
}

/// Serializable error representation for the presentation boundary
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineErrorPayload {
    pub message: String,
    pub error_kind: ErrorKind,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Config,
    Input,
    Caller,
}

impl From<&EngineError> for EngineErrorPayload {
    fn from(err: &EngineError) -> Self {
        let error_kind = if err.is_config_error() {
            ErrorKind::Config
        } else if matches!(err, EngineError::InvalidDirection(_)) {
            ErrorKind::Caller
        } else {
            ErrorKind::Input
        };

        EngineErrorPayload {
            message: err.to_string(),
            error_kind,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
