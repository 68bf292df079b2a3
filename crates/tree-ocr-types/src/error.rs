//! Per-file recognition errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why recognizing a single file failed.
#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("Cannot read image {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Unsupported image format {path:?}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("{engine} does not support {capability}")]
    Unsupported {
        engine: String,
        capability: &'static str,
    },

    #[error("Orientation detection failed: {0}")]
    Orientation(String),

    #[error("{engine} failed: {message}")]
    Engine { engine: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecognizeError {
    /// Build an engine failure.
    pub fn engine(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Coarse classification used in run reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unreadable { .. } => ErrorKind::Unreadable,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Unsupported { .. } | Self::Engine { .. } => ErrorKind::Engine,
            Self::Orientation(_) => ErrorKind::Orientation,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Error categories as they appear in a [`crate::BatchReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unreadable,
    UnsupportedFormat,
    Engine,
    Orientation,
    Io,
    Write,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = RecognizeError::Unreadable {
            path: PathBuf::from("en/bad.jpg"),
            reason: "unexpected end of file".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Unreadable);

        let err = RecognizeError::Unsupported {
            engine: "ocrs".to_string(),
            capability: "orientation detection",
        };
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert_eq!(err.to_string(), "ocrs does not support orientation detection");
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UnsupportedFormat).unwrap();
        assert_eq!(json, "\"unsupported_format\"");
    }
}
