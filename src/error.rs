use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for guibender operations.
pub type GuiResult<T> = Result<T, GuiError>;

/// The error type for all search, action and proxy operations.
#[derive(Debug, Error)]
pub enum GuiError {
    #[error("Failed to find '{image}' within {timeout:?}")]
    Find { image: String, timeout: Duration },

    #[error("'{image}' was still visible after {timeout:?}")]
    NotFind { image: String, timeout: Duration },

    #[error("Matching backend '{backend}' is not available in this environment")]
    UnsupportedBackend { backend: String },

    #[error("Similarity {value} is outside of the accepted range [0, 1]")]
    InvalidSimilarity { value: f64 },

    #[error("Image '{name}' could not be found in any of {paths:?}")]
    ImageNotFound { name: String, paths: Vec<PathBuf> },

    #[error("Failed to load image {path:?}: {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Invalid configuration in {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Desktop operation '{operation}' failed: {description}")]
    Desktop {
        operation: String,
        description: String,
    },

    #[error("Transport failure: {description}")]
    Transport { description: String },
}

/// Error categories a caller can match on without inspecting payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Find,
    NotFind,
    UnsupportedBackend,
    Config,
    Image,
    Desktop,
    Transport,
}

impl GuiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuiError::Find { .. } => ErrorKind::Find,
            GuiError::NotFind { .. } => ErrorKind::NotFind,
            GuiError::UnsupportedBackend { .. } => ErrorKind::UnsupportedBackend,
            GuiError::InvalidSimilarity { .. } | GuiError::Config { .. } | GuiError::Io { .. } => {
                ErrorKind::Config
            }
            GuiError::ImageNotFound { .. } | GuiError::ImageLoad { .. } => ErrorKind::Image,
            GuiError::Desktop { .. } => ErrorKind::Desktop,
            GuiError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// A required pattern was not located in time
    pub fn is_find(&self) -> bool {
        self.kind() == ErrorKind::Find
    }

    /// A pattern required to disappear was still present
    pub fn is_not_find(&self) -> bool {
        self.kind() == ErrorKind::NotFind
    }

    pub fn is_unsupported_backend(&self) -> bool {
        self.kind() == ErrorKind::UnsupportedBackend
    }

    pub(crate) fn desktop(operation: &str, description: impl Into<String>) -> Self {
        GuiError::Desktop {
            operation: operation.to_string(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let find = GuiError::Find {
            image: "button".to_string(),
            timeout: Duration::ZERO,
        };
        let not_find = GuiError::NotFind {
            image: "button".to_string(),
            timeout: Duration::from_secs(1),
        };

        assert!(find.is_find());
        assert!(!find.is_not_find());
        assert!(not_find.is_not_find());
        assert!(!not_find.is_find());
        assert_ne!(find.kind(), not_find.kind());
    }

    #[test]
    fn test_similarity_is_config_error() {
        let err = GuiError::InvalidSimilarity { value: 1.5 };
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("1.5"));
    }
}
