// Error taxonomy for screenshot comparison runs

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for comparison operations
pub type CompareResult<T> = Result<T, CompareError>;

/// Error types for comparison operations
///
/// Every variant is fatal for a run: the orchestrator never records a
/// partial result for an entry that failed to load.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Malformed configuration value (e.g. a threshold outside `[0, 1]`)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Unreadable directory or file
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed image payload
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Diff image could not be encoded
    #[error("Failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    /// Report serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompareError {
    /// Wrap an I/O error with the path it occurred at
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        CompareError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn decode(path: impl AsRef<Path>, message: impl ToString) -> Self {
        CompareError::Decode {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn encode(path: impl AsRef<Path>, message: impl ToString) -> Self {
        CompareError::Encode {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = CompareError::io(
            "/tmp/missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.png"));
        assert!(msg.contains("gone"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_error_display() {
        let err = CompareError::decode("a.png", "bad header");
        assert_eq!(err.to_string(), "Failed to decode a.png: bad header");
    }
}
