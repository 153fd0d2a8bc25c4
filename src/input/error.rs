//! Landmark Input Error Types

use thiserror::Error;

/// Result type for landmark input operations
pub type Result<T> = std::result::Result<T, LandmarkError>;

/// Landmark provider error types
#[derive(Error, Debug)]
pub enum LandmarkError {
    /// Camera could not be opened or read
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Landmark model failed to process a frame
    #[error("Landmark processing failed: {0}")]
    ProcessingFailed(String),

    /// A recorded frame could not be parsed
    #[error("Invalid recording at line {line}: {source}")]
    InvalidRecord {
        /// 1-based line number
        line: usize,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// A recorded frame parsed but violates the format
    #[error("Invalid frame at line {line}: {reason}")]
    InvalidFrame {
        /// 1-based line number
        line: usize,
        /// What is wrong
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LandmarkError {
    /// Provider may produce frames again later
    ///
    /// Camera and model hiccups come and go; a broken recording does not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LandmarkError::CameraUnavailable(_) | LandmarkError::ProcessingFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LandmarkError::CameraUnavailable("busy".into()).is_transient());
        assert!(!LandmarkError::InvalidFrame {
            line: 3,
            reason: "gaze out of range".into()
        }
        .is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = LandmarkError::InvalidFrame {
            line: 7,
            reason: "frame has zero width".into(),
        };
        assert_eq!(err.to_string(), "Invalid frame at line 7: frame has zero width");
    }
}
