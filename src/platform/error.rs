//! Platform Error Types
//!
//! Errors raised by the cursor, click and window-enumeration collaborators.
//! None of these are fatal to the control loop: every call site logs the
//! error and continues with a fallback.

use thiserror::Error;

use crate::gesture::ClickEvent;

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Platform boundary error types
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Reading the cursor position failed
    #[error("Cursor position query failed: {0}")]
    CursorQueryFailed(String),

    /// Moving the cursor failed
    #[error("Cursor move to ({x}, {y}) failed: {reason}")]
    CursorMoveFailed {
        /// Requested X
        x: i32,
        /// Requested Y
        y: i32,
        /// Backend reason
        reason: String,
    },

    /// Screen size could not be determined
    #[error("Screen size query failed: {0}")]
    ScreenSizeUnavailable(String),

    /// Screen reported a degenerate size
    #[error("Invalid screen size: {0}x{1}")]
    InvalidScreenSize(u32, u32),

    /// Issuing a click failed
    #[error("{kind} click failed: {reason}")]
    ClickFailed {
        /// Click that was attempted
        kind: ClickEvent,
        /// Backend reason
        reason: String,
    },

    /// Window/control enumeration failed
    #[error("Control enumeration failed: {0}")]
    EnumerationFailed(String),

    /// Capability not available on this platform
    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error classification for recovery decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Cursor read/write problems
    Cursor,
    /// Display geometry problems
    Display,
    /// Click injection problems
    Click,
    /// Window enumeration problems
    Enumeration,
    /// Missing capability
    Capability,
    /// Anything else
    Unknown,
}

impl PlatformError {
    /// Classify error for recovery strategy selection
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::CursorQueryFailed(_) | Self::CursorMoveFailed { .. } => ErrorType::Cursor,
            Self::ScreenSizeUnavailable(_) | Self::InvalidScreenSize(_, _) => ErrorType::Display,
            Self::ClickFailed { .. } => ErrorType::Click,
            Self::EnumerationFailed(_) => ErrorType::Enumeration,
            Self::Unsupported(_) => ErrorType::Capability,
            Self::Io(_) => ErrorType::Unknown,
        }
    }

    /// Transient errors are expected to clear up on the next frame
    pub fn is_transient(&self) -> bool {
        !matches!(self.error_type(), ErrorType::Capability | ErrorType::Display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = PlatformError::CursorQueryFailed("busy".to_string());
        assert_eq!(err.error_type(), ErrorType::Cursor);
        assert!(err.is_transient());

        let err = PlatformError::Unsupported("window enumeration");
        assert_eq!(err.error_type(), ErrorType::Capability);
        assert!(!err.is_transient());
    }

    #[test]
    fn test_display_messages() {
        let err = PlatformError::CursorMoveFailed {
            x: 10,
            y: 20,
            reason: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "Cursor move to (10, 20) failed: denied");

        let err = PlatformError::ClickFailed {
            kind: ClickEvent::Double,
            reason: "no seat".to_string(),
        };
        assert_eq!(err.to_string(), "Double click failed: no seat");
    }
}
