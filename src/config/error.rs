//! Settings and Profile Error Types

use thiserror::Error;

/// Result type for settings and profile operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings and profile error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No profile with this name
    #[error("Profile not found: {0}")]
    UnknownProfile(String),

    /// The default profile cannot be deleted
    #[error("The '{0}' profile cannot be deleted")]
    ProtectedProfile(String),

    /// Profile names must be non-empty
    #[error("Invalid profile name: {0:?}")]
    InvalidProfileName(String),

    /// Profile document could not be parsed or written
    #[error("Profile data error: {0}")]
    Serialization(#[from] serde_json::Error),
}
