//! Error types for flutter-lldb

use thiserror::Error;

use crate::adb_client::AdbError;

/// Main error type for flutter-lldb
#[derive(Error, Debug)]
pub enum LldbError {
    #[error("Android SDK not found: {0}")]
    SdkNotFound(String),

    #[error("Failed to write launch configuration {path}: {source}")]
    LaunchConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Adb(#[from] AdbError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LldbError>;
