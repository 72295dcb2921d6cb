//! Error types for oem-preferences

/// Errors raised while building or decoding preference mappings
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    /// A preference value was out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The serialized form could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for oem-preferences operations
pub type Result<T> = std::result::Result<T, PreferenceError>;
