use thiserror::Error;

/// Main error type for cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Opaque failure from the durable tier. Never retried here; the
    /// collaborator (or its caller) owns retry policy.
    #[error("Durable tier failure: {0}")]
    Storage(String),

    #[error("Data corruption detected for '{key}': expected crc {expected:#010x}, got {actual:#010x}")]
    Corruption {
        key: String,
        expected: u32,
        actual: u32,
    },
}

impl CacheError {
    /// True for the expected miss conditions that callers routinely handle
    /// (as opposed to I/O-level failures that should surface).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
