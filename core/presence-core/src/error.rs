//! Error types for presence-core operations.

/// All errors that can occur in presence-core operations.
///
/// Store failures are recoverable by design: a corrupt snapshot degrades to an
/// empty mapping at load time, and a failed save leaves the in-memory mapping
/// authoritative until the next mutation retries the write.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store has no backing file path")]
    NoStorePath,
}

/// Convenience type alias for Results using HistoryError.
pub type Result<T> = std::result::Result<T, HistoryError>;
