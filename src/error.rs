use thiserror::Error;

/// Main error type for Arbgraph
#[derive(Error, Debug)]
pub enum ArbgraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot file could not be parsed into typed records
    #[error("Snapshot error in {file}: {source}")]
    Snapshot {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No exact or fuzzy match for a query name
    #[error("Name not found: {0}")]
    NameNotFound(String),

    /// An individual points at a decision that is not in the snapshot
    #[error("Decision not found: {0}")]
    DecisionNotFound(String),

    /// A decision or party points at a case that is not in the snapshot
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File watcher errors
    #[error("Watch error: {0}")]
    Watch(String),
}

/// Convenient Result type using ArbgraphError
pub type Result<T> = std::result::Result<T, ArbgraphError>;
