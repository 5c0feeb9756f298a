use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Explorer error types.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// I/O errors from the local adapter.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A listing or move was attempted while the backend is unreachable.
    #[error("Not connected")]
    NotConnected,

    /// Backend failure reported by a remote collaborator.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Two planned operations resolve to the same destination.
    #[error("Naming conflict: {source_path} and {other_source} both move to {destination}")]
    NamingConflict {
        destination: String,
        source_path: String,
        other_source: String,
    },

    /// The destination of a move already exists.
    #[error("Destination already exists: {0}")]
    Conflict(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Filesystem watcher could not be started.
    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExplorerError {
    /// Whether this error only means the backend is currently offline.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, ExplorerError::NotConnected)
    }
}
