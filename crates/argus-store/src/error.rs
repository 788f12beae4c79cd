/// Errors from backing store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The addressed object exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
