/// Errors from sparse-range storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SparseError {
    /// The side-car index is unparseable or violates ordering.
    #[error("malformed sparse index: {0}")]
    MalformedIndex(String),

    /// The copy loop was cancelled between chunks. Bytes already
    /// written stay in place.
    #[error("sparse write cancelled after {written} bytes")]
    Cancelled { written: u64 },

    /// The source ended before a declared range was fully read.
    #[error("short read: range declared {expected} bytes, source yielded {got}")]
    ShortRead { expected: u64, got: u64 },

    /// Error from the backing store.
    #[error(transparent)]
    Store(#[from] argus_store::StoreError),

    /// I/O error from the source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for sparse storage operations.
pub type SparseResult<T> = Result<T, SparseError>;
