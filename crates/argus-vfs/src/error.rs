use argus_sparse::SparseError;
use argus_store::StoreError;

/// Errors from the virtual filesystem surface.
///
/// `NotFound` and `PermissionDenied` are the sentinel kinds the walking
/// engine matches on to skip subtrees instead of aborting a walk; all
/// other failures surface immediately.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// The object, directory entry, or case-insensitive match does not
    /// exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The access policy rejected the path.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The virtual path text could not be parsed.
    #[error("invalid virtual path: {0}")]
    InvalidPath(String),

    /// The object's sparse side-car index is unusable.
    #[error("malformed sparse index: {0}")]
    MalformedIndex(String),

    /// Any other failure from the backing store.
    #[error("store error: {0}")]
    Store(StoreError),

    /// I/O error reading an object.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for virtual filesystem operations.
pub type VfsResult<T> = Result<T, VfsError>;

impl From<StoreError> for VfsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => VfsError::NotFound(path),
            other => VfsError::Store(other),
        }
    }
}

impl From<SparseError> for VfsError {
    fn from(err: SparseError) -> Self {
        match err {
            SparseError::Store(store) => store.into(),
            SparseError::MalformedIndex(reason) => VfsError::MalformedIndex(reason),
            SparseError::Io(io) => VfsError::Io(io),
            other => VfsError::Io(std::io::Error::other(other.to_string())),
        }
    }
}
