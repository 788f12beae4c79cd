/// Errors from path construction and suffix resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// A physical suffix did not match any registered path type.
    #[error("unrecognized path suffix: {0:?}")]
    UnknownSuffix(String),

    /// A virtual path string could not be parsed.
    #[error("invalid path syntax: {0}")]
    InvalidSyntax(String),
}

/// Result alias for path operations.
pub type PathResult<T> = Result<T, PathError>;
