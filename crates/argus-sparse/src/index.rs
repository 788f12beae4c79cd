use serde::{Deserialize, Serialize};

use crate::error::{SparseError, SparseResult};

/// One descriptor in the side-car range index.
///
/// `original_offset`/`length` describe the logical extent;
/// `file_offset` is where the extent's bytes begin in the compacted
/// backing object, and `file_length` is how many bytes are physically
/// stored there (0 for a sparse extent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseRange {
    pub file_offset: u64,
    pub original_offset: u64,
    pub length: u64,
    pub file_length: u64,
}

impl SparseRange {
    /// Logical end offset of this extent.
    pub fn original_end(&self) -> u64 {
        self.original_offset + self.length
    }

    /// A descriptor stores no bytes when its extent is sparse.
    pub fn is_sparse(&self) -> bool {
        self.file_length == 0
    }
}

/// One extent reported by a range-aware source stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRange {
    pub offset: u64,
    pub length: u64,
    pub is_sparse: bool,
}

/// A source stream that can describe which of its extents hold data.
///
/// `ranges()` returning an empty list means the source cannot produce
/// ranges; callers fall back to a plain dense copy of the whole stream.
pub trait RangeReader: std::io::Read + std::io::Seek {
    fn ranges(&self) -> Vec<SourceRange>;
}

/// Check that descriptors are ordered by logical offset and do not
/// overlap. A violating index cannot be read back deterministically, so
/// it is rejected as malformed.
pub fn validate_index(index: &[SparseRange]) -> SparseResult<()> {
    let mut logical_end = 0u64;
    for range in index {
        if range.original_offset < logical_end {
            return Err(SparseError::MalformedIndex(format!(
                "range at logical offset {} overlaps the previous extent ending at {}",
                range.original_offset, logical_end
            )));
        }
        if range.file_length > range.length {
            return Err(SparseError::MalformedIndex(format!(
                "range at logical offset {} stores {} bytes for a {}-byte extent",
                range.original_offset, range.file_length, range.length
            )));
        }
        logical_end = range.original_end();
    }
    Ok(())
}
