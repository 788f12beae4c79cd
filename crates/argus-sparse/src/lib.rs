//! Sparse-range object storage.
//!
//! Uploaded streams are often sparse (memory images, NTFS files with
//! holes). Only the non-empty extents are stored, compacted back to
//! back in one backing object; a side-car JSON index ([`SparseRange`]
//! descriptors, stored at the same path with the sparse-index type)
//! records how to reconstruct the logical stream. Dense streams get no
//! side-car and no overhead.
//!
//! - [`write_sparse`] performs the single-pass compacting copy, with
//!   running SHA-256/MD5 digests over the physically written bytes and
//!   caller-driven cancellation between chunks.
//! - [`SparseReader`] is the read-side reconstruction: dense extents
//!   come from the backing object, sparse extents read as zeros, and
//!   the reported size is the logical one.

pub mod error;
pub mod index;
pub mod reader;
pub mod writer;

pub use error::{SparseError, SparseResult};
pub use index::{validate_index, RangeReader, SourceRange, SparseRange};
pub use reader::SparseReader;
pub use writer::{write_sparse, SparseWriteResult};
