use std::io::{Read, Seek, Write};

use argus_paths::ContentPath;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;

/// Metadata for one stored object or directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEntry {
    /// Physical base name, including the type suffix for leaf objects.
    pub name: String,
    /// Physical size in bytes. Zero for directories.
    pub size: u64,
    /// Last modification time, where the backend tracks one.
    pub mtime: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

/// A readable, seekable handle onto one stored object.
pub trait StoreReader: Read + Seek {
    /// Physical size of the object in bytes.
    fn size(&self) -> StoreResult<u64>;
}

impl std::fmt::Debug for dyn StoreReader + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreReader").finish_non_exhaustive()
    }
}

/// A writable handle onto one stored object. Writes append; a handle on
/// a missing object creates it. Data is committed as it is written, so
/// dropping the handle loses nothing already flushed.
pub trait StoreWriter: Write {
    /// Discard the object's current content, resetting it to empty.
    fn truncate(&mut self) -> StoreResult<()>;
}

/// A flat object store addressed by content paths.
///
/// Implementations must satisfy these invariants:
/// - The store is a pure byte-level key-value surface. It never
///   interprets object contents.
/// - The key of an object is its physical path, computed from the path
///   value at this boundary (`/`-joined sanitized components plus the
///   type suffix).
/// - Readers and writers on distinct objects never interfere. A reader
///   opened concurrently with an appending writer sees some prefix of
///   the writes.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Open an object for reading. Missing objects are
    /// [`StoreError::NotFound`](crate::StoreError::NotFound).
    fn reader(&self, path: &ContentPath) -> StoreResult<Box<dyn StoreReader>>;

    /// Open an object for appending, creating it (and any missing parent
    /// directories) if needed.
    fn writer(&self, path: &ContentPath) -> StoreResult<Box<dyn StoreWriter>>;

    /// Metadata for one object or directory.
    fn stat(&self, path: &ContentPath) -> StoreResult<StoreEntry>;

    /// List the immediate children of a directory.
    fn list_directory(&self, path: &ContentPath) -> StoreResult<Vec<StoreEntry>>;

    /// Delete an object. Deleting a missing object is
    /// [`StoreError::NotFound`](crate::StoreError::NotFound).
    fn delete(&self, path: &ContentPath) -> StoreResult<()>;
}
