//! The generic file store accessor.
//!
//! Implements the walking engine's capability surface (`parse_path`,
//! `lstat`, `read_dir`, `open`) over the two namespaces, with the
//! access policy checked before any store call. Sparse objects are
//! served through their logical view, and a case-insensitive resolver
//! handles paths recorded on case-preserving stores.

use std::sync::Arc;

use argus_paths::{ContentPath, MetadataPath};
use argus_sparse::SparseReader;
use argus_store::{ObjectStore, StoreEntry};
use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::gate::AccessPolicy;
use crate::path::{parse_virtual_path, VirtualPath};

/// Virtual filesystem over a content store and a metadata store.
pub struct FileStoreAccessor {
    store: Arc<dyn ObjectStore>,
    metadata_store: Arc<dyn ObjectStore>,
    policy: AccessPolicy,
}

impl FileStoreAccessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        metadata_store: Arc<dyn ObjectStore>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            store,
            metadata_store,
            policy,
        }
    }

    /// Both namespaces served out of the same backing store.
    pub fn single(store: Arc<dyn ObjectStore>, policy: AccessPolicy) -> Self {
        Self {
            metadata_store: Arc::clone(&store),
            store,
            policy,
        }
    }

    /// Parse virtual path text. No store access, no policy check.
    pub fn parse_path(&self, text: &str) -> VfsResult<VirtualPath> {
        parse_virtual_path(text)
    }

    /// Metadata for the object or directory at `text`.
    ///
    /// A sparse object reports its logical size, not the stored one.
    pub fn lstat(&self, text: &str) -> VfsResult<StoreEntry> {
        let parsed = self.parse_path(text)?;
        let (store, path) = self.target(&parsed);
        self.policy.check(path.components())?;

        let mut entry = store.stat(&path)?;
        if !entry.is_dir {
            if let Ok(reader) = SparseReader::open(store, &path) {
                if reader.is_sparse() {
                    entry.size = reader.logical_size();
                }
            }
        }
        Ok(entry)
    }

    /// The immediate children of the directory at `text`.
    pub fn read_dir(&self, text: &str) -> VfsResult<Vec<StoreEntry>> {
        let parsed = self.parse_path(text)?;
        let (store, path) = self.target(&parsed);
        self.policy.check(path.components())?;
        Ok(store.list_directory(&path)?)
    }

    /// Open the object at `text` for reading.
    ///
    /// The returned reader is always the logical view: for a sparse
    /// object it reconstructs the original stream, for a dense object
    /// it reads straight through.
    pub fn open(&self, text: &str) -> VfsResult<SparseReader> {
        let parsed = self.parse_path(text)?;
        let (store, path) = self.target(&parsed);
        self.policy.check(path.components())?;
        debug!(path = %path.as_physical_path(), "opening object");
        Ok(SparseReader::open(store, &path)?)
    }

    /// Resolve `text` against a case-preserving store whose recorded
    /// casing may differ from the request.
    ///
    /// Exact match first; on a miss the parent is resolved recursively
    /// and its listing scanned for a case-insensitive base-name match.
    /// Failure at any level is not-found. Success returns the
    /// canonically cased path.
    pub fn resolve_nocase(&self, text: &str) -> VfsResult<VirtualPath> {
        let parsed = self.parse_path(text)?;
        let (store, path) = self.target(&parsed);
        self.policy.check(path.components())?;

        let resolved = resolve_nocase_path(store, &path)?;
        Ok(match parsed {
            VirtualPath::Content(_) => VirtualPath::Content(resolved),
            VirtualPath::Metadata(original) => VirtualPath::Metadata(
                MetadataPath::new(resolved.components().to_vec())
                    .set_type(original.path_type()),
            ),
        })
    }

    /// The store and store-level path for a parsed virtual path.
    fn target(&self, parsed: &VirtualPath) -> (&dyn ObjectStore, ContentPath) {
        match parsed {
            VirtualPath::Content(p) => (&*self.store, p.clone()),
            // The physical encoding keeps the metadata type suffix.
            VirtualPath::Metadata(p) => (
                &*self.metadata_store,
                p.as_content_path().set_type(p.path_type()),
            ),
        }
    }
}

fn resolve_nocase_path(store: &dyn ObjectStore, path: &ContentPath) -> VfsResult<ContentPath> {
    if store.stat(path).is_ok() {
        return Ok(path.clone());
    }
    let components = path.components();
    if components.is_empty() {
        return Err(VfsError::NotFound(path.as_physical_path()));
    }

    // The parent's casing may itself be wrong. Ancestor levels are
    // plain directory lookups, so the untyped content default applies.
    let parent = resolve_nocase_path(
        store,
        &ContentPath::new(components[..components.len() - 1].to_vec()),
    )?;

    let suffix = path.path_type().suffix();
    let want = format!("{}{}", path.base(), suffix);
    for entry in store.list_directory(&parent)? {
        if entry.name.eq_ignore_ascii_case(&want) {
            let base = &entry.name[..entry.name.len() - suffix.len()];
            return Ok(parent
                .add_child([base.to_string()])
                .set_type(path.path_type()));
        }
    }
    Err(VfsError::NotFound(path.as_physical_path()))
}
