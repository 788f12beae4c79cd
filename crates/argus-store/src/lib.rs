//! Backing object stores for the Argus file store.
//!
//! A backing store is a flat, byte-level key-value surface keyed by
//! physical path strings. Path values ([`ContentPath`]) are translated
//! to physical paths at this boundary and nowhere below it; the store
//! itself never interprets object contents or path semantics.
//!
//! [`ContentPath`]: argus_paths::ContentPath
//!
//! # Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`MemoryStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`DirectoryStore`] -- rooted at a local directory tree
//!
//! # Design Rules
//!
//! 1. Writers append; a writer on a missing object creates it.
//! 2. Readers and writers on distinct objects never interfere.
//! 3. A reader concurrent with an appending writer sees some prefix of
//!    the writes.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod directory;
pub mod error;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use directory::DirectoryStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{ObjectStore, StoreEntry, StoreReader, StoreWriter};
