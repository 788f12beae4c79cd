//! Virtual filesystem view over the Argus file store.
//!
//! The walking/globbing engine sees the file store as a filesystem:
//! parse a virtual path (`fs:/...` for content, `ds:/...` for metadata),
//! then `lstat`, `read_dir`, and `open` against it. This crate provides
//! that surface:
//!
//! - [`AccessPolicy`] -- the accessibility gate. The accessor is raw and
//!   ACL-unaware, so the gate is what keeps protected top-level trees
//!   (backups, secrets) out of reach of glob queries.
//! - [`parse_virtual_path`] -- the `fs:`/`ds:` path syntax, including
//!   the `ds` virtual-root redirect and type-suffix hints.
//! - [`FileStoreAccessor`] -- `lstat`/`read_dir`/`open` plus
//!   case-insensitive resolution, serving sparse objects through their
//!   logical view.
//!
//! Not-found and permission-denied are sentinel error kinds so that
//! directory walks skip inaccessible subtrees instead of aborting.

pub mod accessor;
pub mod error;
pub mod gate;
pub mod path;

pub use accessor::FileStoreAccessor;
pub use error::{VfsError, VfsResult};
pub use gate::AccessPolicy;
pub use path::{parse_virtual_path, VirtualPath};
