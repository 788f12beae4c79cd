//! Dual-namespace path addressing for the Argus object store.
//!
//! Every object the platform stores -- client records, flow state, query
//! result tables, uploaded files, export archives -- is addressed by a
//! path value from this crate. Two logically distinct namespaces exist:
//!
//! - [`MetadataPath`] -- the metadata namespace, holding small structured
//!   records (configuration, client state, audit entries).
//! - [`ContentPath`] -- the content namespace, holding bulk objects
//!   (result tables, uploads, logs, archives).
//!
//! Path values are immutable: every transform ([`ContentPath::add_child`],
//! [`ContentPath::dir`], [`ContentPath::set_type`], ...) returns a new
//! value and never mutates or aliases the receiver's component storage.
//!
//! The physical filename for a path (`/`-joined sanitized components plus
//! the [`PathType`] suffix) is computed only at the boundary to the
//! backing store, never cached on the value.

pub mod error;
pub mod path_type;
pub mod sanitize;
pub mod spec;

pub use error::{PathError, PathResult};
pub use path_type::PathType;
pub use sanitize::{sanitize_component, unsanitize_component};
pub use spec::{ContentPath, MetadataPath};
