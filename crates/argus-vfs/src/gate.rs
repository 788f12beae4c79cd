//! The path accessibility gate.
//!
//! The accessor exposes raw, ACL-unaware reads over the backing store
//! for the walking engine. The gate is the one check standing between
//! that raw surface and objects protected by higher-level per-object
//! authorization (backup archives, embedded secrets), keyed by the
//! path's first component.

use std::collections::HashSet;

use crate::error::{VfsError, VfsResult};

/// An explicitly constructed set of protected first-component prefixes.
///
/// An empty set admits every path. A non-empty set denies any path
/// whose first component is in the set and admits all others.
#[derive(Clone, Debug, Default)]
pub struct AccessPolicy {
    protected: HashSet<String>,
}

impl AccessPolicy {
    /// A policy that admits every path.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// A policy protecting the given first-component prefixes.
    pub fn with_protected<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a path with these components may be accessed.
    pub fn check(&self, components: &[String]) -> VfsResult<()> {
        if self.protected.is_empty() {
            return Ok(());
        }
        if let Some(first) = components.first() {
            if self.protected.contains(first) {
                return Err(VfsError::PermissionDenied(components.join("/")));
            }
        }
        Ok(())
    }
}
