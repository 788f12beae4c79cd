//! The two path value types.
//!
//! [`MetadataPath`] and [`ContentPath`] are immutable sequences of string
//! components plus a [`PathType`], a safety marker, a directory marker and
//! an opaque tag. All transforms return a new value; the component vector
//! is copied before any append so no two values ever share backing
//! storage. This makes path values freely shareable across threads.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::path_type::PathType;
use crate::sanitize::sanitize_component;

// ---------------------------------------------------------------------------
// Namespace markers
// ---------------------------------------------------------------------------

mod ns {
    /// Sealed namespace marker.
    pub trait Namespace: Clone + std::fmt::Debug + PartialEq + Eq {
        const DEFAULT_TYPE: super::PathType;
    }

    /// The metadata namespace: small structured records.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Metadata;

    /// The content namespace: bulk objects.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Content;

    impl Namespace for Metadata {
        const DEFAULT_TYPE: super::PathType = super::PathType::MetadataJson;
    }

    impl Namespace for Content {
        const DEFAULT_TYPE: super::PathType = super::PathType::ContentAny;
    }
}

use ns::Namespace;

/// A path addressing a structured record in the metadata namespace.
pub type MetadataPath = PathSpec<ns::Metadata>;

/// A path addressing a bulk object in the content namespace.
pub type ContentPath = PathSpec<ns::Content>;

// ---------------------------------------------------------------------------
// PathSpec
// ---------------------------------------------------------------------------

/// An immutable, namespace-qualified logical address.
///
/// The suffix implied by the path type is not part of the components; it
/// is appended only when a physical filename is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSpec<N: Namespace> {
    components: Vec<String>,
    path_type: PathType,
    is_safe: bool,
    is_dir: bool,
    tag: Option<String>,
    #[serde(skip)]
    _ns: PhantomData<N>,
}

impl<N: Namespace> PathSpec<N> {
    /// A root path: no components, namespace default type, safe.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
            path_type: N::DEFAULT_TYPE,
            is_safe: true,
            is_dir: true,
            tag: None,
            _ns: PhantomData,
        }
    }

    /// Build a path from components already sanitized for physical use.
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            path_type: N::DEFAULT_TYPE,
            is_safe: true,
            is_dir: false,
            tag: None,
            _ns: PhantomData,
        }
    }

    /// Build a path from raw caller-supplied components that still need
    /// sanitization before touching a backing store.
    pub fn new_unsafe<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_safe: false,
            ..Self::new(components)
        }
    }

    /// The ordered components. Never includes the suffix.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The last component, or the empty string for a root.
    pub fn base(&self) -> &str {
        self.components.last().map(String::as_str).unwrap_or("")
    }

    /// The path type tag.
    pub fn path_type(&self) -> PathType {
        self.path_type
    }

    /// Whether the components are sanitized for physical use.
    pub fn is_safe(&self) -> bool {
        self.is_safe
    }

    /// Whether this path denotes a container rather than a leaf object.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// The opaque secondary label, if any. Not part of addressing.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Append child components, keeping safety. Returns a new value; the
    /// component storage is copied, never shared.
    pub fn add_child<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut components = self.components.clone();
        components.extend(names.into_iter().map(Into::into));
        Self {
            components,
            is_dir: false,
            ..self.clone()
        }
    }

    /// Append raw child components; the result is marked unsafe.
    pub fn add_unsafe_child<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut child = self.add_child(names);
        child.is_safe = false;
        child
    }

    /// The containing directory: all but the last component, marked as a
    /// directory. The root's directory is the root itself.
    pub fn dir(&self) -> Self {
        let mut components = self.components.clone();
        components.pop();
        Self {
            components,
            is_dir: true,
            ..self.clone()
        }
    }

    /// Replace the path type.
    pub fn set_type(&self, path_type: PathType) -> Self {
        Self {
            path_type,
            ..self.clone()
        }
    }

    /// Replace the opaque tag.
    pub fn set_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..self.clone()
        }
    }

    /// Sanitize every component independently. Idempotent: an already
    /// safe path is returned unchanged.
    pub fn as_safe(&self) -> Self {
        if self.is_safe {
            return self.clone();
        }
        Self {
            components: self
                .components
                .iter()
                .map(|c| sanitize_component(c))
                .collect(),
            is_safe: true,
            ..self.clone()
        }
    }

    /// The logical client-visible string: `/`-joined components plus the
    /// type suffix. Used for display and the virtual accessor syntax.
    pub fn as_client_path(&self) -> String {
        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            out.push_str(component);
        }
        if out.is_empty() {
            out.push('/');
        }
        if !self.is_dir {
            out.push_str(self.path_type.suffix());
        }
        out
    }

    /// The physical store key: `/`-joined sanitized components plus the
    /// type suffix. Computed on demand at the store boundary, never
    /// cached on the value.
    pub fn as_physical_path(&self) -> String {
        let safe = self.as_safe();
        let mut out = safe.components.join("/");
        if !safe.is_dir {
            out.push_str(safe.path_type.suffix());
        }
        out
    }
}

impl MetadataPath {
    /// Project this metadata path into the content namespace, for objects
    /// that are dual-exposed. Components and safety are preserved; the
    /// type resets to the content-namespace default. There is no implicit
    /// reverse conversion.
    pub fn as_content_path(&self) -> ContentPath {
        ContentPath {
            components: self.components.clone(),
            path_type: PathType::ContentAny,
            is_safe: self.is_safe,
            is_dir: self.is_dir,
            tag: self.tag.clone(),
            _ns: PhantomData,
        }
    }
}

impl<N: Namespace> fmt::Display for PathSpec<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_client_path())
    }
}

impl<N: Namespace> Default for PathSpec<N> {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_namespace() {
        let ds = MetadataPath::new(["clients", "C.123"]);
        assert_eq!(ds.path_type(), PathType::MetadataJson);

        let fs = ContentPath::new(["clients", "C.123", "uploads"]);
        assert_eq!(fs.path_type(), PathType::ContentAny);
    }

    #[test]
    fn transforms_never_alias_component_storage() {
        let parent = ContentPath::new(["clients", "C.123"]);
        let child = parent.add_child(["results"]);

        assert_eq!(parent.components(), ["clients", "C.123"]);
        assert_eq!(child.components(), ["clients", "C.123", "results"]);
        assert_ne!(
            parent.components().as_ptr(),
            child.components().as_ptr(),
            "child must not share the parent's backing storage"
        );

        // A second child from the same parent is unaffected by the first.
        let sibling = parent.add_child(["logs"]);
        assert_eq!(sibling.components(), ["clients", "C.123", "logs"]);
        assert_eq!(child.components(), ["clients", "C.123", "results"]);
    }

    #[test]
    fn dir_and_base_laws() {
        let path = ContentPath::new(["a", "b", "c"]);
        assert_eq!(path.base(), "c");

        let dir = path.dir();
        assert!(dir.is_dir());
        assert_eq!(dir.components(), ["a", "b"]);

        let root = ContentPath::root();
        assert_eq!(root.base(), "");
        assert_eq!(root.dir().components().len(), 0);
        assert!(root.dir().is_dir());
    }

    #[test]
    fn set_type_and_tag_return_new_values() {
        let path = ContentPath::new(["results"]).set_type(PathType::ContentCsv);
        assert_eq!(path.path_type(), PathType::ContentCsv);

        let tagged = path.set_tag("index-hint");
        assert_eq!(tagged.tag(), Some("index-hint"));
        assert_eq!(path.tag(), None);
    }

    #[test]
    fn as_safe_is_idempotent() {
        let raw = ContentPath::new_unsafe(["up/loads", "file:name"]);
        assert!(!raw.is_safe());

        let safe = raw.as_safe();
        assert!(safe.is_safe());
        assert_eq!(safe.components(), ["up%2floads", "file%3aname"]);

        let again = safe.as_safe();
        assert_eq!(again.components(), safe.components());
    }

    #[test]
    fn unsafe_child_taints_result() {
        let parent = ContentPath::new(["uploads"]);
        let child = parent.add_unsafe_child(["evil/name"]);
        assert!(!child.is_safe());
        assert!(parent.is_safe());
        assert_eq!(child.as_safe().components(), ["uploads", "evil%2fname"]);
    }

    #[test]
    fn physical_path_appends_suffix() {
        let path = ContentPath::new(["clients", "C.123", "rows"])
            .set_type(PathType::ContentCsv);
        assert_eq!(path.as_physical_path(), "clients/C.123/rows.csv");
        assert_eq!(path.dir().as_physical_path(), "clients/C.123");
    }

    #[test]
    fn client_path_rendering() {
        let path = MetadataPath::new(["clients", "C.123"]);
        assert_eq!(path.as_client_path(), "/clients/C.123.json.db");
        assert_eq!(MetadataPath::root().as_client_path(), "/");
    }

    #[test]
    fn metadata_projects_into_content_namespace() {
        let ds = MetadataPath::new_unsafe(["clients", "C.123"]);
        let fs = ds.as_content_path();
        assert_eq!(fs.components(), ds.components());
        assert_eq!(fs.path_type(), PathType::ContentAny);
        assert!(!fs.is_safe());
    }
}
