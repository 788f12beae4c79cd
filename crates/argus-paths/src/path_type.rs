use serde::{Deserialize, Serialize};

use crate::error::{PathError, PathResult};

/// The logical shape of the bytes stored at a path.
///
/// Every type owns exactly one canonical physical suffix. Types in the
/// metadata namespace address small structured records; types in the
/// content namespace address bulk objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathType {
    /// Structured record serialized as JSON (metadata namespace default).
    MetadataJson,
    /// Structured record serialized as a protobuf message.
    MetadataProto,
    /// A container, not a leaf object. Carries no suffix.
    Directory,
    /// Bulk JSON object (e.g. a result-set row file).
    ContentJson,
    /// Offset index side-car for a bulk JSON object.
    ContentJsonIndex,
    /// Typed CSV table.
    ContentCsv,
    /// Sparse-range descriptor side-car (JSON array of ranges).
    ContentSparseIndex,
    /// Advisory lock marker.
    ContentLock,
    /// Exported download archive.
    ContentArchive,
    /// Raw bytes of unknown shape (content namespace default).
    ContentAny,
}

/// Suffix registry ordered longest-first so that lookup by suffix is
/// never ambiguous: `.json.db` must win over `.db`, `.json.index` over
/// `.json`. Types with an empty suffix do not participate in lookup.
const REGISTRY: &[(PathType, &str)] = &[
    (PathType::ContentJsonIndex, ".json.index"),
    (PathType::MetadataJson, ".json.db"),
    (PathType::ContentJson, ".json"),
    (PathType::ContentLock, ".lock"),
    (PathType::ContentCsv, ".csv"),
    (PathType::ContentArchive, ".zip"),
    (PathType::ContentSparseIndex, ".idx"),
    (PathType::MetadataProto, ".db"),
];

impl PathType {
    /// The canonical physical suffix for this type.
    pub fn suffix(&self) -> &'static str {
        match self {
            PathType::MetadataJson => ".json.db",
            PathType::MetadataProto => ".db",
            PathType::Directory => "",
            PathType::ContentJson => ".json",
            PathType::ContentJsonIndex => ".json.index",
            PathType::ContentCsv => ".csv",
            PathType::ContentSparseIndex => ".idx",
            PathType::ContentLock => ".lock",
            PathType::ContentArchive => ".zip",
            PathType::ContentAny => "",
        }
    }

    /// Returns `true` for types addressing the metadata namespace.
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            PathType::MetadataJson | PathType::MetadataProto | PathType::Directory
        )
    }

    /// Split an externally presented physical filename into its path type
    /// and the base name with the suffix stripped.
    ///
    /// The longest registered suffix wins. A name with no recognized
    /// suffix is raw content: `(ContentAny, name)`.
    pub fn from_suffixed_name(name: &str) -> (PathType, &str) {
        for (path_type, suffix) in REGISTRY {
            if let Some(base) = name.strip_suffix(suffix) {
                return (*path_type, base);
            }
        }
        (PathType::ContentAny, name)
    }

    /// Strict suffix lookup, for callers that must reject unknown
    /// suffixes instead of falling back to raw content.
    pub fn parse_suffix(suffix: &str) -> PathResult<PathType> {
        REGISTRY
            .iter()
            .find(|(_, s)| *s == suffix)
            .map(|(t, _)| *t)
            .ok_or_else(|| PathError::UnknownSuffix(suffix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_ordered_longest_first() {
        for pair in REGISTRY.windows(2) {
            assert!(
                pair[0].1.len() >= pair[1].1.len(),
                "{:?} listed before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn suffix_round_trip() {
        for (path_type, suffix) in REGISTRY {
            let name = format!("notebook{suffix}");
            let (parsed, base) = PathType::from_suffixed_name(&name);
            assert_eq!(parsed, *path_type, "suffix {suffix:?}");
            assert_eq!(base, "notebook");
        }
    }

    #[test]
    fn longest_suffix_wins() {
        assert_eq!(
            PathType::from_suffixed_name("state.json.db"),
            (PathType::MetadataJson, "state")
        );
        assert_eq!(
            PathType::from_suffixed_name("state.db"),
            (PathType::MetadataProto, "state")
        );
        assert_eq!(
            PathType::from_suffixed_name("rows.json.index"),
            (PathType::ContentJsonIndex, "rows")
        );
        assert_eq!(
            PathType::from_suffixed_name("rows.json"),
            (PathType::ContentJson, "rows")
        );
    }

    #[test]
    fn unknown_suffix_is_raw_content() {
        assert_eq!(
            PathType::from_suffixed_name("notepad.exe"),
            (PathType::ContentAny, "notepad.exe")
        );
        assert_eq!(
            PathType::from_suffixed_name("plain"),
            (PathType::ContentAny, "plain")
        );
    }

    #[test]
    fn strict_lookup_rejects_unknown() {
        assert!(PathType::parse_suffix(".csv").is_ok());
        assert!(PathType::parse_suffix(".exe").is_err());
    }
}
