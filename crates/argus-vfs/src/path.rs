//! The virtual accessor path syntax.
//!
//! `fs:/a/b/c` addresses the content namespace, `ds:/a/b/c` the
//! metadata namespace; text with no prefix defaults to `fs:`. A
//! recognized suffix on the last component is a type hint, stripped
//! before the path value is built.

use argus_paths::{ContentPath, MetadataPath, PathType};

use crate::error::{VfsError, VfsResult};

/// A parsed virtual path, in one of the two namespaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VirtualPath {
    Content(ContentPath),
    Metadata(MetadataPath),
}

impl VirtualPath {
    /// The components of the underlying path value.
    pub fn components(&self) -> &[String] {
        match self {
            VirtualPath::Content(p) => p.components(),
            VirtualPath::Metadata(p) => p.components(),
        }
    }

    /// Render back to the virtual syntax, with the namespace prefix.
    pub fn to_virtual_string(&self) -> String {
        match self {
            VirtualPath::Content(p) => format!("fs:{p}"),
            VirtualPath::Metadata(p) => format!("ds:{p}"),
        }
    }
}

/// Parse virtual path text into a namespace-qualified path value.
pub fn parse_virtual_path(text: &str) -> VfsResult<VirtualPath> {
    let (metadata, rest) = if let Some(rest) = text.strip_prefix("ds:") {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix("fs:") {
        (false, rest)
    } else {
        // Any other namespace-looking prefix is a caller error, not a
        // path component.
        if let Some(colon) = text.find(':') {
            if !text[..colon].is_empty() && text[..colon].chars().all(|c| c.is_ascii_alphabetic())
            {
                return Err(VfsError::InvalidPath(text.to_string()));
            }
        }
        (false, text)
    };

    let mut components: Vec<&str> = rest.split('/').filter(|c| !c.is_empty()).collect();

    // A recognized suffix on the last component is a type hint.
    let mut hint = None;
    if let Some(last) = components.last_mut() {
        let (path_type, base) = PathType::from_suffixed_name(last);
        *last = base;
        hint = Some(path_type);
    }

    // The `ds` virtual root on a content path is the metadata namespace
    // exposed through the content view.
    if !metadata && components.first() == Some(&"ds") {
        let path = MetadataPath::new(components[1..].to_vec());
        let path_type = match hint {
            // With no recognized suffix the raw proto view is meant.
            None | Some(PathType::ContentAny) => PathType::MetadataProto,
            Some(hint) => hint,
        };
        return Ok(VirtualPath::Metadata(path.set_type(path_type)));
    }

    if metadata {
        let path = MetadataPath::new(components);
        let path = match hint {
            None | Some(PathType::ContentAny) => path,
            Some(hint) => path.set_type(hint),
        };
        Ok(VirtualPath::Metadata(path))
    } else {
        let path = ContentPath::new(components);
        let path = match hint {
            None => path,
            Some(hint) => path.set_type(hint),
        };
        Ok(VirtualPath::Content(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_namespace_is_content() {
        let parsed = parse_virtual_path("/clients/C.1").unwrap();
        match parsed {
            VirtualPath::Content(p) => {
                assert_eq!(p.components(), ["clients", "C.1"]);
                assert_eq!(p.path_type(), PathType::ContentAny);
            }
            other => panic!("expected content path, got {other:?}"),
        }
    }

    #[test]
    fn explicit_prefixes_select_the_namespace() {
        assert!(matches!(
            parse_virtual_path("fs:/clients").unwrap(),
            VirtualPath::Content(_)
        ));
        match parse_virtual_path("ds:/clients/C.1").unwrap() {
            VirtualPath::Metadata(p) => {
                assert_eq!(p.components(), ["clients", "C.1"]);
                assert_eq!(p.path_type(), PathType::MetadataJson);
            }
            other => panic!("expected metadata path, got {other:?}"),
        }
    }

    #[test]
    fn suffix_hint_is_stripped_from_the_last_component() {
        match parse_virtual_path("/clients/C.1/results.csv").unwrap() {
            VirtualPath::Content(p) => {
                assert_eq!(p.components(), ["clients", "C.1", "results"]);
                assert_eq!(p.path_type(), PathType::ContentCsv);
            }
            other => panic!("expected content path, got {other:?}"),
        }
    }

    #[test]
    fn ds_virtual_root_redirects_to_metadata() {
        match parse_virtual_path("fs:/ds/clients/C.1.db").unwrap() {
            VirtualPath::Metadata(p) => {
                assert_eq!(p.components(), ["clients", "C.1"]);
                assert_eq!(p.path_type(), PathType::MetadataProto);
            }
            other => panic!("expected metadata path, got {other:?}"),
        }

        // The JSON view survives the redirect.
        match parse_virtual_path("/ds/clients/C.1.json.db").unwrap() {
            VirtualPath::Metadata(p) => {
                assert_eq!(p.components(), ["clients", "C.1"]);
                assert_eq!(p.path_type(), PathType::MetadataJson);
            }
            other => panic!("expected metadata path, got {other:?}"),
        }

        // No suffix at all still means the raw proto view.
        match parse_virtual_path("/ds/clients/C.1").unwrap() {
            VirtualPath::Metadata(p) => assert_eq!(p.path_type(), PathType::MetadataProto),
            other => panic!("expected metadata path, got {other:?}"),
        }
    }

    #[test]
    fn empty_and_slash_only_text_is_the_content_root() {
        for text in ["", "/", "fs:/"] {
            match parse_virtual_path(text).unwrap() {
                VirtualPath::Content(p) => assert!(p.components().is_empty()),
                other => panic!("expected content path, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_namespace_prefix_is_rejected() {
        assert!(matches!(
            parse_virtual_path("zz:/clients").unwrap_err(),
            VfsError::InvalidPath(_)
        ));
        // A colon later in the text is just path content.
        assert!(parse_virtual_path("/clients/file:name").is_ok());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        match parse_virtual_path("ds:/clients/").unwrap() {
            VirtualPath::Metadata(p) => assert_eq!(p.components(), ["clients"]),
            other => panic!("expected metadata path, got {other:?}"),
        }
    }

    #[test]
    fn round_trips_through_virtual_syntax() {
        let parsed = parse_virtual_path("ds:/clients/C.1").unwrap();
        assert_eq!(parsed.to_virtual_string(), "ds:/clients/C.1.json.db");
    }
}
