//! Path resolution: turns the `(rootPath, path)` pair of a request into a
//! canonical location inside a namespace.

use std::fmt;

use super::error::{NfsError, NfsResult};
use crate::security;

/// Top-level storage areas a request may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootPath {
    /// Storage private to the calling application.
    App,
    /// Shared drive storage.
    Drive,
}

impl RootPath {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "app" => Some(RootPath::App),
            "drive" => Some(RootPath::Drive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RootPath::App => "app",
            RootPath::Drive => "drive",
        }
    }
}

impl fmt::Display for RootPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised relative path: segments joined by `/`, no leading or trailing
/// separator. The empty path is the namespace root directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NfsPath(String);

impl NfsPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> NfsResult<Self> {
        let segments = security::sanitize_path(path).map_err(|reason| NfsError::InvalidPath {
            path: path.to_string(),
            reason,
        })?;
        Ok(Self(segments.join("/")))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment; empty for the root.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    pub fn parent(&self) -> NfsPath {
        match self.0.rfind('/') {
            Some(idx) => NfsPath(self.0[..idx].to_string()),
            None => NfsPath::root(),
        }
    }

    /// Append one already validated name.
    pub fn join(&self, name: &str) -> NfsPath {
        if self.is_root() {
            NfsPath(name.to_string())
        } else {
            NfsPath(format!("{}/{}", self.0, name))
        }
    }

    /// Replace the last segment, validating the new name.
    pub fn with_file_name(&self, name: &str) -> NfsResult<NfsPath> {
        security::validate_filename(name).map_err(|reason| NfsError::InvalidPath {
            path: name.to_string(),
            reason,
        })?;
        Ok(self.parent().join(name))
    }

    /// True when `self` lies strictly below `dir`.
    pub fn is_descendant_of(&self, dir: &NfsPath) -> bool {
        if dir.is_root() {
            return !self.is_root();
        }
        self.0.len() > dir.0.len()
            && self.0.starts_with(&dir.0)
            && self.0.as_bytes()[dir.0.len()] == b'/'
    }

    /// True when `self` is an immediate child of `dir`.
    pub fn is_child_of(&self, dir: &NfsPath) -> bool {
        self.is_descendant_of(dir) && self.parent() == *dir
    }
}

impl fmt::Display for NfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request target after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLocation {
    pub root: RootPath,
    pub path: NfsPath,
}

impl fmt::Display for CanonicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.root, self.path)
    }
}

/// Identifies one isolated storage area. `app` storage is keyed by the owning
/// application, `drive` storage is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceKey {
    pub root: RootPath,
    pub owner: Option<String>,
}

impl NamespaceKey {
    pub fn app(app_id: impl Into<String>) -> Self {
        Self {
            root: RootPath::App,
            owner: Some(app_id.into()),
        }
    }

    pub fn drive() -> Self {
        Self {
            root: RootPath::Drive,
            owner: None,
        }
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}:{}", self.root, owner),
            None => write!(f, "{}", self.root),
        }
    }
}

/// Validate a root path parameter. `field` is the request field name used in
/// the error message.
pub fn resolve_root(field: &'static str, value: Option<&str>) -> NfsResult<RootPath> {
    value
        .and_then(RootPath::parse)
        .ok_or_else(|| NfsError::InvalidRootPath {
            field,
            value: value.map(str::to_string),
        })
}

/// Resolve a file target. The path is required and must not be the root.
pub fn resolve(root: Option<&str>, path: Option<&str>) -> NfsResult<CanonicalLocation> {
    let root = resolve_root("rootPath", root)?;
    let path = match path.map(NfsPath::parse).transpose()? {
        Some(path) if !path.is_root() => path,
        _ => return Err(NfsError::MissingParameter("path")),
    };
    Ok(CanonicalLocation { root, path })
}

/// Resolve a directory target; a missing path addresses the namespace root.
pub fn resolve_dir(root: Option<&str>, path: Option<&str>) -> NfsResult<CanonicalLocation> {
    let root = resolve_root("rootPath", root)?;
    let path = path.map(NfsPath::parse).transpose()?.unwrap_or_default();
    Ok(CanonicalLocation { root, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> NfsPath {
        NfsPath::parse(p).unwrap()
    }

    #[test]
    fn test_root_path_parse() {
        assert_eq!(RootPath::parse("app"), Some(RootPath::App));
        assert_eq!(RootPath::parse("drive"), Some(RootPath::Drive));
        assert_eq!(RootPath::parse("APP"), None);
        assert_eq!(RootPath::parse("test"), None);
    }

    #[test]
    fn test_resolve_valid() {
        let location = resolve(Some("app"), Some("test_app/test_file.txt")).unwrap();
        assert_eq!(location.root, RootPath::App);
        assert_eq!(location.path.as_str(), "test_app/test_file.txt");
        assert_eq!(location.to_string(), "app/test_app/test_file.txt");
    }

    #[test]
    fn test_resolve_invalid_root_mentions_field() {
        let err = resolve(Some("undefined"), Some("a.txt")).unwrap_err();
        assert!(matches!(err, NfsError::InvalidRootPath { field: "rootPath", .. }));
        assert!(err.to_string().contains("rootPath"));

        let err = resolve(None, Some("a.txt")).unwrap_err();
        assert!(err.to_string().contains("rootPath"));
    }

    #[test]
    fn test_resolve_missing_path() {
        assert_eq!(
            resolve(Some("app"), None).unwrap_err(),
            NfsError::MissingParameter("path")
        );
        assert_eq!(
            resolve(Some("app"), Some("//")).unwrap_err(),
            NfsError::MissingParameter("path")
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let err = resolve(Some("drive"), Some("../secret")).unwrap_err();
        assert!(matches!(err, NfsError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolve_dir_defaults_to_root() {
        let location = resolve_dir(Some("drive"), None).unwrap();
        assert!(location.path.is_root());
    }

    #[test]
    fn test_parent_and_file_name() {
        let p = path("a/b/c.txt");
        assert_eq!(p.file_name(), "c.txt");
        assert_eq!(p.parent(), path("a/b"));
        assert_eq!(path("c.txt").parent(), NfsPath::root());
        assert_eq!(NfsPath::root().join("x").join("y"), path("x/y"));
    }

    #[test]
    fn test_with_file_name() {
        let p = path("test_app/test_file.txt");
        assert_eq!(
            p.with_file_name("new_test_file.txt").unwrap(),
            path("test_app/new_test_file.txt")
        );
        assert!(p.with_file_name("bad/name").is_err());
    }

    #[test]
    fn test_descendants() {
        let dir = path("test_app");
        assert!(path("test_app/a.txt").is_descendant_of(&dir));
        assert!(path("test_app/sub/a.txt").is_descendant_of(&dir));
        assert!(!path("test_app_other/a.txt").is_descendant_of(&dir));
        assert!(!dir.is_descendant_of(&dir));
        assert!(path("test_app/a.txt").is_child_of(&dir));
        assert!(!path("test_app/sub/a.txt").is_child_of(&dir));
        assert!(path("top.txt").is_child_of(&NfsPath::root()));
    }

    #[test]
    fn test_namespace_key_ordering_is_total() {
        let a = NamespaceKey::app("one");
        let b = NamespaceKey::app("two");
        let d = NamespaceKey::drive();
        assert!(a < b);
        assert!(b < d);
        assert_eq!(d.to_string(), "drive");
        assert_eq!(a.to_string(), "app:one");
    }
}
