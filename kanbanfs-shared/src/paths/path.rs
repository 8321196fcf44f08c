/// Logical path helpers
///
/// External paths are slash-delimited with a leading `/`; the root is `/`.
/// Inside recursive queries the root is spelled as its node name
/// ([`ROOT_NAME`]), so `/work/plan.kanban` is `root/work/plan.kanban` there.

use crate::error::{CoreError, CoreResult};
use crate::models::node::ROOT_NAME;

pub const SEPARATOR: char = '/';

/// External spelling of the root
pub const ROOT_PATH: &str = "/";

/// Maximum length of one path segment, matching the column width
pub const MAX_NAME_LEN: usize = 255;

/// Paths no node may occupy, regardless of who creates them
pub const DEFAULT_RESERVED_PATHS: &[&str] = &["/settings"];

/// Checks a single segment
pub fn validate_name(name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::InvalidOperation("Name must not be empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::InvalidOperation(format!(
            "Name must be at most {} bytes",
            MAX_NAME_LEN
        )));
    }
    if name.contains(SEPARATOR) {
        return Err(CoreError::InvalidOperation(format!(
            "Name must not contain '{}'",
            SEPARATOR
        )));
    }
    if name == "." || name == ".." {
        return Err(CoreError::InvalidOperation(format!("'{}' is not a valid name", name)));
    }
    Ok(())
}

/// Canonical external form: leading `/`, no trailing `/`, no empty segments
pub fn normalize(path: &str) -> CoreResult<String> {
    let trimmed = path.trim();
    if !trimmed.starts_with(SEPARATOR) {
        return Err(CoreError::InvalidOperation(format!(
            "Path '{}' must start with '/'",
            path
        )));
    }

    let body = trimmed.trim_end_matches(SEPARATOR);
    if body.is_empty() {
        return Ok(ROOT_PATH.to_string());
    }

    for segment in body[1..].split(SEPARATOR) {
        validate_name(segment)?;
    }
    Ok(body.to_string())
}

/// Appends one segment to a normalized parent path
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("{}{}", ROOT_PATH, name)
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// Segments of a normalized path; empty for the root
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Maps an external path to the form built by the recursive query
pub fn to_stored(path: &str) -> String {
    if path == ROOT_PATH {
        ROOT_NAME.to_string()
    } else {
        format!("{}{}", ROOT_NAME, path)
    }
}

/// Maps a query-built path back to the external form, dropping the root segment
///
/// `None` unless the path starts at the sentinel root. Any other parentless
/// node has no external path.
pub fn from_stored(stored: &str) -> Option<String> {
    match stored.split_once(SEPARATOR) {
        Some((root, rest)) if root == ROOT_NAME => Some(format!("{}{}", ROOT_PATH, rest)),
        None if stored == ROOT_NAME => Some(ROOT_PATH.to_string()),
        _ => None,
    }
}

/// Reserved-path membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedPaths {
    paths: Vec<String>,
}

impl ReservedPaths {
    /// Normalizes each entry; entries that are not valid paths are dropped
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .filter_map(|p| normalize(p.as_ref()).ok())
                .filter(|p| p != ROOT_PATH)
                .collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|reserved| reserved == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl Default for ReservedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_PATHS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/").unwrap(), "/");
        assert_eq!(normalize("/a/b/").unwrap(), "/a/b");
        assert_eq!(normalize(" /a ").unwrap(), "/a");
        assert!(normalize("a/b").is_err());
        assert!(normalize("/a//b").is_err());
        assert!(normalize("/a/../b").is_err());
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "work"), "/work");
        assert_eq!(join("/work", "plan.kanban"), "/work/plan.kanban");
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("/").count(), 0);
        assert_eq!(segments("/a/b").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_stored_mapping() {
        assert_eq!(to_stored("/"), "root");
        assert_eq!(to_stored("/a/b"), "root/a/b");
        assert_eq!(from_stored("root").as_deref(), Some("/"));
        assert_eq!(from_stored("root/a/b").as_deref(), Some("/a/b"));
        for path in ["/", "/a", "/a/b.kanban"] {
            assert_eq!(from_stored(&to_stored(path)).as_deref(), Some(path));
        }
    }

    #[test]
    fn test_stored_mapping_outside_root() {
        assert_eq!(from_stored("other"), None);
        assert_eq!(from_stored("other/a"), None);
        assert_eq!(from_stored("rootish/a"), None);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("work").is_ok());
        assert!(validate_name("plan.kanban").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_reserved_paths() {
        let reserved = ReservedPaths::default();
        assert!(reserved.contains("/settings"));
        assert!(!reserved.contains("/work/settings"));

        let custom = ReservedPaths::new(["/settings/", "/api", "/", "bogus"]);
        assert_eq!(custom.iter().collect::<Vec<_>>(), vec!["/settings", "/api"]);
    }
}
