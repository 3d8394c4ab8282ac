//! Path validation
//!
//! Normalizes requested paths and checks them against the configured
//! allow-list. Pure string handling; nothing here touches the filesystem.

use std::path::Path;

use crate::error::FsError;

/// Normalizes a path to canonical absolute form.
///
/// Redundant and trailing separators are removed, `.` is dropped and `..`
/// pops one component without ever climbing above `/`.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Last component of a normalized path, empty for `/`.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Parent of a normalized path. The parent of `/` is `/`.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Joins a normalized directory and a single file name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Checks that an uploaded file name is a single, plain path component.
pub fn validate_file_name(name: &str) -> Result<&str, FsError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(FsError::InvalidPath(format!("invalid file name: {name:?}")));
    }
    Ok(name)
}

/// Set of root directories requests may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    roots: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roots: roots.into_iter().map(|r| normalize(r.as_ref())).collect(),
        }
    }

    /// Configured roots in normalized form.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Normalizes `path` and checks it lies under an allowed root.
    ///
    /// Matching is per component, so `/tmpfoo` is not under `/tmp`.
    pub fn validate(&self, path: &str) -> Result<String, FsError> {
        let normalized = normalize(path);
        let candidate = Path::new(&normalized);
        if self
            .roots
            .iter()
            .any(|root| candidate.starts_with(Path::new(root)))
        {
            Ok(normalized)
        } else {
            Err(FsError::InvalidPath(format!("unsupported path: {normalized}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators() {
        assert_eq!(normalize("/tmp"), "/tmp");
        assert_eq!(normalize("//tmp"), "/tmp");
        assert_eq!(normalize("///tmp"), "/tmp");
        assert_eq!(normalize("tmp"), "/tmp");
        assert_eq!(normalize("/tmp/"), "/tmp");
        assert_eq!(normalize("tmp/"), "/tmp");
        assert_eq!(normalize("//tmp//"), "/tmp");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn resolves_dot_segments() {
        assert_eq!(normalize("/tmp/./a"), "/tmp/a");
        assert_eq!(normalize("/tmp/a/../b"), "/tmp/b");
        assert_eq!(normalize("/tmp/../../../etc"), "/etc");
    }

    #[test]
    fn path_helpers() {
        assert_eq!(basename("/tmp/dir"), "dir");
        assert_eq!(basename("/"), "");
        assert_eq!(parent("/tmp/dir"), "/tmp");
        assert_eq!(parent("/tmp"), "/");
        assert_eq!(parent("/"), "/");
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/tmp", "a"), "/tmp/a");
    }

    #[test]
    fn allows_paths_under_roots() {
        let allow = AllowList::new(["/tmp/", "/srv/data"]);
        assert_eq!(allow.roots(), ["/tmp", "/srv/data"]);
        assert_eq!(allow.validate("tmp/").unwrap(), "/tmp");
        assert_eq!(allow.validate("/tmp/a/b").unwrap(), "/tmp/a/b");
        assert_eq!(allow.validate("srv/data/x").unwrap(), "/srv/data/x");
    }

    #[test]
    fn rejects_paths_outside_roots() {
        let allow = AllowList::new(["/tmp"]);
        for path in ["/unsupported", "/tmpfoo", "/tmp/../etc/passwd", "/"] {
            assert!(
                matches!(allow.validate(path), Err(FsError::InvalidPath(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn file_names_are_single_components() {
        assert!(validate_file_name("file.txt").is_ok());
        for name in ["", ".", "..", "a/b", "a\0b"] {
            assert!(validate_file_name(name).is_err(), "{name:?}");
        }
    }
}
