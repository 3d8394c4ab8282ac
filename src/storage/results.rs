//! Storage result types
//!
//! Defines values returned by filesystem operations.

use bytes::Bytes;

/// Kind of filesystem entry, read from the mode column of `ls -ld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Other(char),
}

impl FileType {
    /// Parses the leading type character of a mode string like `drwxr-xr-x`.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode.chars().next()? {
            '-' => Some(FileType::Regular),
            'd' => Some(FileType::Directory),
            other => Some(FileType::Other(other)),
        }
    }
}

/// Options for directory listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include dotfiles (`ls -A`).
    pub all: bool,
    /// One metadata line per entry (`ls -l`).
    pub long: bool,
}

/// Downloadable content for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Bytes,
}

/// A file received for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_type() {
        assert_eq!(FileType::from_mode(""), None);
        assert_eq!(FileType::from_mode("-"), Some(FileType::Regular));
        assert_eq!(FileType::from_mode("-rwxr--r--"), Some(FileType::Regular));
        assert_eq!(FileType::from_mode("drwxr--r--"), Some(FileType::Directory));
        assert_eq!(
            FileType::from_mode("prwxr--r-- etc"),
            Some(FileType::Other('p'))
        );
    }
}
