//! Command error classification
//!
//! Utilities like `ls`, `rm` and `tar` only report failures as human-readable
//! stderr text such as `ls: cannot access '/x': No such file or directory`.
//! The trailing segment after the last colon is matched against a fixed phrase
//! table. The mapping is best effort: the text depends on locale and tool
//! version, and anything unknown falls through to [`FsError::Generic`].

use crate::error::FsError;

type Constructor = fn(String) -> FsError;

/// Known stderr phrases, lowercase.
const PHRASES: &[(&str, Constructor)] = &[
    ("no such file or directory", FsError::NotFound),
    ("permission denied", FsError::PermissionDenied),
    ("file exists", FsError::AlreadyExists),
    ("not a directory", FsError::NotADirectory),
    ("is a directory", FsError::IsADirectory),
];

/// Returns the trailing segment after the last colon, trimmed.
pub fn clean_error(stderr: &str) -> &str {
    stderr.rsplit(':').next().unwrap_or_default().trim()
}

fn match_phrase(line: &str) -> Option<FsError> {
    let cleaned = clean_error(line).to_lowercase();
    PHRASES
        .iter()
        .find(|(phrase, _)| *phrase == cleaned)
        .map(|(phrase, make)| make((*phrase).to_string()))
}

/// Maps raw stderr from a failed command to a typed error.
///
/// Each line is tried in order so trailers like tar's
/// "Exiting with failure status" do not hide the real cause.
pub fn classify(stderr: &str) -> FsError {
    stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .find_map(match_phrase)
        .unwrap_or_else(|| FsError::Generic(clean_error(stderr).to_string()))
}
