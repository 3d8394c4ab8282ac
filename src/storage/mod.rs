//! Filesystem storage management
//!
//! Handles path validation and the filesystem operations exposed over HTTP.

pub mod operations;
pub mod results;
pub mod validation;

pub use operations::FilesystemApi;
pub use results::{Attachment, FileType, ListOptions, UploadFile};
pub use validation::{AllowList, normalize};
