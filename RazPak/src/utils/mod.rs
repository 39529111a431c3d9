//! Utility functions

pub mod path;

pub use path::{archive_dir_path, archive_file_path, normalize_path};
