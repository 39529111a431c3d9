//! Options for unpacking and repackaging
//!
//! # Example
//!
//! ```
//! use razpak::pkg::{RepackOptions, UnpackOptions};
//!
//! // Unpack into `<target>/unpack`, leaving files that already exist alone
//! let unpack = UnpackOptions::original_layout().with_overwrite(false);
//! assert_eq!(unpack.subfolder.as_deref(), Some("unpack"));
//!
//! let repack = RepackOptions::new().with_create_parent_dirs(false);
//! assert!(!repack.create_parent_dirs);
//! ```

/// Subfolder the original tooling unpacked into.
pub const DEFAULT_UNPACK_SUBFOLDER: &str = "unpack";

/// Options controlling where and how files are written when unpacking.
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Subfolder of the target directory to unpack into.
    /// If None, files are unpacked directly into the target.
    pub subfolder: Option<String>,

    /// Overwrite files that already exist on disk
    /// Default: true
    pub overwrite: bool,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl UnpackOptions {
    /// Unpack directly into the target, overwriting existing files.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subfolder: None,
            overwrite: true,
        }
    }

    /// Unpack into `<target>/unpack`, like the original tool did.
    #[must_use]
    pub fn original_layout() -> Self {
        Self::new().with_subfolder(Some(DEFAULT_UNPACK_SUBFOLDER.to_string()))
    }

    #[must_use]
    pub fn with_subfolder(mut self, subfolder: Option<String>) -> Self {
        self.subfolder = subfolder;
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Options controlling how a repackaged archive is written.
#[derive(Debug, Clone)]
pub struct RepackOptions {
    /// Create the output's parent directory if it does not exist
    /// Default: true
    pub create_parent_dirs: bool,
}

impl Default for RepackOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RepackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            create_parent_dirs: true,
        }
    }

    #[must_use]
    pub fn with_create_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }
}
