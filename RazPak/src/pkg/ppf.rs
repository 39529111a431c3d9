//! `PPAK` level pack container
//!
//! Only the magic is read. Unpacking and repackaging are accepted and do
//! nothing, so callers can treat every recognized archive uniformly.

use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PpfArchive {
    magic: [u8; 4],
    raw: Vec<u8>,
}

impl PpfArchive {
    /// Wrap raw archive bytes. The caller has already checked the magic.
    pub(crate) fn new(raw: Vec<u8>) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&raw[..4]);
        Self { magic, raw }
    }

    #[must_use]
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// The archive bytes as read.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn unpack<P: AsRef<Path>>(&self, target_path: P) -> Result<()> {
        tracing::debug!(
            "PPF unpacking is not supported, nothing written to '{}'",
            target_path.as_ref().display()
        );
        Ok(())
    }

    pub fn repackage<P: AsRef<Path>>(&mut self, save_path: P) -> Result<()> {
        tracing::debug!(
            "PPF repackaging is not supported, nothing written to '{}'",
            save_path.as_ref().display()
        );
        Ok(())
    }
}
