//! All-or-nothing persistence of a rendered design.

use super::document::RenderedDocument;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

impl RenderedDocument {
    /// Write the body to [`RenderedDocument::path`], replacing any existing file.
    ///
    /// The body goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers see either the old file or the
    /// complete new one.
    pub fn write(&self) -> Result<()> {
        write_atomic(self.path(), self.body())?;
        tracing::info!(
            path = %self.path().display(),
            bytes = self.body().len(),
            "design file written"
        );
        Ok(())
    }
}

pub(crate) fn write_atomic(path: &Path, body: &str) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(body.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
