//! Atomic file replacement
//!
//! New contents go to a temporary file in the target's own directory, are
//! flushed to disk, then renamed over the target. A failure at any step
//! drops (and deletes) the temporary file and leaves the target as it was.

use std::fs;
use std::io::Write;
use std::path::Path;
use crate::error::{Result, PrismError};

/// Replace `path` with `bytes` without ever exposing a partial file
pub fn atomic_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| PrismError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".prism-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_error)?;

    tmp.write_all(bytes).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;

    // Carry over the original file mode
    if let Some(metadata) = fs::metadata(path).ok().filter(|m| m.is_file()) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(write_error)?;
    }

    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
