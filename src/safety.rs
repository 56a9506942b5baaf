//! Startup checks on the input and output directories
//!
//! Sorting into a directory that is part of the input tree would feed the
//! sorter its own output; sorting the output tree into the input would
//! rearrange the originals. Both are rejected before any file is touched.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate the source and destination directories.
///
/// `source` must be an existing directory. `dest` may be missing (it is
/// created later) but must be a directory if it exists. Neither may equal or
/// contain the other once symlinks are resolved.
pub fn validate_directories(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }
    if dest.exists() && !dest.is_dir() {
        return Err(Error::NotADirectory(dest.to_path_buf()));
    }

    let source_real = fs::canonicalize(source)?;
    let dest_real = resolve_path(dest)?;
    debug!(source = %source_real.display(), dest = %dest_real.display(), "Resolved directories");

    if source_real.starts_with(&dest_real) {
        return Err(Error::NestedDirectory {
            inner: source.to_path_buf(),
            outer: dest.to_path_buf(),
        });
    }
    if dest_real.starts_with(&source_real) {
        return Err(Error::NestedDirectory {
            inner: dest.to_path_buf(),
            outer: source.to_path_buf(),
        });
    }

    Ok(())
}

/// Canonicalize a path that may not exist yet: the deepest existing ancestor
/// is resolved and the missing components are appended to it.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if existing.exists() {
            break;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            // `..` or a root that does not exist; nothing left to resolve
            _ => return Ok(absolute),
        }
    }

    let mut resolved = fs::canonicalize(existing)?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}
