//! Discovery of image files under the input directory

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Lazy, sorted walk over the image files below a root directory.
///
/// Entries are visited in file name order within each directory, so the
/// sequence is the same on every run over an unchanged tree.
pub struct ImageFiles {
    walker: walkdir::FilterEntry<walkdir::IntoIter, Box<dyn FnMut(&walkdir::DirEntry) -> bool>>,
    extensions: Vec<String>,
}

impl ImageFiles {
    /// Start a walk of `root`, matching `extensions` case-insensitively and
    /// pruning directories listed in `exclude_dirs`.
    ///
    /// Fails immediately if `root` is not an existing directory.
    pub fn new(root: &Path, extensions: &[String], exclude_dirs: &[PathBuf]) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        let exclude_dirs = exclude_dirs.to_vec();
        let filter: Box<dyn FnMut(&walkdir::DirEntry) -> bool> =
            Box::new(move |entry: &walkdir::DirEntry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_excluded_dir(entry.path(), &exclude_dirs)
            });

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(filter);

        Ok(Self {
            walker,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        })
    }

    fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

impl Iterator for ImageFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            // Follows symlinks, so links to regular files count as files
            if path.is_file() && self.is_image(path) {
                return Some(entry.into_path());
            }
        }
    }
}

/// Check if a directory should be pruned.
///
/// Absolute entries match by path prefix, relative entries match any
/// directory with that folder name.
fn is_excluded_dir(path: &Path, exclude_dirs: &[PathBuf]) -> bool {
    for exclude in exclude_dirs {
        if exclude.is_absolute() {
            if path.starts_with(exclude) {
                debug!(?path, ?exclude, "Excluding directory (absolute path match)");
                return true;
            }
        } else if exclude.file_name().is_some() && path.file_name() == exclude.file_name() {
            debug!(?path, ?exclude, "Excluding directory (folder name match)");
            return true;
        }
    }

    false
}
