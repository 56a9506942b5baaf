//! Destination resolution with collision handling
//!
//! Given a source file and the directory it belongs in, find the path it
//! should be written to:
//! - the plain basename if nothing occupies it,
//! - nothing at all if a byte-identical copy is already there,
//! - otherwise the first `<stem>-<n><ext>` that is free or identical.
//!
//! Suffixes are always derived from the original basename, so `2.jpg` is
//! followed by `2-1.jpg`, `2-2.jpg`, ... and a file that already sits at
//! `2-1.jpg` is recognized on the next run instead of landing in `2-2.jpg`.
//!
//! A dry run writes nothing, so the resolver remembers the targets it has
//! handed out and treats them as occupied by their planned source. The plan
//! then matches what a real run would do.

use crate::compare::files_identical;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Highest suffix tried before giving up on a basename
pub const MAX_SUFFIX: u32 = 9_999;

/// Outcome of resolving a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDestination {
    /// Free path the operation should write to
    Target(PathBuf),
    /// Existing file with identical content; nothing to do
    Duplicate(PathBuf),
}

impl ResolvedDestination {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedDestination::Target(p) | ResolvedDestination::Duplicate(p) => p,
        }
    }
}

/// Resolves final destination paths inside a date directory
#[derive(Debug, Clone, Default)]
pub struct DestinationResolver {
    dry_run: bool,
    /// Dry-run targets already handed out, mapped to their source
    planned: HashMap<PathBuf, PathBuf>,
}

impl DestinationResolver {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            planned: HashMap::new(),
        }
    }

    /// Resolve where `source` goes inside `dest_dir`.
    ///
    /// Creates `dest_dir` when missing, except in dry-run mode.
    pub fn resolve(&mut self, source: &Path, dest_dir: &Path) -> Result<ResolvedDestination> {
        self.ensure_dir(dest_dir)?;

        let file_name = source.file_name().ok_or_else(|| {
            Error::Io(std::io::Error::other(format!(
                "source path has no file name: {}",
                source.display()
            )))
        })?;

        let mut candidate = dest_dir.join(file_name);
        let mut n: u32 = 1;

        loop {
            let occupant = if candidate.exists() {
                Some(candidate.clone())
            } else {
                self.planned.get(&candidate).cloned()
            };
            let Some(occupant) = occupant else {
                if self.dry_run {
                    self.planned.insert(candidate.clone(), source.to_path_buf());
                }
                return Ok(ResolvedDestination::Target(candidate));
            };

            let identical = files_identical(source, &occupant).map_err(|e| Error::Compare {
                src: source.to_path_buf(),
                existing: occupant.clone(),
                source: e,
            })?;
            if identical {
                info!(
                    source = %source.display(),
                    existing = %candidate.display(),
                    "Ignoring identical files"
                );
                return Ok(ResolvedDestination::Duplicate(candidate));
            }

            if n > MAX_SUFFIX {
                return Err(Error::SuffixExhausted {
                    path: dest_dir.join(file_name),
                });
            }
            debug!(occupied = %candidate.display(), n, "Name taken by different content");
            candidate = dest_dir.join(suffixed_name(file_name, n));
            n += 1;
        }
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        if self.dry_run {
            info!(path = %dir.display(), "dry-run: would create directory");
            return Ok(());
        }
        info!(path = %dir.display(), "Creating directory");
        fs::create_dir_all(dir).map_err(|e| Error::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })
    }
}

/// Insert `-<n>` between the stem and the extension of `name`.
///
/// Examples:
/// - "2.jpg" -> "2-1.jpg"
/// - "archive.tar.gz" -> "archive.tar-1.gz"
/// - ".hidden" -> ".hidden-1"
pub fn suffixed_name(name: &OsStr, n: u32) -> OsString {
    let base = Path::new(name);
    let stem = base.file_stem().unwrap_or(name);

    let mut new_name = OsString::from(stem);
    new_name.push(format!("-{}", n));
    if let Some(ext) = base.extension() {
        new_name.push(".");
        new_name.push(ext);
    }
    new_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src_dir = tmp.path().join("src");
        let dest_dir = tmp.path().join("dest");
        fs::create_dir_all(&src_dir).unwrap();
        (tmp, src_dir, dest_dir)
    }

    #[test]
    fn test_suffixed_name() {
        assert_eq!(suffixed_name(OsStr::new("2.jpg"), 1), "2-1.jpg");
        assert_eq!(suffixed_name(OsStr::new("2.jpg"), 2), "2-2.jpg");
        assert_eq!(suffixed_name(OsStr::new("archive.tar.gz"), 3), "archive.tar-3.gz");
        assert_eq!(suffixed_name(OsStr::new(".hidden"), 1), ".hidden-1");
        assert_eq!(suffixed_name(OsStr::new("noext"), 4), "noext-4");
    }

    #[test]
    fn test_free_slot_creates_directory() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("1.jpg");
        fs::write(&src, b"one").unwrap();

        let resolved = DestinationResolver::new(false).resolve(&src, &dest_dir).unwrap();
        assert_eq!(resolved, ResolvedDestination::Target(dest_dir.join("1.jpg")));
        assert!(dest_dir.is_dir());
    }

    #[test]
    fn test_dry_run_creates_nothing() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("1.jpg");
        fs::write(&src, b"one").unwrap();

        let resolved = DestinationResolver::new(true).resolve(&src, &dest_dir).unwrap();
        assert_eq!(resolved.path(), dest_dir.join("1.jpg"));
        assert!(!dest_dir.exists());
    }

    #[test]
    fn test_identical_existing_is_duplicate() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::create_dir_all(&dest_dir).unwrap();
        let src = src_dir.join("1.jpg");
        fs::write(&src, b"same").unwrap();
        fs::write(dest_dir.join("1.jpg"), b"same").unwrap();

        let resolved = DestinationResolver::new(false).resolve(&src, &dest_dir).unwrap();
        assert_eq!(resolved, ResolvedDestination::Duplicate(dest_dir.join("1.jpg")));
    }

    #[test]
    fn test_different_existing_gets_incrementing_suffix() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("2.jpg"), b"").unwrap();
        fs::write(dest_dir.join("2-1.jpg"), b"other").unwrap();
        let src = src_dir.join("2.jpg");
        fs::write(&src, b"mine").unwrap();

        let resolved = DestinationResolver::new(false).resolve(&src, &dest_dir).unwrap();
        assert_eq!(resolved, ResolvedDestination::Target(dest_dir.join("2-2.jpg")));
    }

    #[test]
    fn test_identical_behind_suffix_is_duplicate() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("2.jpg"), b"").unwrap();
        fs::write(dest_dir.join("2-1.jpg"), b"mine").unwrap();
        let src = src_dir.join("2.jpg");
        fs::write(&src, b"mine").unwrap();

        let resolved = DestinationResolver::new(false).resolve(&src, &dest_dir).unwrap();
        assert_eq!(resolved, ResolvedDestination::Duplicate(dest_dir.join("2-1.jpg")));
        assert!(!dest_dir.join("2-2.jpg").exists());
    }

    #[test]
    fn test_dry_run_plans_like_a_real_run() {
        let (_tmp, src_dir, dest_dir) = setup();
        for (dir, content) in [("a", "first"), ("b", "second"), ("c", "first")] {
            fs::create_dir_all(src_dir.join(dir)).unwrap();
            fs::write(src_dir.join(dir).join("x.jpg"), content).unwrap();
        }
        let mut resolver = DestinationResolver::new(true);

        let first = resolver.resolve(&src_dir.join("a/x.jpg"), &dest_dir).unwrap();
        let second = resolver.resolve(&src_dir.join("b/x.jpg"), &dest_dir).unwrap();
        let third = resolver.resolve(&src_dir.join("c/x.jpg"), &dest_dir).unwrap();

        assert_eq!(first, ResolvedDestination::Target(dest_dir.join("x.jpg")));
        assert_eq!(second, ResolvedDestination::Target(dest_dir.join("x-1.jpg")));
        assert_eq!(third, ResolvedDestination::Duplicate(dest_dir.join("x.jpg")));
        assert!(!dest_dir.exists());
    }

    #[test]
    fn test_real_run_does_not_remember_targets() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("1.jpg");
        fs::write(&src, b"one").unwrap();
        let mut resolver = DestinationResolver::new(false);

        // Nothing was written between the calls, so the slot is still free
        let target = ResolvedDestination::Target(dest_dir.join("1.jpg"));
        assert_eq!(resolver.resolve(&src, &dest_dir).unwrap(), target);
        assert_eq!(resolver.resolve(&src, &dest_dir).unwrap(), target);
    }

    #[test]
    fn test_create_dir_failure_is_reported() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("1.jpg");
        fs::write(&src, b"one").unwrap();
        // A regular file where the directory should be
        fs::write(&dest_dir, b"blocker").unwrap();

        let err = DestinationResolver::new(false)
            .resolve(&src, &dest_dir.join("2014"))
            .unwrap_err();
        assert!(matches!(err, Error::CreateDir { .. }));
    }
}
