//! File operations applied to sorted images

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// File operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    /// Copy files to destination
    #[default]
    Copy,
    /// Move files to destination
    Move,
    /// Create hard links
    Hardlink,
}

impl FileOperation {
    /// Name used on the command line and in config files
    pub fn name(&self) -> &'static str {
        match self {
            FileOperation::Copy => "copy",
            FileOperation::Move => "move",
            FileOperation::Hardlink => "hardlink",
        }
    }

    /// Progressive label used in log messages
    pub fn label(&self) -> &'static str {
        match self {
            FileOperation::Copy => "Copying",
            FileOperation::Move => "Moving",
            FileOperation::Hardlink => "Hardlinking",
        }
    }

    /// Transfer `source` to `dest`.
    ///
    /// `dest` must not exist. Copy and hardlink leave the source in place,
    /// move removes it. Move only falls back to copying across filesystems.
    pub fn apply(&self, source: &Path, dest: &Path) -> io::Result<()> {
        match self {
            FileOperation::Copy => copy_file(source, dest),
            FileOperation::Move => move_file(source, dest),
            FileOperation::Hardlink => fs::hard_link(source, dest),
        }
    }
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations the current platform can perform.
///
/// Built once at startup and handed to whoever needs to check a requested
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSet {
    available: Vec<FileOperation>,
}

impl OperationSet {
    /// Detect the operations this platform supports
    pub fn detect() -> Self {
        let mut available = vec![FileOperation::Copy, FileOperation::Move];
        if cfg!(any(unix, windows)) {
            available.push(FileOperation::Hardlink);
        }
        Self { available }
    }

    pub fn contains(&self, operation: FileOperation) -> bool {
        self.available.contains(&operation)
    }

    pub fn iter(&self) -> impl Iterator<Item = FileOperation> + '_ {
        self.available.iter().copied()
    }

    /// Return `operation` if available, an error otherwise
    pub fn require(&self, operation: FileOperation) -> Result<FileOperation> {
        if self.contains(operation) {
            Ok(operation)
        } else {
            Err(Error::UnsupportedOperation(operation.name()))
        }
    }
}

fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(error = %e, "Cross-filesystem move, falling back to copy and remove");
            copy_file(source, dest)?;
            if let Err(e) = fs::remove_file(source) {
                warn!(?source, error = %e, "Copied but could not remove source");
                return Err(e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Copy file with buffered I/O, refusing to overwrite an existing `dest`.
///
/// The data is written to a temporary file next to `dest` and renamed into
/// place, so a failed copy leaves nothing at `dest`.
fn copy_file(source: &Path, dest: &Path) -> io::Result<()> {
    let tmp_path = temp_path_for(dest);
    let result = copy_to_temp(source, &tmp_path).and_then(|()| {
        if fs::symlink_metadata(dest).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            ));
        }
        fs::rename(&tmp_path, dest)
    });

    if result.is_err()
        && let Err(e) = fs::remove_file(&tmp_path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %tmp_path.display(), error = %e, "Could not remove temporary file");
    }
    result
}

fn copy_to_temp(source: &Path, tmp_path: &Path) -> io::Result<()> {
    let src_file = File::open(source)?;
    let tmp_file = OpenOptions::new().write(true).create_new(true).open(tmp_path)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, tmp_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }
    writer.flush()?;
    drop(writer);

    // Preserve modification time; rename keeps it
    match fs::metadata(source).and_then(|m| m.modified()) {
        Ok(mtime) => {
            if let Err(e) =
                filetime::set_file_mtime(tmp_path, filetime::FileTime::from_system_time(mtime))
            {
                warn!(?source, error = %e, "Could not preserve modification time");
            }
        }
        Err(e) => debug!(?source, error = %e, "Source modification time unavailable"),
    }

    Ok(())
}

/// Hidden, non-image name in the destination directory, unique per process
/// and call
fn temp_path_for(dest: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let name = format!(
        ".imagesort.{}.{}.{}.tmp",
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    dest.with_file_name(name)
}
