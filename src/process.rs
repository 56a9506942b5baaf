//! Sorting engine
//!
//! Handles the per-file pipeline:
//! - Validating input and output directories
//! - Scanning the input tree for images
//! - Resolving capture dates and destination buckets
//! - Skipping duplicates and applying the file operation

use crate::classify::destination_subdir;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolve::{DestinationResolver, ResolvedDestination};
use crate::safety::validate_directories;
use crate::scan::ImageFiles;
use crate::time::{CaptureDate, DateExtractor, ExifDateExtractor, capture_date};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span};

/// Result of processing a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination path: written, identical existing file, or planned
    pub destination: PathBuf,
    /// Resolved capture date
    pub date: CaptureDate,
    /// Processing status
    pub status: ProcessingStatus,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Operation was applied
    Applied,
    /// Identical file already present at destination
    Duplicate,
    /// Dry run - would have applied the operation
    DryRun,
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub applied: usize,
    pub duplicates: usize,
    pub dry_run: usize,
    pub unknown_dates: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, result: &FileResult) {
        self.total_files += 1;
        if !result.date.is_known() {
            self.unknown_dates += 1;
        }
        match result.status {
            ProcessingStatus::Applied => self.applied += 1,
            ProcessingStatus::Duplicate => self.duplicates += 1,
            ProcessingStatus::DryRun => self.dry_run += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Applied: {}, Duplicates: {}, Dry run: {}, Unknown date: {}",
            self.total_files, self.applied, self.duplicates, self.dry_run, self.unknown_dates
        )
    }
}

/// Sorts images from the input directory into the date tree
pub struct Sorter<E = ExifDateExtractor> {
    config: Config,
    extractor: E,
    resolver: DestinationResolver,
    stats: ProcessingStats,
}

impl Sorter<ExifDateExtractor> {
    /// Create a sorter that reads capture dates from EXIF metadata
    pub fn new(config: Config) -> Self {
        Self::with_extractor(config, ExifDateExtractor)
    }
}

impl<E: DateExtractor> Sorter<E> {
    /// Create a sorter with a custom date source
    pub fn with_extractor(config: Config, extractor: E) -> Self {
        let resolver = DestinationResolver::new(config.dry_run);
        Self {
            config,
            extractor,
            resolver,
            stats: ProcessingStats::new(),
        }
    }

    /// Run the sorting pipeline.
    ///
    /// Stops at the first fatal error; files handled before it stay where
    /// they were put.
    pub fn run(&mut self) -> Result<Vec<FileResult>> {
        let _span = span!(
            Level::INFO,
            "sort",
            operation = %self.config.operation,
            dry_run = self.config.dry_run
        )
        .entered();

        validate_directories(&self.config.input_dir, &self.config.output_dir)?;
        self.resolver = DestinationResolver::new(self.config.dry_run);
        self.ensure_output_dir()?;

        let files = ImageFiles::new(
            &self.config.input_dir,
            &self.config.image_extensions,
            &self.config.exclude_dirs,
        )?;

        let mut results = Vec::new();
        for path in files {
            let result = self.process_file(&path)?;
            self.stats.record(&result);
            results.push(result);
        }

        info!("{}", self.stats.summary());
        Ok(results)
    }

    /// Take one discovered file through date, destination and operation
    fn process_file(&mut self, path: &Path) -> Result<FileResult> {
        let _file_span = span!(Level::DEBUG, "process_file", ?path).entered();

        let date = capture_date(&self.extractor, path);
        let dest_dir = self.config.output_dir.join(destination_subdir(&date));
        debug!(?path, %date, dest_dir = %dest_dir.display(), "Resolved bucket");

        let dest = match self.resolver.resolve(path, &dest_dir)? {
            ResolvedDestination::Duplicate(existing) => {
                return Ok(FileResult {
                    source: path.to_path_buf(),
                    destination: existing,
                    date,
                    status: ProcessingStatus::Duplicate,
                });
            }
            ResolvedDestination::Target(dest) => dest,
        };

        let operation = self.config.operation;

        if self.config.dry_run {
            info!(
                source = %path.display(),
                destination = %dest.display(),
                "dry-run: {}",
                operation.label()
            );
            return Ok(FileResult {
                source: path.to_path_buf(),
                destination: dest,
                date,
                status: ProcessingStatus::DryRun,
            });
        }

        info!(
            source = %path.display(),
            destination = %dest.display(),
            "{}",
            operation.label()
        );
        if let Err(e) = operation.apply(path, &dest) {
            error!(
                source = %path.display(),
                destination = %dest.display(),
                error = %e,
                "Could not perform operation"
            );
            return Err(Error::Operation {
                label: operation.label(),
                src: path.to_path_buf(),
                dest,
                source: e,
            });
        }

        Ok(FileResult {
            source: path.to_path_buf(),
            destination: dest,
            date,
            status: ProcessingStatus::Applied,
        })
    }

    fn ensure_output_dir(&self) -> Result<()> {
        let output = &self.config.output_dir;
        if output.is_dir() {
            return Ok(());
        }
        if self.config.dry_run {
            info!(path = %output.display(), "dry-run: would create output directory");
            return Ok(());
        }
        info!(path = %output.display(), "Creating output directory");
        fs::create_dir_all(output).map_err(|e| Error::CreateDir {
            path: output.clone(),
            source: e,
        })
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::FileOperation;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Dates keyed by file name; anything else has no date
    struct DateTable(HashMap<&'static str, NaiveDate>);

    impl DateExtractor for DateTable {
        fn extract(&self, path: &Path) -> Result<NaiveDate> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            self.0.get(name).copied().ok_or_else(|| Error::ExifRead {
                path: path.to_path_buf(),
                message: "no date".into(),
            })
        }
    }

    fn table() -> DateTable {
        DateTable(HashMap::from([
            ("1.jpg", NaiveDate::from_ymd_opt(2014, 4, 13).unwrap()),
            ("2.jpg", NaiveDate::from_ymd_opt(2014, 3, 22).unwrap()),
        ]))
    }

    fn setup(operation: FileOperation) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("input");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("1.jpg"), b"first image").unwrap();
        fs::write(input.join("2.jpg"), b"second image").unwrap();
        fs::write(input.join("invalid.jpg"), b"no metadata").unwrap();
        let config = Config::new(input, tmp.path().join("output"), operation);
        (tmp, config)
    }

    #[test]
    fn test_processing_stats() {
        let mut stats = ProcessingStats::new();
        let result = FileResult {
            source: PathBuf::from("a.jpg"),
            destination: PathBuf::from("out/unknown/a.jpg"),
            date: CaptureDate::Unknown,
            status: ProcessingStatus::Duplicate,
        };
        stats.record(&result);

        let summary = stats.summary();
        assert!(summary.contains("Total: 1"));
        assert!(summary.contains("Duplicates: 1"));
        assert!(summary.contains("Unknown date: 1"));
    }

    #[test]
    fn test_sorts_into_buckets() {
        let (_tmp, config) = setup(FileOperation::Copy);
        let output = config.output_dir.clone();
        let mut sorter = Sorter::with_extractor(config, table());

        let results = sorter.run().unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.status == ProcessingStatus::Applied));
        assert!(output.join("2014").join("2014_04_13").join("1.jpg").is_file());
        assert!(output.join("2014").join("2014_03_22").join("2.jpg").is_file());
        assert!(output.join("unknown").join("invalid.jpg").is_file());
        assert_eq!(sorter.stats().unknown_dates, 1);
    }

    #[test]
    fn test_second_run_finds_duplicates() {
        let (_tmp, config) = setup(FileOperation::Copy);
        Sorter::with_extractor(config.clone(), table()).run().unwrap();

        let mut sorter = Sorter::with_extractor(config, table());
        let results = sorter.run().unwrap();
        assert!(results.iter().all(|r| r.status == ProcessingStatus::Duplicate));
        assert_eq!(sorter.stats().duplicates, 3);
        assert_eq!(sorter.stats().applied, 0);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let (_tmp, mut config) = setup(FileOperation::Move);
        config.dry_run = true;
        let input = config.input_dir.clone();
        let output = config.output_dir.clone();

        let results = Sorter::with_extractor(config, table()).run().unwrap();

        assert!(results.iter().all(|r| r.status == ProcessingStatus::DryRun));
        assert_eq!(
            results[0].destination,
            output.join("2014").join("2014_04_13").join("1.jpg")
        );
        assert!(!output.exists());
        assert!(input.join("1.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_operation_failure_is_fatal() {
        let (_tmp, config) = setup(FileOperation::Copy);
        let output = config.output_dir.clone();
        // A dangling symlink looks like a free name but cannot be created
        let unknown = output.join("unknown");
        fs::create_dir_all(&unknown).unwrap();
        std::os::unix::fs::symlink(output.join("nowhere"), unknown.join("invalid.jpg")).unwrap();

        let err = Sorter::with_extractor(config, table()).run().unwrap_err();
        assert!(matches!(err, Error::Operation { label: "Copying", .. }));
    }

    #[test]
    fn test_nested_output_rejected_before_work() {
        let (_tmp, mut config) = setup(FileOperation::Move);
        config.output_dir = config.input_dir.join("sorted");
        let input = config.input_dir.clone();

        let err = Sorter::with_extractor(config, table()).run().unwrap_err();
        assert!(matches!(err, Error::NestedDirectory { .. }));
        assert!(input.join("1.jpg").exists());
        assert!(!input.join("sorted").exists());
    }
}
