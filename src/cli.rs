//! CLI argument parsing with clap

use crate::config::Config;
use crate::operation::FileOperation;
use clap::Parser;
use std::path::PathBuf;

/// Organize image files by date taken.
///
/// Reads the EXIF capture date of every image below INPUTDIR and places it
/// in OUTPUTDIR/<year>/<year>_<month>_<day>/, or OUTPUTDIR/unknown/ when no
/// date is available. Files already present with identical content are
/// skipped; name clashes with different content get a -1, -2, ... suffix.
#[derive(Parser, Debug)]
#[command(name = "imagesort")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// File operation
    #[arg(value_enum)]
    pub operation: FileOperation,

    /// Input directory
    pub inputdir: PathBuf,

    /// Output directory
    pub outputdir: PathBuf,

    /// Log actions without writing anything to disk
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; command line arguments
    /// override them.
    #[arg(short = 'C', long, env = "IMAGESORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Recognized image extensions (replaces the default jpg, jpeg, tiff)
    #[arg(short = 'x', long = "extension", num_args = 1..)]
    pub extensions: Option<Vec<String>>,

    /// Directories to skip while scanning (absolute paths or folder names)
    #[arg(short, long, num_args = 1..)]
    pub exclude: Option<Vec<PathBuf>>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        config.input_dir = self.inputdir.clone();
        config.output_dir = self.outputdir.clone();
        config.operation = self.operation;

        if let Some(ref extensions) = self.extensions {
            config.image_extensions = extensions.clone();
        }
        if let Some(ref exclude) = self.exclude {
            config.exclude_dirs = exclude.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
