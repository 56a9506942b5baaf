//! imagesort - organize image files by the date they were taken
//!
//! Images are placed into `<output>/<year>/<year>_<MM>_<DD>/`, or
//! `<output>/unknown/` when no capture date can be read, using one of:
//! - copy
//! - move
//! - hardlink
//!
//! Sorting never overwrites: byte-identical files already at the destination
//! are skipped, and name clashes with different content get a numeric
//! suffix. Running twice over the same input adds nothing the second time.

pub mod classify;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod operation;
pub mod process;
pub mod resolve;
pub mod safety;
pub mod scan;
pub mod time;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use operation::{FileOperation, OperationSet};
pub use process::{FileResult, ProcessingStats, ProcessingStatus, Sorter};
pub use resolve::{DestinationResolver, ResolvedDestination};
pub use time::{CaptureDate, DateExtractor, ExifDateExtractor};
