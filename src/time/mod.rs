//! Capture date extraction
//!
//! The sorter only needs a calendar date per file. Where it comes from is
//! behind the [`DateExtractor`] trait; [`ExifDateExtractor`] reads it from
//! EXIF metadata.

pub mod exif;

use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

pub use self::exif::ExifDateExtractor;

/// Date a file was captured, or `Unknown` when no usable metadata exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureDate {
    Known(NaiveDate),
    Unknown,
}

impl CaptureDate {
    /// Build a known date from its parts, `Unknown` if the triple is not a
    /// valid calendar date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(CaptureDate::Known)
            .unwrap_or(CaptureDate::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, CaptureDate::Known(_))
    }
}

impl fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureDate::Known(date) => write!(
                f,
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            ),
            CaptureDate::Unknown => f.write_str("unknown"),
        }
    }
}

/// Source of capture dates for the sorter
pub trait DateExtractor {
    /// Extract the capture date of `path`.
    ///
    /// An error means the date is missing or malformed. The sorter never
    /// aborts on it and files the image under `unknown` instead.
    fn extract(&self, path: &Path) -> Result<NaiveDate>;
}

impl<T: DateExtractor + ?Sized> DateExtractor for &T {
    fn extract(&self, path: &Path) -> Result<NaiveDate> {
        (**self).extract(path)
    }
}

impl<T: DateExtractor + ?Sized> DateExtractor for Box<T> {
    fn extract(&self, path: &Path) -> Result<NaiveDate> {
        (**self).extract(path)
    }
}

/// Resolve the capture date of `path`, downgrading any extraction failure
/// to [`CaptureDate::Unknown`]
pub fn capture_date<E: DateExtractor + ?Sized>(extractor: &E, path: &Path) -> CaptureDate {
    match extractor.extract(path) {
        Ok(date) => {
            debug!(?path, %date, "Extracted capture date");
            CaptureDate::Known(date)
        }
        Err(e) => {
            warn!(?path, error = %e, "No usable capture date, filing as unknown");
            CaptureDate::Unknown
        }
    }
}
