//! Mapping from capture date to destination subdirectory

use crate::time::CaptureDate;
use chrono::Datelike;
use std::path::PathBuf;

/// Bucket for images without a usable capture date
pub const UNKNOWN_DIR: &str = "unknown";

/// Relative directory a file with the given capture date is sorted into:
/// `<year>/<year>_<MM>_<DD>`, or `unknown`
pub fn destination_subdir(date: &CaptureDate) -> PathBuf {
    match date {
        CaptureDate::Known(date) => {
            let year = date.year();
            let mut dir = PathBuf::from(year.to_string());
            dir.push(format!("{}_{:02}_{:02}", year, date.month(), date.day()));
            dir
        }
        CaptureDate::Unknown => PathBuf::from(UNKNOWN_DIR),
    }
}
