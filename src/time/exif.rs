//! EXIF capture date extraction for images

use super::DateExtractor;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Tag holding the moment the shutter fired
const CAPTURE_TAG: Tag = Tag::DateTimeOriginal;

/// Reads `DateTimeOriginal` from JPEG and TIFF containers
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifDateExtractor;

impl DateExtractor for ExifDateExtractor {
    fn extract(&self, path: &Path) -> Result<NaiveDate> {
        extract_exif_date(path)
    }
}

/// Extract the capture date from EXIF metadata
pub fn extract_exif_date(path: &Path) -> Result<NaiveDate> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let field = exif
        .get_field(CAPTURE_TAG, In::PRIMARY)
        .ok_or_else(|| Error::ExifRead {
            path: path.to_path_buf(),
            message: format!("{} tag not present", CAPTURE_TAG),
        })?;

    let date = match field.value {
        Value::Ascii(ref values) => values.first().and_then(|raw| parse_exif_date(raw)),
        _ => None,
    };

    match date {
        Some(date) => {
            trace!(?path, %date, "Found EXIF capture date");
            Ok(date)
        }
        None => Err(Error::ExifRead {
            path: path.to_path_buf(),
            message: format!("malformed {} value: {}", CAPTURE_TAG, field.display_value()),
        }),
    }
}

/// Parse an EXIF ASCII datetime ("YYYY:MM:DD HH:MM:SS") down to its date
fn parse_exif_date(raw: &[u8]) -> Option<NaiveDate> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))
}
