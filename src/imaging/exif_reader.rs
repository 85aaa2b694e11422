//! EXIF reading via `kamadak-exif`.
//!
//! Only four facts are taken from the EXIF block: camera make and model,
//! capture time and orientation. An image without EXIF, or with an EXIF
//! block the reader cannot make sense of, still yields a usable (empty)
//! [`ExifData`]; only a failure to read the file itself is an error.

use super::backend::{BackendError, ExifData};
use chrono::{DateTime, NaiveDateTime};
use exif::{In, Tag, Value};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Read make, model, capture time and orientation from an image file.
pub fn read_exif(path: &Path) -> Result<ExifData, BackendError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            tracing::debug!(path = %path.display(), "no EXIF data");
            return Ok(ExifData::default());
        }
        Err(exif::Error::Io(e)) if e.kind() != ErrorKind::UnexpectedEof => {
            return Err(BackendError::Io(e));
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable EXIF, ignoring it");
            return Ok(ExifData::default());
        }
    };

    Ok(ExifData {
        make: ascii_tag(&exif, Tag::Make),
        model: ascii_tag(&exif, Tag::Model),
        time: capture_time(&exif),
        orientation: exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0)),
    })
}

/// First string of an ASCII tag, trimmed. Empty strings count as absent.
fn ascii_tag(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => {
            let text = std::str::from_utf8(values.first()?).ok()?;
            let text = text.trim_end_matches('\0').trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => None,
    }
}

/// `DateTimeOriginal` with its offset, else `DateTime` with its offset.
fn capture_time(exif: &exif::Exif) -> Option<i64> {
    let (text, offset_tags) = ascii_tag(exif, Tag::DateTimeOriginal)
        .map(|t| (t, [Tag::OffsetTimeOriginal, Tag::OffsetTime]))
        .or_else(|| {
            ascii_tag(exif, Tag::DateTime).map(|t| (t, [Tag::OffsetTime, Tag::OffsetTimeOriginal]))
        })?;
    let offset = offset_tags.iter().find_map(|tag| ascii_tag(exif, *tag));
    parse_exif_datetime(&text, offset.as_deref())
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp into epoch milliseconds.
///
/// The time is read in `offset` (`+HH:MM`) when given and valid, else UTC.
pub fn parse_exif_datetime(text: &str, offset: Option<&str>) -> Option<i64> {
    let text = text.trim_end_matches('\0').trim();

    if let Some(offset) = offset {
        let stamped = format!("{text} {}", offset.trim_end_matches('\0').trim());
        let format = format!("{EXIF_DATETIME_FORMAT} %:z");
        if let Ok(dt) = DateTime::parse_from_str(&stamped, &format) {
            return Some(dt.timestamp_millis());
        }
    }

    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}
