//! Ordering of images within a folder and of subfolder summaries.
//!
//! Time-based orders always put images without an EXIF time after all timed
//! images, whatever the direction, and compare two untimed images by filename
//! ascending. Sorting is stable: images with equal times keep their listing
//! order.

use crate::generate::SubDirSummary;
use crate::types::ImageRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Image order inside a folder, selected by name on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ImageOrder {
    #[default]
    #[value(name = "exifTimeAsc")]
    ExifTimeAsc,
    #[value(name = "exifTimeDesc")]
    ExifTimeDesc,
    #[value(name = "filenameAsc")]
    FilenameAsc,
    #[value(name = "filenameDesc")]
    FilenameDesc,
}

impl ImageOrder {
    pub const ALL: [ImageOrder; 4] = [
        ImageOrder::ExifTimeAsc,
        ImageOrder::ExifTimeDesc,
        ImageOrder::FilenameAsc,
        ImageOrder::FilenameDesc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ImageOrder::ExifTimeAsc => "exifTimeAsc",
            ImageOrder::ExifTimeDesc => "exifTimeDesc",
            ImageOrder::FilenameAsc => "filenameAsc",
            ImageOrder::FilenameDesc => "filenameDesc",
        }
    }
}

impl fmt::Display for ImageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown image order '{0}' (expected one of exifTimeAsc, exifTimeDesc, filenameAsc, filenameDesc)")]
pub struct UnknownOrder(pub String);

impl FromStr for ImageOrder {
    type Err = UnknownOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageOrder::ALL
            .into_iter()
            .find(|order| order.name() == s)
            .ok_or_else(|| UnknownOrder(s.to_string()))
    }
}

/// Sort images in place according to `order`.
pub fn sort_images(order: ImageOrder, images: &mut [ImageRecord]) {
    match order {
        ImageOrder::ExifTimeAsc => images.sort_by(|a, b| {
            cmp_time_then_name(a.exif.time, b.exif.time, &a.filename, &b.filename, false)
        }),
        ImageOrder::ExifTimeDesc => images.sort_by(|a, b| {
            cmp_time_then_name(a.exif.time, b.exif.time, &a.filename, &b.filename, true)
        }),
        ImageOrder::FilenameAsc => images.sort_by(|a, b| a.filename.cmp(&b.filename)),
        ImageOrder::FilenameDesc => images.sort_by(|a, b| b.filename.cmp(&a.filename)),
    }
}

/// Sort subfolder summaries newest first; equal or missing times fall back
/// to the title, and undated folders go last.
pub fn sort_sub_dirs(sub_dirs: &mut [SubDirSummary]) {
    sub_dirs.sort_by(|a, b| {
        cmp_time_then_name(a.time, b.time, &a.title, &b.title, true)
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Compare two optional timestamps; items without a time sort last in
/// either direction and are ordered by name ascending among themselves.
fn cmp_time_then_name(
    time_a: Option<i64>,
    time_b: Option<i64>,
    name_a: &str,
    name_b: &str,
    descending: bool,
) -> Ordering {
    match (time_a, time_b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => name_a.cmp(name_b),
    }
}
