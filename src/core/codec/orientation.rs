//! EXIF orientation handling.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the EXIF orientation tag (1-8). `None` when the file has no EXIF
/// block or no orientation field.
pub fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;

    match field.value {
        Value::Short(ref values) => values.first().copied(),
        _ => None,
    }
}

/// Rotate/flip `image` so that it is upright for the given EXIF orientation.
pub fn apply_orientation(image: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        // transpose
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        // transverse
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
