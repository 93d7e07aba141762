//! # Codec Module
//!
//! Reading and writing image files for both pipeline stages.
//!
//! - `decode` - zune-jpeg fast path for JPEG, `image` crate for everything else
//! - `orientation` - EXIF orientation so pixels match how the photo displays
//! - `encode` - write a buffer back out in the container its file name asks for

mod decode;
mod encode;
mod orientation;

pub use decode::{decode, decode_oriented};
pub use encode::{encode_jpeg, write_image, CENSOR_JPEG_QUALITY};
pub use orientation::{apply_orientation, read_orientation};
