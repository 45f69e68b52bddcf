//! Grayscale conversion for delivered photos.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::IngestError;

/// JPEG quality used for converted images.
pub const GRAYSCALE_JPEG_QUALITY: u8 = 95;

/// Decode `bytes`, straighten it according to its EXIF orientation, drop
/// colour and re-encode as JPEG.
///
/// # Errors
///
/// Returns [`IngestError::Encode`] if the input cannot be decoded or the
/// output cannot be encoded.
pub fn grayscale(bytes: &[u8]) -> Result<Vec<u8>, IngestError> {
    let orientation = exif_orientation(bytes);
    let image =
        image::load_from_memory(bytes).map_err(|e| IngestError::Encode(format!("decode: {e}")))?;
    let gray = apply_orientation(image, orientation).to_luma8();

    let mut out = Vec::new();
    gray.write_with_encoder(JpegEncoder::new_with_quality(
        &mut out,
        GRAYSCALE_JPEG_QUALITY,
    ))
    .map_err(|e| IngestError::Encode(e.to_string()))?;
    Ok(out)
}

/// EXIF orientation tag value, if the image carries one.
fn exif_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Rotate so the image displays upright. Mirrored orientations are left alone.
fn apply_orientation(image: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(3) => image.rotate180(),
        Some(6) => image.rotate90(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}
