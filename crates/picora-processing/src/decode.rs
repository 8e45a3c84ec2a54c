//! Image decoding and bounds probing.

use image::{DynamicImage, GenericImageView, ImageError, ImageReader};
use picora_core::{ItemError, ItemResult};
use std::io::Cursor;

/// In-memory decode product: the pixel buffer plus the orientation code read
/// from the source bytes. Consumed by the corrector and compressor, never
/// persisted directly.
#[derive(Debug)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    pub width: u32,
    pub height: u32,
    /// EXIF orientation code 1-8; 1 when absent or unreadable.
    pub orientation: u8,
}

impl DecodedImage {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Decode source bytes into pixels, carrying the embedded orientation code
/// along. Unrecognized codecs classify as `UnsupportedFormat`, anything else
/// that fails to decode as `Decode`.
pub fn decode_image(data: &[u8]) -> ItemResult<DecodedImage> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ItemError::Decode(e.to_string()))?;

    // An item only reaches decode once it was classified as an image, so
    // bytes no codec recognizes are corrupt, not merely unsupported.
    if reader.format().is_none() {
        return Err(ItemError::Decode(
            "bytes are not a recognizable image container".to_string(),
        ));
    }

    let pixels = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(err) => ItemError::UnsupportedFormat(err.to_string()),
        other => ItemError::Decode(other.to_string()),
    })?;

    let (width, height) = pixels.dimensions();
    let orientation = read_exif_orientation(data);

    Ok(DecodedImage {
        pixels,
        width,
        height,
        orientation,
    })
}

/// Bounds-only probe: dimensions without materializing a pixel buffer.
/// Used by the pass-through path, where a probe failure degrades to unknown
/// dimensions instead of failing the item.
pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(e) => {
            tracing::debug!(error = %e, "bounds probe failed, reporting unknown dimensions");
            None
        }
    }
}

/// Read the EXIF orientation code from raw image bytes.
///
/// Returns 1 (upright) when the source carries no EXIF block, the block is
/// unreadable, or the tag is absent.
pub fn read_exif_orientation(data: &[u8]) -> u8 {
    let mut cursor = Cursor::new(data);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "no readable EXIF block, assuming upright");
            return 1;
        }
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(|code| code as u8)
        .unwrap_or(1)
}
