//! EXIF orientation correction.
//!
//! Cameras store sensor-native pixels plus an orientation code; producing an
//! upright image means applying the inverse transform. Correction is never
//! fatal: an unknown code logs a diagnostic and leaves the pixels untouched.

use crate::decode::DecodedImage;
use image::DynamicImage;

/// Applies the transform a source's orientation code calls for.
pub struct OrientationCorrector;

impl OrientationCorrector {
    /// Return an upright image. Code 1 returns the input unchanged with no
    /// pixel allocation; a corrected image carries code 1 afterwards, so
    /// correcting twice is the same as correcting once.
    pub fn correct(image: DecodedImage) -> DecodedImage {
        if image.orientation == 1 {
            return image;
        }

        tracing::debug!(
            orientation = image.orientation,
            width = image.width,
            height = image.height,
            "applying orientation correction"
        );

        let pixels = Self::apply(image.pixels, image.orientation);
        let width = pixels.width();
        let height = pixels.height();

        DecodedImage {
            pixels,
            width,
            height,
            orientation: 1,
        }
    }

    /// The standard transform table. Codes 5-8 swap width and height.
    fn apply(pixels: DynamicImage, code: u8) -> DynamicImage {
        match code {
            2 => pixels.fliph(),
            3 => pixels.rotate180(),
            4 => pixels.flipv(),
            5 => pixels.rotate90().fliph(),
            6 => pixels.rotate90(),
            7 => pixels.rotate270().fliph(),
            8 => pixels.rotate270(),
            other => {
                tracing::warn!(
                    orientation = other,
                    "unknown orientation code, leaving pixels as-is"
                );
                pixels
            }
        }
    }

    /// Human-readable orientation name carrying the raw code, for metadata
    /// records.
    pub fn describe(code: u32) -> String {
        match code {
            0 => "Undefined [0]".to_string(),
            1 => "Normal [1]".to_string(),
            2 => "Flip Horizontal [2]".to_string(),
            3 => "Rotate 180 [3]".to_string(),
            4 => "Flip Vertical [4]".to_string(),
            5 => "Transpose [5]".to_string(),
            6 => "Rotate 90 CW [6]".to_string(),
            7 => "Transverse [7]".to_string(),
            8 => "Rotate 90 CCW [8]".to_string(),
            other => format!("Unknown [{}]", other),
        }
    }
}
