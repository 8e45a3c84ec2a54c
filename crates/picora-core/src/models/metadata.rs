use serde::{Deserialize, Serialize};

/// Structured record read from a source image's embedded EXIF block.
///
/// Every field is optional: a missing tag leaves its field `None`, an
/// unreadable block yields no record at all, and neither is ever an item
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Capture timestamp normalized to `yyyy-MM-ddTHH:mm:ss` regardless of
    /// the source representation.
    pub captured_at: Option<String>,
    /// Decimal degrees, negative south of the equator.
    pub latitude: Option<f64>,
    /// Decimal degrees, negative west of the prime meridian.
    pub longitude: Option<f64>,
    /// Meters, negative below sea level.
    pub altitude: Option<f64>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub software: Option<String>,
    /// Millimeters.
    pub focal_length: Option<f64>,
    /// F-number.
    pub aperture: Option<f64>,
    /// Textual exposure, e.g. `1/125`.
    pub shutter_speed: Option<String>,
    pub iso: Option<u32>,
    pub color_space: Option<String>,
    pub white_balance: Option<String>,
    /// Human-readable orientation including the raw code, e.g.
    /// `Rotate 90 CW [6]`.
    pub orientation: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CaptureMetadata {
    /// True when extraction found no usable field at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
