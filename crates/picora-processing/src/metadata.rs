//! EXIF capture-metadata extraction.
//!
//! Extraction reads the original source bytes, never the compressed output,
//! and it never fails an item: an unreadable block or a missing tag just
//! leaves the record (or a field) empty.

use std::io::Cursor;

use exif::{Exif, In, Rational, Tag, Value};
use picora_core::CaptureMetadata;

use crate::orientation::OrientationCorrector;

/// Builds a [`CaptureMetadata`] record from raw image bytes.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract the embedded capture record. Returns `None` when the bytes
    /// carry no readable EXIF block or when no recognized tag is present.
    pub fn extract(data: &[u8]) -> Option<CaptureMetadata> {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::debug!(error = %e, "no readable exif block");
                return None;
            }
        };

        let record = CaptureMetadata {
            captured_at: ascii_field(&exif, Tag::DateTimeOriginal)
                .or_else(|| ascii_field(&exif, Tag::DateTime))
                .map(|raw| normalize_exif_datetime(&raw)),
            latitude: signed_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 'S'),
            longitude: signed_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 'W'),
            altitude: altitude(&exif),
            camera_make: ascii_field(&exif, Tag::Make),
            camera_model: ascii_field(&exif, Tag::Model),
            software: ascii_field(&exif, Tag::Software),
            focal_length: rational_f64(&exif, Tag::FocalLength),
            aperture: rational_f64(&exif, Tag::FNumber)
                .or_else(|| rational_f64(&exif, Tag::ApertureValue)),
            shutter_speed: shutter_speed(&exif),
            iso: uint_field(&exif, Tag::PhotographicSensitivity),
            color_space: uint_field(&exif, Tag::ColorSpace).and_then(color_space_name),
            white_balance: uint_field(&exif, Tag::WhiteBalance).and_then(white_balance_name),
            orientation: uint_field(&exif, Tag::Orientation)
                .filter(|&code| code != 0)
                .map(OrientationCorrector::describe),
            width: uint_field(&exif, Tag::PixelXDimension)
                .or_else(|| uint_field(&exif, Tag::ImageWidth)),
            height: uint_field(&exif, Tag::PixelYDimension)
                .or_else(|| uint_field(&exif, Tag::ImageLength)),
        };

        if record.is_empty() {
            tracing::debug!("exif block carries no recognized capture tags");
            return None;
        }
        Some(record)
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(lines) if !lines.is_empty() => {
            let text = String::from_utf8_lossy(&lines[0]).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

fn uint_field(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

fn rational_field(exif: &Exif, tag: Tag) -> Option<Rational> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(parts) if !parts.is_empty() => Some(parts[0]),
        _ => None,
    }
}

fn rational_f64(exif: &Exif, tag: Tag) -> Option<f64> {
    rational_field(exif, tag)
        .map(|r| r.to_f64())
        .filter(|v| v.is_finite())
}

/// Degrees/minutes/seconds rationals to signed decimal degrees. The
/// reference direction tag decides the sign: `S` and `W` negate.
fn signed_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: char) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let magnitude = match &field.value {
        Value::Rational(parts) => dms_to_decimal(parts)?,
        _ => return None,
    };
    let negate = ascii_field(exif, ref_tag)
        .map(|r| r.to_uppercase().starts_with(negative_ref))
        .unwrap_or(false);
    Some(if negate { -magnitude } else { magnitude })
}

fn dms_to_decimal(parts: &[Rational]) -> Option<f64> {
    if parts.len() < 3 {
        return None;
    }
    let value = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    value.is_finite().then_some(value)
}

/// Altitude in meters; reference value 1 marks below sea level.
fn altitude(exif: &Exif) -> Option<f64> {
    let meters = rational_f64(exif, Tag::GPSAltitude)?;
    let below_sea_level = uint_field(exif, Tag::GPSAltitudeRef) == Some(1);
    Some(if below_sea_level { -meters } else { meters })
}

fn shutter_speed(exif: &Exif) -> Option<String> {
    if let Some(exposure) = rational_field(exif, Tag::ExposureTime) {
        return Some(format_exposure(exposure));
    }
    exif.get_field(Tag::ShutterSpeedValue, In::PRIMARY)
        .map(|field| field.display_value().to_string())
}

/// Render an exposure rational the way photographers read it: `1/125`, or a
/// whole-second count when the denominator is 1.
fn format_exposure(r: Rational) -> String {
    if r.denom == 1 {
        r.num.to_string()
    } else if r.num == 1 {
        format!("1/{}", r.denom)
    } else {
        format!("{}/{}", r.num, r.denom)
    }
}

/// `yyyy:MM:dd HH:mm:ss` to `yyyy-MM-ddTHH:mm:ss`. A value in any other
/// shape is kept verbatim rather than discarded.
fn normalize_exif_datetime(raw: &str) -> String {
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S") {
        Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Err(e) => {
            tracing::debug!(raw = raw, error = %e, "unparseable exif datetime kept verbatim");
            raw.to_string()
        }
    }
}

fn color_space_name(code: u32) -> Option<String> {
    match code {
        1 => Some("sRGB".to_string()),
        2 => Some("Adobe RGB".to_string()),
        65535 => Some("Uncalibrated".to_string()),
        _ => None,
    }
}

fn white_balance_name(code: u32) -> Option<String> {
    match code {
        0 => Some("Auto".to_string()),
        1 => Some("Manual".to_string()),
        _ => None,
    }
}
