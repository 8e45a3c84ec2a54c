//! Byte-level fixtures: real encoded images, a minimal PDF, and an EXIF
//! segment builder for sources with embedded capture metadata.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Encode a gradient-filled JPEG of the given dimensions.
pub fn jpeg_image(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Jpeg)
}

/// Encode a gradient-filled PNG of the given dimensions.
pub fn png_image(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

/// Bytes that no image codec recognizes. Callers give the source a `.jpg`
/// name so it routes down the image path and fails at decode.
pub fn corrupted_image() -> Vec<u8> {
    b"\x00\x01definitely not pixels\x02\x03".repeat(8)
}

/// Minimal one-page PDF.
pub fn pdf_document() -> Vec<u8> {
    b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>
endobj
trailer
<< /Size 4 /Root 1 0 R >>
%%EOF"
        .to_vec()
}

/// JPEG carrying only an orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, code: u16) -> Vec<u8> {
    ExifBuilder::new()
        .orientation(code)
        .wrap_jpeg(&jpeg_image(width, height))
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8])
    }))
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

// TIFF value types used below.
const TYPE_BYTE: u16 = 1;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_ORIENTATION: u16 = 0x0112;
const TAG_SOFTWARE: u16 = 0x0131;
const TAG_DATE_TIME: u16 = 0x0132;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_GPS_IFD: u16 = 0x8825;

const TAG_EXPOSURE_TIME: u16 = 0x829A;
const TAG_F_NUMBER: u16 = 0x829D;
const TAG_ISO: u16 = 0x8827;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_APERTURE_VALUE: u16 = 0x9202;
const TAG_FOCAL_LENGTH: u16 = 0x920A;
const TAG_COLOR_SPACE: u16 = 0xA001;
const TAG_PIXEL_X: u16 = 0xA002;
const TAG_PIXEL_Y: u16 = 0xA003;
const TAG_WHITE_BALANCE: u16 = 0xA403;

const TAG_GPS_LAT_REF: u16 = 0x0001;
const TAG_GPS_LAT: u16 = 0x0002;
const TAG_GPS_LON_REF: u16 = 0x0003;
const TAG_GPS_LON: u16 = 0x0004;
const TAG_GPS_ALT_REF: u16 = 0x0005;
const TAG_GPS_ALT: u16 = 0x0006;

enum Payload {
    Inline([u8; 4]),
    Area(Vec<u8>),
}

struct RawEntry {
    tag: u16,
    kind: u16,
    count: u32,
    payload: Payload,
}

/// Builds a little-endian TIFF block with IFD0 plus optional Exif and GPS
/// sub-IFDs, and splices it into a JPEG as an APP1 segment.
pub struct ExifBuilder {
    ifd0: Vec<RawEntry>,
    exif: Vec<RawEntry>,
    gps: Vec<RawEntry>,
}

impl ExifBuilder {
    pub fn new() -> Self {
        Self {
            ifd0: Vec::new(),
            exif: Vec::new(),
            gps: Vec::new(),
        }
    }

    pub fn orientation(mut self, code: u16) -> Self {
        self.ifd0.push(short_entry(TAG_ORIENTATION, code));
        self
    }

    pub fn make(mut self, text: &str) -> Self {
        self.ifd0.push(ascii_entry(TAG_MAKE, text));
        self
    }

    pub fn model(mut self, text: &str) -> Self {
        self.ifd0.push(ascii_entry(TAG_MODEL, text));
        self
    }

    pub fn software(mut self, text: &str) -> Self {
        self.ifd0.push(ascii_entry(TAG_SOFTWARE, text));
        self
    }

    pub fn date_time(mut self, text: &str) -> Self {
        self.ifd0.push(ascii_entry(TAG_DATE_TIME, text));
        self
    }

    pub fn date_time_original(mut self, text: &str) -> Self {
        self.exif.push(ascii_entry(TAG_DATE_TIME_ORIGINAL, text));
        self
    }

    pub fn exposure_time(mut self, num: u32, denom: u32) -> Self {
        self.exif.push(rational_entry(TAG_EXPOSURE_TIME, num, denom));
        self
    }

    pub fn f_number(mut self, num: u32, denom: u32) -> Self {
        self.exif.push(rational_entry(TAG_F_NUMBER, num, denom));
        self
    }

    pub fn aperture_value(mut self, num: u32, denom: u32) -> Self {
        self.exif.push(rational_entry(TAG_APERTURE_VALUE, num, denom));
        self
    }

    pub fn iso(mut self, value: u16) -> Self {
        self.exif.push(short_entry(TAG_ISO, value));
        self
    }

    pub fn focal_length(mut self, num: u32, denom: u32) -> Self {
        self.exif.push(rational_entry(TAG_FOCAL_LENGTH, num, denom));
        self
    }

    pub fn color_space(mut self, value: u16) -> Self {
        self.exif.push(short_entry(TAG_COLOR_SPACE, value));
        self
    }

    pub fn white_balance(mut self, value: u16) -> Self {
        self.exif.push(short_entry(TAG_WHITE_BALANCE, value));
        self
    }

    pub fn pixel_dimensions(mut self, width: u32, height: u32) -> Self {
        self.exif.push(long_entry(TAG_PIXEL_X, width));
        self.exif.push(long_entry(TAG_PIXEL_Y, height));
        self
    }

    /// Latitude and longitude as degree/minute/second rationals with their
    /// reference directions (`N`/`S`, `E`/`W`).
    pub fn gps(
        mut self,
        lat: [(u32, u32); 3],
        lat_ref: &str,
        lon: [(u32, u32); 3],
        lon_ref: &str,
    ) -> Self {
        self.gps.push(ascii_entry(TAG_GPS_LAT_REF, lat_ref));
        self.gps.push(rationals_entry(TAG_GPS_LAT, &lat));
        self.gps.push(ascii_entry(TAG_GPS_LON_REF, lon_ref));
        self.gps.push(rationals_entry(TAG_GPS_LON, &lon));
        self
    }

    pub fn altitude(mut self, num: u32, denom: u32, below_sea_level: bool) -> Self {
        self.gps
            .push(byte_entry(TAG_GPS_ALT_REF, below_sea_level as u8));
        self.gps.push(rational_entry(TAG_GPS_ALT, num, denom));
        self
    }

    /// Serialize to a TIFF block: header, IFD0, sub-IFDs, then the data
    /// area for values wider than four bytes.
    pub fn build_tiff(self) -> Vec<u8> {
        let mut ifd0 = self.ifd0;
        let has_exif = !self.exif.is_empty();
        let has_gps = !self.gps.is_empty();
        if has_exif {
            ifd0.push(long_entry(TAG_EXIF_IFD, 0));
        }
        if has_gps {
            ifd0.push(long_entry(TAG_GPS_IFD, 0));
        }
        ifd0.sort_by_key(|e| e.tag);
        let mut exif = self.exif;
        exif.sort_by_key(|e| e.tag);
        let mut gps = self.gps;
        gps.sort_by_key(|e| e.tag);

        let ifd_size = |n: usize| 2 + 12 * n + 4;
        let exif_offset = 8 + ifd_size(ifd0.len());
        let gps_offset = exif_offset + if has_exif { ifd_size(exif.len()) } else { 0 };
        let mut data_offset = gps_offset + if has_gps { ifd_size(gps.len()) } else { 0 };

        for entry in &mut ifd0 {
            if entry.tag == TAG_EXIF_IFD {
                entry.payload = Payload::Inline((exif_offset as u32).to_le_bytes());
            } else if entry.tag == TAG_GPS_IFD {
                entry.payload = Payload::Inline((gps_offset as u32).to_le_bytes());
            }
        }

        let mut data_area = Vec::new();
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend(serialize_ifd(&ifd0, &mut data_offset, &mut data_area));
        if has_exif {
            tiff.extend(serialize_ifd(&exif, &mut data_offset, &mut data_area));
        }
        if has_gps {
            tiff.extend(serialize_ifd(&gps, &mut data_offset, &mut data_area));
        }
        tiff.extend(data_area);
        tiff
    }

    /// Splice the built block into `jpeg` as an APP1 segment right after
    /// the start-of-image marker.
    pub fn wrap_jpeg(self, jpeg: &[u8]) -> Vec<u8> {
        assert!(jpeg.starts_with(&[0xFF, 0xD8]), "not a JPEG");
        let tiff = self.build_tiff();

        let mut payload = Vec::with_capacity(6 + tiff.len());
        payload.extend_from_slice(b"Exif\0\0");
        payload.extend_from_slice(&tiff);
        assert!(payload.len() + 2 <= u16::MAX as usize, "EXIF too large");

        let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
        out.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE1]);
        out.extend_from_slice(&((payload.len() as u16 + 2).to_be_bytes()));
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }
}

fn serialize_ifd(entries: &[RawEntry], data_offset: &mut usize, data_area: &mut Vec<u8>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        match &entry.payload {
            Payload::Inline(bytes) => out.extend_from_slice(bytes),
            Payload::Area(bytes) => {
                out.extend_from_slice(&(*data_offset as u32).to_le_bytes());
                data_area.extend_from_slice(bytes);
                *data_offset += bytes.len();
                // Keep the data area word-aligned for the next value.
                if bytes.len() % 2 == 1 {
                    data_area.push(0);
                    *data_offset += 1;
                }
            }
        }
    }
    // No next IFD.
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

fn short_entry(tag: u16, value: u16) -> RawEntry {
    let mut bytes = [0u8; 4];
    bytes[..2].copy_from_slice(&value.to_le_bytes());
    RawEntry {
        tag,
        kind: TYPE_SHORT,
        count: 1,
        payload: Payload::Inline(bytes),
    }
}

fn long_entry(tag: u16, value: u32) -> RawEntry {
    RawEntry {
        tag,
        kind: TYPE_LONG,
        count: 1,
        payload: Payload::Inline(value.to_le_bytes()),
    }
}

fn byte_entry(tag: u16, value: u8) -> RawEntry {
    RawEntry {
        tag,
        kind: TYPE_BYTE,
        count: 1,
        payload: Payload::Inline([value, 0, 0, 0]),
    }
}

fn ascii_entry(tag: u16, text: &str) -> RawEntry {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    let count = bytes.len() as u32;
    let payload = if bytes.len() <= 4 {
        let mut inline = [0u8; 4];
        inline[..bytes.len()].copy_from_slice(&bytes);
        Payload::Inline(inline)
    } else {
        Payload::Area(bytes)
    };
    RawEntry {
        tag,
        kind: TYPE_ASCII,
        count,
        payload,
    }
}

fn rational_entry(tag: u16, num: u32, denom: u32) -> RawEntry {
    let mut bytes = Vec::with_capacity(8);
    bytes.extend_from_slice(&num.to_le_bytes());
    bytes.extend_from_slice(&denom.to_le_bytes());
    RawEntry {
        tag,
        kind: TYPE_RATIONAL,
        count: 1,
        payload: Payload::Area(bytes),
    }
}

fn rationals_entry(tag: u16, parts: &[(u32, u32)]) -> RawEntry {
    let mut bytes = Vec::with_capacity(8 * parts.len());
    for (num, denom) in parts {
        bytes.extend_from_slice(&num.to_le_bytes());
        bytes.extend_from_slice(&denom.to_le_bytes());
    }
    RawEntry {
        tag,
        kind: TYPE_RATIONAL,
        count: parts.len() as u32,
        payload: Payload::Area(bytes),
    }
}
