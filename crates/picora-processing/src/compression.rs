//! Resize and JPEG re-encode stage.
//!
//! An explicit level maps to a long-edge bound plus a fixed quality; with no
//! level the image keeps its dimensions and the quality adapts to pixel
//! count. Resizing only ever scales down and preserves aspect ratio.

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use picora_core::{adaptive_jpeg_quality, CompressionLevel, ItemError, ItemResult};

/// Compute-heavy encoder; callers run it on a blocking thread.
pub struct Compressor;

impl Compressor {
    /// Re-encode `img` per the compression policy, returning the JPEG bytes
    /// and the output dimensions. `CompressionLevel::None` never reaches
    /// this stage; the pipeline persists the source bytes instead.
    pub fn compress(
        img: &DynamicImage,
        level: Option<CompressionLevel>,
    ) -> ItemResult<(Bytes, u32, u32)> {
        let (width, height) = img.dimensions();

        let (bound, quality) = match level {
            Some(level) => match (level.max_dimension(), level.jpeg_quality()) {
                (bound, Some(quality)) => (bound, quality),
                _ => {
                    return Err(ItemError::Compression(
                        "pass-through level cannot be re-encoded".to_string(),
                    ))
                }
            },
            None => (None, adaptive_jpeg_quality(width as u64 * height as u64)),
        };

        let resized;
        let source = match bound {
            Some(max) if width > max || height > max => {
                let reduction = width.max(height) as f32 / max as f32;
                let filter = Self::select_filter(reduction);
                tracing::debug!(
                    from_width = width,
                    from_height = height,
                    bound = max,
                    filter = ?filter,
                    "downscaling before encode"
                );
                resized = img.resize(max, max, filter);
                &resized
            }
            _ => img,
        };

        let (out_width, out_height) = source.dimensions();
        let data = Self::encode_jpeg(source, quality)?;

        tracing::debug!(
            width = out_width,
            height = out_height,
            quality = quality,
            bytes = data.len(),
            "encoded jpeg"
        );

        Ok((data, out_width, out_height))
    }

    /// Heavier reductions tolerate cheaper kernels; near-1:1 scaling keeps
    /// the sharpest one.
    fn select_filter(reduction: f32) -> FilterType {
        if reduction > 2.0 {
            FilterType::Triangle
        } else if reduction > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Encode to baseline-progressive JPEG via mozjpeg. Alpha is dropped:
    /// the output container has no transparency.
    fn encode_jpeg(img: &DynamicImage, quality: u8) -> ItemResult<Bytes> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| ItemError::Compression(e.to_string()))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| ItemError::Compression(e.to_string()))?;
        let jpeg_data = comp
            .finish()
            .map_err(|e| ItemError::Compression(e.to_string()))?;

        Ok(Bytes::from(jpeg_data))
    }
}
