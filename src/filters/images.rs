// src/filters/images.rs

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::cache::{ImageCache, compute_content_hash};
use crate::errors::{AssetflowError, Result};
use crate::stream::{FileRecord, Stage};

/// Lossless PNG recompression and JPEG re-encoding at a fixed quality.
///
/// The re-encoded bytes are used only when they are smaller than the
/// input. Other formats (GIF, WebP, SVG, ...) pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptimizer {
    jpeg_quality: u8,
}

impl ImageOptimizer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    /// Identity mixed into cache keys.
    pub fn id(&self) -> String {
        format!("images/png-best/jpeg-q{}", self.jpeg_quality)
    }

    pub fn optimize(&self, file: &str, extension: Option<&str>, input: &[u8]) -> Result<Vec<u8>> {
        let format = match extension.and_then(ImageFormat::from_extension) {
            Some(f @ (ImageFormat::Png | ImageFormat::Jpeg)) => f,
            _ => return Ok(input.to_vec()),
        };

        let img = image::load_from_memory_with_format(input, format)
            .map_err(|e| AssetflowError::transform(file, format!("decoding image: {e}")))?;

        let mut out = Vec::new();
        let encoded = match format {
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    Cursor::new(&mut out),
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)
            }
            _ => {
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), self.jpeg_quality);
                rgb.write_with_encoder(encoder)
            }
        };
        encoded.map_err(|e| AssetflowError::transform(file, format!("encoding image: {e}")))?;

        if out.len() < input.len() {
            debug!(file = %file, before = input.len(), after = out.len(), "optimized image");
            Ok(out)
        } else {
            Ok(input.to_vec())
        }
    }
}

/// Look each image up in the shared cache by content identity and only run
/// the optimizer on a miss.
#[derive(Debug, Clone)]
pub struct CachedOptimize {
    optimizer: ImageOptimizer,
    cache: Arc<ImageCache>,
}

impl CachedOptimize {
    pub fn new(optimizer: ImageOptimizer, cache: Arc<ImageCache>) -> Self {
        Self { optimizer, cache }
    }
}

impl Stage for CachedOptimize {
    fn name(&self) -> &'static str {
        "cached-optimize"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let key = compute_content_hash(&self.optimizer.id(), &record.contents);
        let file = record.display_path();
        let extension = record.extension().map(str::to_ascii_lowercase);

        let optimizer = self.optimizer;
        let input = &record.contents;
        let output = self.cache.get_or_insert_with(&key, || {
            optimizer.optimize(&file, extension.as_deref(), input)
        })?;

        record.contents = output;
        Ok(Some(record))
    }
}
