use std::path::Path;

use super::codec::{ImageCodec, OutputFormat, RasterCodec};
use crate::error::NovelError;

/// Hard ceiling on encoded image size (1 MiB).
pub const MAX_IMAGE_BYTES: usize = 1_048_576;
/// Working dimension at or below which the search stops shrinking.
pub const MIN_DIMENSION: u32 = 50;
pub const INITIAL_JPEG_QUALITY: u8 = 85;
pub const MIN_JPEG_QUALITY: u8 = 40;
/// Default bounding box for scene images.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

const SHRINK_FACTOR: f64 = 0.8;
const QUALITY_FACTOR: f64 = 0.9;

/// Result of a successful transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Final quality for lossy output, `None` for PNG.
    pub quality: Option<u8>,
    /// Number of encode passes it took.
    pub attempts: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

fn shrink(dimension: u32) -> u32 {
    ((f64::from(dimension) * SHRINK_FACTOR).floor() as u32).max(MIN_DIMENSION)
}

fn lower_quality(quality: u8) -> u8 {
    ((f64::from(quality) * QUALITY_FACTOR).floor() as u8).max(MIN_JPEG_QUALITY)
}

/// Shrinks images until their encoding fits under a byte ceiling.
///
/// The search is deterministic: the same source bytes, bounding box and
/// ceiling always produce the same output. Each pass resizes the decoded
/// source into the current working box, so quality loss never compounds
/// across passes.
#[derive(Debug, Clone)]
pub struct ImageTranscoder<C = RasterCodec> {
    codec: C,
    max_bytes: usize,
}

impl ImageTranscoder<RasterCodec> {
    pub fn new() -> Self {
        Self::with_codec(RasterCodec)
    }
}

impl Default for ImageTranscoder<RasterCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> ImageTranscoder<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Read, decode and transcode the image at `path`.
    pub fn transcode(
        &self,
        path: &Path,
        max_width: u32,
        max_height: u32,
    ) -> Result<EncodedImage, NovelError> {
        let bytes = std::fs::read(path).map_err(|e| NovelError::unreadable_image(path, e))?;
        let (image, format) = self
            .codec
            .decode(&bytes)
            .map_err(|e| NovelError::unreadable_image(path, e))?;
        self.search(&image, format, max_width, max_height)
    }

    /// Same as [`transcode`](Self::transcode) for in-memory source bytes.
    pub fn transcode_bytes(
        &self,
        bytes: &[u8],
        max_width: u32,
        max_height: u32,
    ) -> Result<EncodedImage, NovelError> {
        let (image, format) = self.codec.decode(bytes).map_err(|e| NovelError::AssetNotFound {
            story_id: None,
            scene_id: None,
            path: None,
            reason: e.to_string(),
        })?;
        self.search(&image, format, max_width, max_height)
    }

    fn search(
        &self,
        image: &C::Image,
        format: OutputFormat,
        max_width: u32,
        max_height: u32,
    ) -> Result<EncodedImage, NovelError> {
        let (original_width, original_height) = self.codec.dimensions(image);
        let mut width = original_width.min(max_width.max(1));
        let mut height = original_height.min(max_height.max(1));
        let mut quality = format.is_lossy().then_some(INITIAL_JPEG_QUALITY);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let resized = self.codec.resize(image, width, height);
            let bytes = self
                .codec
                .encode(&resized, format, quality)
                .map_err(|e| NovelError::Internal(format!("image encoding failed: {e}")))?;

            tracing::trace!(
                attempt = attempts,
                width,
                height,
                ?quality,
                size = bytes.len(),
                "Encoded candidate"
            );

            if bytes.len() <= self.max_bytes {
                let (width, height) = self.codec.dimensions(&resized);
                tracing::debug!(
                    original_width,
                    original_height,
                    width,
                    height,
                    size = bytes.len(),
                    attempts,
                    "Image transcoded"
                );
                return Ok(EncodedImage {
                    bytes,
                    format,
                    width,
                    height,
                    quality,
                    attempts,
                });
            }

            if width <= MIN_DIMENSION || height <= MIN_DIMENSION {
                return Err(NovelError::SizeExceeded {
                    original_width,
                    original_height,
                    final_width: width,
                    final_height: height,
                    final_bytes: bytes.len(),
                    final_quality: quality,
                    limit: self.max_bytes,
                });
            }

            width = shrink(width);
            height = shrink(height);
            quality = quality.map(lower_quality);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::codec::CodecError;
    use proptest::prelude::*;

    /// Codec over bare dimensions: the "encoding" is `bytes_per_pixel` bytes
    /// per pixel, scaled by quality for JPEG.
    struct SizeOnlyCodec {
        bytes_per_pixel: f64,
        format: OutputFormat,
    }

    impl ImageCodec for SizeOnlyCodec {
        type Image = (u32, u32);

        fn decode(&self, bytes: &[u8]) -> Result<((u32, u32), OutputFormat), CodecError> {
            let text = std::str::from_utf8(bytes).map_err(|e| CodecError(e.to_string()))?;
            let (w, h) = text
                .split_once('x')
                .ok_or_else(|| CodecError("bad header".into()))?;
            let w = w.parse().map_err(|_| CodecError("bad width".into()))?;
            let h = h.parse().map_err(|_| CodecError("bad height".into()))?;
            Ok(((w, h), self.format))
        }

        fn dimensions(&self, image: &(u32, u32)) -> (u32, u32) {
            *image
        }

        fn resize(&self, image: &(u32, u32), max_width: u32, max_height: u32) -> (u32, u32) {
            let (w, h) = *image;
            if w <= max_width && h <= max_height {
                return (w, h);
            }
            let scale = (f64::from(max_width) / f64::from(w)).min(f64::from(max_height) / f64::from(h));
            (
                ((f64::from(w) * scale).round() as u32).max(1),
                ((f64::from(h) * scale).round() as u32).max(1),
            )
        }

        fn encode(
            &self,
            image: &(u32, u32),
            _format: OutputFormat,
            quality: Option<u8>,
        ) -> Result<Vec<u8>, CodecError> {
            let scale = quality.map_or(1.0, |q| f64::from(q) / 100.0);
            let pixels = f64::from(image.0) * f64::from(image.1);
            Ok(vec![0; (pixels * self.bytes_per_pixel * scale) as usize])
        }
    }

    fn fake(bytes_per_pixel: f64, format: OutputFormat) -> ImageTranscoder<SizeOnlyCodec> {
        ImageTranscoder::with_codec(SizeOnlyCodec {
            bytes_per_pixel,
            format,
        })
    }

    #[test]
    fn test_quality_schedule() {
        let mut q = INITIAL_JPEG_QUALITY;
        let mut seen = vec![q];
        while q > MIN_JPEG_QUALITY {
            q = lower_quality(q);
            seen.push(q);
        }
        assert_eq!(seen, vec![85, 76, 68, 61, 54, 48, 43, 40]);
    }

    #[test]
    fn test_shrink_stops_at_floor() {
        assert_eq!(shrink(1024), 819);
        assert_eq!(shrink(54), MIN_DIMENSION);
        assert_eq!(shrink(MIN_DIMENSION), MIN_DIMENSION);
    }

    #[test]
    fn test_fits_first_try() {
        let encoded = fake(1.0, OutputFormat::Png)
            .transcode_bytes(b"200x100", 1024, 1024)
            .unwrap();
        assert_eq!((encoded.width, encoded.height), (200, 100));
        assert_eq!(encoded.attempts, 1);
        assert_eq!(encoded.quality, None);
        assert_eq!(encoded.mime_type(), "image/png");
    }

    #[test]
    fn test_bounding_box_applies_before_size() {
        let encoded = fake(0.01, OutputFormat::Jpeg)
            .transcode_bytes(b"4000x3000", 1024, 1024)
            .unwrap();
        assert_eq!((encoded.width, encoded.height), (1024, 768));
        assert_eq!(encoded.quality, Some(INITIAL_JPEG_QUALITY));
    }

    #[test]
    fn test_large_jpeg_converges_under_ceiling() {
        // 4 bytes/pixel at q85 puts 1024x768 at ~2.6 MB.
        let encoded = fake(4.0, OutputFormat::Jpeg)
            .transcode_bytes(b"4000x3000", 1024, 1024)
            .unwrap();
        assert!(encoded.bytes.len() <= MAX_IMAGE_BYTES);
        assert!(encoded.width < 1024);
        assert!(encoded.attempts > 1);
        assert!(encoded.quality.unwrap() < INITIAL_JPEG_QUALITY);
        assert!(encoded.quality.unwrap() >= MIN_JPEG_QUALITY);
    }

    #[test]
    fn test_size_exceeded_reports_final_attempt() {
        let err = fake(1.0, OutputFormat::Jpeg)
            .with_max_bytes(10)
            .transcode_bytes(b"4000x3000", 1024, 1024)
            .unwrap_err();
        match err {
            NovelError::SizeExceeded {
                original_width,
                original_height,
                final_width,
                final_height,
                final_bytes,
                final_quality,
                limit,
            } => {
                assert_eq!((original_width, original_height), (4000, 3000));
                assert!(final_width >= MIN_DIMENSION && final_height >= MIN_DIMENSION);
                assert!(final_width <= MIN_DIMENSION || final_height <= MIN_DIMENSION);
                assert!(final_bytes > limit);
                assert_eq!(final_quality, Some(MIN_JPEG_QUALITY));
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_source_is_asset_not_found() {
        let err = fake(1.0, OutputFormat::Png)
            .transcode_bytes(b"garbage", 100, 100)
            .unwrap_err();
        assert!(matches!(err, NovelError::AssetNotFound { .. }));
    }

    #[test]
    fn test_missing_file_is_asset_not_found() {
        let err = ImageTranscoder::new()
            .transcode(Path::new("/definitely/not/here.png"), 100, 100)
            .unwrap_err();
        match err {
            NovelError::AssetNotFound { path, .. } => {
                assert_eq!(path.as_deref(), Some(Path::new("/definitely/not/here.png")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_search_terminates_within_bound(
            w in 1u32..6000,
            h in 1u32..6000,
            max_w in 1u32..3000,
            max_h in 1u32..3000,
            bpp in 0.0f64..8.0,
            lossy in any::<bool>(),
        ) {
            let format = if lossy { OutputFormat::Jpeg } else { OutputFormat::Png };
            let header = format!("{w}x{h}");
            // From at most 6000px, 0.8 shrinking reaches 50px in under 23 passes.
            match fake(bpp, format).with_max_bytes(4096).transcode_bytes(header.as_bytes(), max_w, max_h) {
                Ok(encoded) => {
                    prop_assert!(encoded.bytes.len() <= 4096);
                    prop_assert!(encoded.width <= w.min(max_w));
                    prop_assert!(encoded.height <= h.min(max_h));
                    prop_assert!(encoded.attempts <= 23);
                }
                Err(NovelError::SizeExceeded { final_width, final_height, final_quality, .. }) => {
                    prop_assert!(final_width <= MIN_DIMENSION || final_height <= MIN_DIMENSION);
                    if let Some(q) = final_quality {
                        prop_assert!(q >= MIN_JPEG_QUALITY);
                    }
                }
                Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
            }
        }
    }
}
