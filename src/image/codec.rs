//! Image codec capability used by the transcoder.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

/// Codec failure (unsupported data, encoder error).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        CodecError(err.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError(err.to_string())
    }
}

/// Encoding family the transcoder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy, takes a quality parameter.
    Jpeg,
    /// Lossless, maximum compression.
    Png,
}

impl OutputFormat {
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// The three operations the transcoder needs from an image library.
pub trait ImageCodec: Send + Sync {
    type Image;

    /// Decode source bytes and pick the output format for them.
    fn decode(&self, bytes: &[u8]) -> Result<(Self::Image, OutputFormat), CodecError>;

    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    /// Shrink to fit inside `max_width` x `max_height`, keeping the aspect
    /// ratio. Never enlarges.
    fn resize(&self, image: &Self::Image, max_width: u32, max_height: u32) -> Self::Image;

    /// Encode; `quality` is only meaningful for lossy formats.
    fn encode(
        &self,
        image: &Self::Image,
        format: OutputFormat,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, CodecError>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, OutputFormat), CodecError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = match reader.format() {
            Some(ImageFormat::Jpeg) => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        };
        Ok((reader.decode()?, format))
    }

    fn dimensions(&self, image: &DynamicImage) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn resize(&self, image: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
        if image.width() <= max_width && image.height() <= max_height {
            return image.clone();
        }
        image.resize(max_width.max(1), max_height.max(1), FilterType::Lanczos3)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let rgb = image.to_rgb8();
                let quality = quality.unwrap_or(super::INITIAL_JPEG_QUALITY);
                JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&rgb)?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut bytes,
                    CompressionType::Best,
                    PngFilter::Adaptive,
                );
                image.write_with_encoder(encoder)?;
            }
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let codec = RasterCodec;
        let resized = codec.resize(&gradient(400, 200), 100, 100);
        assert_eq!(codec.dimensions(&resized), (100, 50));
    }

    #[test]
    fn test_resize_never_enlarges() {
        let codec = RasterCodec;
        let resized = codec.resize(&gradient(40, 20), 100, 100);
        assert_eq!(codec.dimensions(&resized), (40, 20));
    }

    #[test]
    fn test_format_detection() {
        let codec = RasterCodec;
        let png = codec.encode(&gradient(16, 16), OutputFormat::Png, None).unwrap();
        let jpg = codec
            .encode(&gradient(16, 16), OutputFormat::Jpeg, Some(80))
            .unwrap();
        assert_eq!(codec.decode(&png).unwrap().1, OutputFormat::Png);
        assert_eq!(codec.decode(&jpg).unwrap().1, OutputFormat::Jpeg);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let codec = RasterCodec;
        let image = gradient(256, 256);
        let high = codec.encode(&image, OutputFormat::Jpeg, Some(95)).unwrap();
        let low = codec.encode(&image, OutputFormat::Jpeg, Some(40)).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_garbage_does_not_decode() {
        assert!(RasterCodec.decode(b"definitely not an image").is_err());
    }
}
