//! Scene image transcoding under a byte ceiling.

mod codec;
mod transcoder;

pub use codec::{CodecError, ImageCodec, OutputFormat, RasterCodec};
pub use transcoder::{
    EncodedImage, ImageTranscoder, DEFAULT_MAX_DIMENSION, INITIAL_JPEG_QUALITY, MAX_IMAGE_BYTES,
    MIN_DIMENSION, MIN_JPEG_QUALITY,
};
