use core::fmt;

use crate::format::PixelFormat;

/// Buffer length does not fit the pixel layout a row kernel expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeError {
    /// Empty, or not a whole number of pixels.
    NotPixelAligned,
    /// Destination holds fewer pixels than the source.
    PixelCountMismatch,
}

impl fmt::Display for SizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPixelAligned => f.write_str("buffer length is not a whole number of pixels"),
            Self::PixelCountMismatch => f.write_str("destination buffer holds fewer pixels than the source"),
        }
    }
}

impl std::error::Error for SizeError {}

/// Why an image operation refused to run. The image is untouched whenever
/// one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image has no pixel data")]
    Empty,

    #[error("operation needs per-pixel access, {0} is block-compressed")]
    Compressed(PixelFormat),

    #[error("rectangle {x},{y} {width}x{height} is outside a {image_width}x{image_height} image")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: usize,
        image_height: usize,
    },

    #[error("dimensions differ: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("pixel buffer holds {actual} bytes, layout needs {expected}")]
    DataSize { expected: usize, actual: usize },

    #[error("kernel of {0} weights is not a non-empty square")]
    InvalidKernel(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("resampling failed: {0}")]
    Resize(String),

    #[error(transparent)]
    Size(#[from] SizeError),

    #[error("backend failure: {0}")]
    Backend(String),
}
