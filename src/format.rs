//! Pixel format tags and byte-size arithmetic.
//!
//! [`PixelFormat`] splits into uncompressed layouts, which the per-pixel codec
//! understands, and block-compressed layouts, which are opaque byte blobs
//! passed through to a GPU. Per-pixel functions take [`UncompressedFormat`],
//! so decoding a compressed block by accident does not type-check.
//!
//! ```rust
//! use pigment::{PixelFormat, UncompressedFormat, CompressedFormat, pixel_data_size};
//!
//! assert_eq!(pixel_data_size(4, 4, UncompressedFormat::R8G8B8A8.into()), 64);
//! // compressed images smaller than one block still occupy a whole block
//! assert_eq!(pixel_data_size(2, 2, CompressedFormat::Dxt1Rgb.into()), 8);
//! assert_eq!(pixel_data_size(2, 2, CompressedFormat::Dxt5Rgba.into()), 16);
//! ```

use core::fmt;

/// Layouts the codec can decode and encode one pixel at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UncompressedFormat {
    /// 8-bit luminance.
    Grayscale,
    /// 8-bit luminance + 8-bit alpha.
    GrayAlpha,
    /// 16-bit packed, no alpha.
    R5G6B5,
    /// 16-bit packed, 1-bit alpha.
    R5G5B5A1,
    /// 16-bit packed, 4 bits per channel.
    R4G4B4A4,
    R8G8B8,
    R8G8B8A8,
    /// 32-bit float luminance.
    R32,
    R32G32B32,
    R32G32B32A32,
    /// 16-bit half-float luminance.
    R16,
    R16G16B16,
    R16G16B16A16,
}

/// GPU block-compressed layouts. Never decoded on the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompressedFormat {
    Dxt1Rgb,
    Dxt1Rgba,
    Dxt3Rgba,
    Dxt5Rgba,
    Etc1Rgb,
    Etc2Rgb,
    Etc2EacRgba,
    PvrtRgb,
    PvrtRgba,
    Astc4x4Rgba,
    Astc8x8Rgba,
}

/// Any layout an [`Image`](crate::Image) buffer may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Uncompressed(UncompressedFormat),
    Compressed(CompressedFormat),
}

impl UncompressedFormat {
    pub const ALL: [UncompressedFormat; 13] = [
        Self::Grayscale,
        Self::GrayAlpha,
        Self::R5G6B5,
        Self::R5G5B5A1,
        Self::R4G4B4A4,
        Self::R8G8B8,
        Self::R8G8B8A8,
        Self::R32,
        Self::R32G32B32,
        Self::R32G32B32A32,
        Self::R16,
        Self::R16G16B16,
        Self::R16G16B16A16,
    ];

    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Grayscale => 8,
            Self::GrayAlpha | Self::R5G6B5 | Self::R5G5B5A1 | Self::R4G4B4A4 | Self::R16 => 16,
            Self::R8G8B8 => 24,
            Self::R8G8B8A8 | Self::R32 => 32,
            Self::R16G16B16 => 48,
            Self::R16G16B16A16 => 64,
            Self::R32G32B32 => 96,
            Self::R32G32B32A32 => 128,
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.bits_per_pixel() / 8
    }

    /// Whether the layout stores an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::GrayAlpha
                | Self::R5G5B5A1
                | Self::R4G4B4A4
                | Self::R8G8B8A8
                | Self::R32G32B32A32
                | Self::R16G16B16A16
        )
    }

    /// Number of stored channels (packed formats count their fields).
    pub const fn channels(self) -> usize {
        match self {
            Self::Grayscale | Self::R32 | Self::R16 => 1,
            Self::GrayAlpha => 2,
            Self::R5G6B5 | Self::R8G8B8 | Self::R32G32B32 | Self::R16G16B16 => 3,
            Self::R5G5B5A1
            | Self::R4G4B4A4
            | Self::R8G8B8A8
            | Self::R32G32B32A32
            | Self::R16G16B16A16 => 4,
        }
    }

    /// Formats that store more than 8 bits per channel.
    pub const fn is_high_precision(self) -> bool {
        matches!(
            self,
            Self::R32
                | Self::R32G32B32
                | Self::R32G32B32A32
                | Self::R16
                | Self::R16G16B16
                | Self::R16G16B16A16
        )
    }
}

impl CompressedFormat {
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Dxt1Rgb
            | Self::Dxt1Rgba
            | Self::Etc1Rgb
            | Self::Etc2Rgb
            | Self::PvrtRgb
            | Self::PvrtRgba => 4,
            Self::Dxt3Rgba | Self::Dxt5Rgba | Self::Etc2EacRgba | Self::Astc4x4Rgba => 8,
            Self::Astc8x8Rgba => 2,
        }
    }

    /// Smallest allocation for an image below one 4x4 block in both axes.
    const fn min_block_bytes(self) -> Option<usize> {
        match self {
            Self::Dxt1Rgb | Self::Dxt1Rgba | Self::Etc1Rgb | Self::Etc2Rgb | Self::PvrtRgb
            | Self::PvrtRgba => Some(8),
            Self::Dxt3Rgba | Self::Dxt5Rgba | Self::Etc2EacRgba | Self::Astc4x4Rgba => Some(16),
            Self::Astc8x8Rgba => None,
        }
    }
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Uncompressed(f) => f.bits_per_pixel(),
            Self::Compressed(f) => f.bits_per_pixel(),
        }
    }

    pub const fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed(_))
    }

    /// The uncompressed layout, or `None` for block-compressed formats.
    pub const fn uncompressed(self) -> Option<UncompressedFormat> {
        match self {
            Self::Uncompressed(f) => Some(f),
            Self::Compressed(_) => None,
        }
    }
}

impl From<UncompressedFormat> for PixelFormat {
    fn from(f: UncompressedFormat) -> Self {
        Self::Uncompressed(f)
    }
}

impl From<CompressedFormat> for PixelFormat {
    fn from(f: CompressedFormat) -> Self {
        Self::Compressed(f)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncompressed(u) => write!(f, "{u:?}"),
            Self::Compressed(c) => write!(f, "{c:?}"),
        }
    }
}

/// Bytes needed for one `width` x `height` level in `format`.
pub fn pixel_data_size(width: usize, height: usize, format: PixelFormat) -> usize {
    let size = width * height * format.bits_per_pixel() / 8;
    match format {
        PixelFormat::Compressed(c) if width < 4 && height < 4 => {
            c.min_block_bytes().unwrap_or(size)
        }
        _ => size,
    }
}

/// Dimensions of the next mip level: halved, never below 1.
#[inline]
pub(crate) fn next_level(width: usize, height: usize) -> (usize, usize) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Total bytes of a mip chain starting at `width` x `height`.
pub fn mip_chain_size(width: usize, height: usize, mipmaps: usize, format: PixelFormat) -> usize {
    let (mut w, mut h) = (width, height);
    let mut total = 0;
    for _ in 0..mipmaps {
        total += pixel_data_size(w, h, format);
        (w, h) = next_level(w, h);
    }
    total
}
