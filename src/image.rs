//! The CPU-side pixel buffer.
//!
//! An [`Image`] owns one contiguous byte buffer holding every mip level back
//! to back, largest first. The buffer length always equals the sum of
//! [`pixel_data_size`] over the levels; the fields are private so only
//! validated constructors and the crate's own operations can change it.
//!
//! ```rust
//! use pigment::{Color, Image, Rect, UncompressedFormat};
//!
//! let mut img = Image::new(4, 4, UncompressedFormat::R8G8B8A8);
//! img.draw_pixel(1, 2, Color::RED).unwrap();
//! assert_eq!(img.get_color(1, 2).unwrap(), Color::RED);
//!
//! let sub = img.from_image(Rect::new(1, 2, 2, 2)).unwrap();
//! assert_eq!(sub.get_color(0, 0).unwrap(), Color::RED);
//! ```

use log::{debug, warn};

use crate::bytes;
use crate::codec::{decode_normalized, decode_pixel, encode_pixel, unit_to_u8};
use crate::color::{Color, NormalizedColor};
use crate::error::ImageError;
use crate::format::{PixelFormat, UncompressedFormat, mip_chain_size, next_level, pixel_data_size};
use crate::geometry::{Rect, to_i32};

/// Owned pixel buffer with optional mip chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) mipmaps: usize,
    pub(crate) format: PixelFormat,
    pub(crate) data: Vec<u8>,
}

/// One level of an image's mip chain.
#[derive(Clone, Copy, Debug)]
pub struct MipLevel<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

impl Default for Image {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            mipmaps: 1,
            format: UncompressedFormat::R8G8B8A8.into(),
            data: Vec::new(),
        }
    }
}

// ===========================================================================
// Construction and lifecycle
// ===========================================================================

impl Image {
    /// Zero-filled single-level image.
    pub fn new(width: usize, height: usize, format: impl Into<PixelFormat>) -> Self {
        let format = format.into();
        Self {
            width,
            height,
            mipmaps: 1,
            format,
            data: vec![0; pixel_data_size(width, height, format)],
        }
    }

    /// Wrap an existing buffer. Fails unless `data` is exactly the size of a
    /// `mipmaps`-level chain.
    pub fn from_raw_parts(
        width: usize,
        height: usize,
        mipmaps: usize,
        format: impl Into<PixelFormat>,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let format = format.into();
        if width == 0 || height == 0 || mipmaps == 0 {
            return Err(ImageError::Empty);
        }
        let expected = mip_chain_size(width, height, mipmaps, format);
        if data.len() != expected {
            return Err(ImageError::DataSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, mipmaps, format, data })
    }

    /// RGBA8 image from a row-major colour slice.
    pub fn from_colors(width: usize, height: usize, colors: &[Color]) -> Result<Self, ImageError> {
        if colors.len() != width * height {
            return Err(ImageError::DataSize { expected: width * height * 4, actual: colors.len() * 4 });
        }
        Self::from_raw_parts(
            width,
            height,
            1,
            UncompressedFormat::R8G8B8A8,
            bytemuck::cast_slice::<Color, u8>(colors).to_vec(),
        )
    }

    /// Release the pixel data, leaving an empty image.
    pub fn unload(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn mipmaps(&self) -> usize {
        self.mipmaps
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Whole buffer, every mip level included.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable bytes. The length is fixed, so the layout invariant holds.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Non-empty, and the buffer matches the declared layout.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.mipmaps >= 1
            && !self.data.is_empty()
            && self.data.len() == mip_chain_size(self.width, self.height, self.mipmaps, self.format)
    }

    /// Bytes of the full-resolution level.
    pub fn base_level(&self) -> &[u8] {
        &self.data[..pixel_data_size(self.width, self.height, self.format).min(self.data.len())]
    }

    /// Mip levels, largest first.
    pub fn levels(&self) -> impl Iterator<Item = MipLevel<'_>> + '_ {
        let mut offset = 0;
        let (mut w, mut h) = (self.width, self.height);
        (0..self.mipmaps).map(move |_| {
            let size = pixel_data_size(w, h, self.format);
            let level = MipLevel { width: w, height: h, data: &self.data[offset..offset + size] };
            offset += size;
            (w, h) = next_level(w, h);
            level
        })
    }

    /// The uncompressed layout, or the error every per-pixel op reports.
    pub(crate) fn pixel_layout(&self, op: &str) -> Result<UncompressedFormat, ImageError> {
        if self.data.is_empty() || self.width == 0 || self.height == 0 {
            warn!("IMAGE: {op}: image is empty");
            return Err(ImageError::Empty);
        }
        match self.format {
            PixelFormat::Uncompressed(f) => Ok(f),
            PixelFormat::Compressed(_) => {
                warn!("IMAGE: {op}: compressed format {} not supported", self.format);
                Err(ImageError::Compressed(self.format))
            }
        }
    }

    /// Swap in a freshly built single-level buffer.
    pub(crate) fn replace(&mut self, width: usize, height: usize, format: UncompressedFormat, data: Vec<u8>) {
        debug_assert_eq!(data.len(), pixel_data_size(width, height, format.into()));
        self.width = width;
        self.height = height;
        self.format = format.into();
        self.mipmaps = 1;
        self.data = data;
    }

    /// Warn when an operation that rebuilds the base level drops the chain.
    pub(crate) fn note_mips_dropped(&self, op: &str) {
        if self.mipmaps > 1 {
            warn!("IMAGE: {op}: applied to base level only, {} mip levels discarded", self.mipmaps - 1);
        }
    }

    /// Copy a rectangle into a new single-level image of the same format.
    pub fn from_image(&self, rect: Rect) -> Result<Image, ImageError> {
        let format = self.pixel_layout("from_image")?;
        let in_bounds = !rect.is_empty()
            && rect.x >= 0
            && rect.y >= 0
            && rect.right() <= to_i32(self.width)
            && rect.bottom() <= to_i32(self.height);
        if !in_bounds {
            warn!("IMAGE: from_image: rectangle {rect:?} outside {}x{}", self.width, self.height);
            return Err(self.out_of_bounds(rect));
        }
        let bpp = format.bytes_per_pixel();
        let (x, y, w, h) = (rect.x as usize, rect.y as usize, rect.width as usize, rect.height as usize);
        let mut data = Vec::with_capacity(w * h * bpp);
        for row in self.base_level().chunks_exact(self.width * bpp).skip(y).take(h) {
            data.extend_from_slice(&row[x * bpp..(x + w) * bpp]);
        }
        Ok(Image { width: w, height: h, mipmaps: 1, format: format.into(), data })
    }

    pub(crate) fn out_of_bounds(&self, rect: Rect) -> ImageError {
        ImageError::OutOfBounds {
            x: rect.x.into(),
            y: rect.y.into(),
            width: rect.width.into(),
            height: rect.height.into(),
            image_width: self.width,
            image_height: self.height,
        }
    }
}

// ===========================================================================
// Pixel access
// ===========================================================================

impl Image {
    pub fn get_color(&self, x: i32, y: i32) -> Result<Color, ImageError> {
        let format = self.pixel_layout("get_color")?;
        if x < 0 || y < 0 || x >= to_i32(self.width) || y >= to_i32(self.height) {
            warn!("IMAGE: get_color: ({x}, {y}) out of bounds");
            return Err(self.out_of_bounds(Rect::new(x, y, 1, 1)));
        }
        let bpp = format.bytes_per_pixel();
        let offset = (y as usize * self.width + x as usize) * bpp;
        Ok(decode_pixel(&self.data[offset..offset + bpp], format))
    }

    /// Base level decoded to RGBA8, row-major.
    pub fn colors(&self) -> Result<Vec<Color>, ImageError> {
        let format = self.pixel_layout("colors")?;
        Ok(decode_colors(self.base_level(), format))
    }

    /// Base level decoded to `[0, 1]` floats. Lossless for float formats.
    pub fn normalized(&self) -> Result<Vec<NormalizedColor>, ImageError> {
        let format = self.pixel_layout("normalized")?;
        Ok(self
            .base_level()
            .chunks_exact(format.bytes_per_pixel())
            .map(|px| decode_normalized(px, format))
            .collect())
    }

    /// Up to `max_size` distinct colours, in first-seen raster order.
    /// Fully transparent pixels are skipped.
    pub fn palette(&self, max_size: usize) -> Result<Vec<Color>, ImageError> {
        let colors = self.colors()?;
        let mut palette: Vec<Color> = Vec::with_capacity(max_size.min(256));
        for c in colors.into_iter().filter(|c| c.a > 0) {
            if palette.contains(&c) {
                continue;
            }
            if palette.len() == max_size {
                warn!("IMAGE: palette: more than {max_size} colours, truncated");
                break;
            }
            palette.push(c);
        }
        Ok(palette)
    }

    /// Bounding box of pixels whose alpha exceeds `threshold` (in `[0, 1]`).
    /// An image with no such pixel yields an all-zero rectangle.
    pub fn alpha_border(&self, threshold: f32) -> Result<Rect, ImageError> {
        let colors = self.colors()?;
        let limit = (threshold.clamp(0.0, 1.0) * 255.0) as u8;
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for (i, c) in colors.iter().enumerate() {
            if c.a > limit {
                let (x, y) = (i % self.width, i / self.width);
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        Ok(bounds.map_or(Rect::default(), |(x0, y0, x1, y1)| {
            Rect::new(to_i32(x0), to_i32(y0), to_i32(x1 + 1 - x0), to_i32(y1 + 1 - y0))
        }))
    }

    /// One channel (0 = R .. 3 = A) as a new single-channel image.
    /// Float formats extract to `R32`, the rest to `Grayscale`.
    pub fn from_channel(&self, channel: usize) -> Result<Image, ImageError> {
        let format = self.pixel_layout("from_channel")?;
        if channel > 3 {
            warn!("IMAGE: from_channel: channel {channel} out of range");
            return Err(ImageError::InvalidArgument("channel must be 0..=3"));
        }
        let pick = |n: NormalizedColor| [n.r, n.g, n.b, n.a][channel];
        let pixels = self.normalized()?;
        let (out_format, data) = if format.is_high_precision() {
            let values: Vec<f32> = pixels.into_iter().map(pick).collect();
            (UncompressedFormat::R32, bytemuck::cast_slice::<f32, u8>(&values).to_vec())
        } else {
            (UncompressedFormat::Grayscale, pixels.into_iter().map(|n| unit_to_u8(pick(n))).collect())
        };
        Ok(Image { width: self.width, height: self.height, mipmaps: 1, format: out_format.into(), data })
    }
}

// ===========================================================================
// Row conversion helpers shared by the manipulation modules
// ===========================================================================

/// Decode packed pixels to colours, using the SIMD row kernels when the
/// layout allows.
pub(crate) fn decode_colors(src: &[u8], format: UncompressedFormat) -> Vec<Color> {
    let n = src.len() / format.bytes_per_pixel();
    let mut out = vec![Color::BLANK; n];
    if n == 0 {
        return out;
    }
    let dst: &mut [u8] = bytemuck::cast_slice_mut(&mut out);
    let fast = match format {
        UncompressedFormat::R8G8B8A8 => {
            dst.copy_from_slice(src);
            Ok(())
        }
        UncompressedFormat::R8G8B8 => bytes::rgb_to_rgba(src, dst),
        UncompressedFormat::Grayscale => bytes::gray_to_rgba(src, dst),
        UncompressedFormat::GrayAlpha => bytes::gray_alpha_to_rgba(src, dst),
        _ => {
            for (px, c) in src.chunks_exact(format.bytes_per_pixel()).zip(out.iter_mut()) {
                *c = decode_pixel(px, format);
            }
            return out;
        }
    };
    if let Err(e) = fast {
        debug!("IMAGE: row kernel rejected buffer ({e}), decoding per pixel");
        for (px, c) in src.chunks_exact(format.bytes_per_pixel()).zip(out.iter_mut()) {
            *c = decode_pixel(px, format);
        }
    }
    out
}

/// Encode colours into a packed buffer of `format`.
pub(crate) fn encode_colors(colors: &[Color], format: UncompressedFormat) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    let src: &[u8] = bytemuck::cast_slice(colors);
    match format {
        UncompressedFormat::R8G8B8A8 => return src.to_vec(),
        UncompressedFormat::R8G8B8 if !colors.is_empty() => {
            let mut out = vec![0u8; colors.len() * 3];
            if bytes::rgba_to_rgb(src, &mut out).is_ok() {
                return out;
            }
        }
        _ => {}
    }
    let mut out = vec![0u8; colors.len() * bpp];
    for (c, px) in colors.iter().zip(out.chunks_exact_mut(bpp)) {
        encode_pixel(px, *c, format);
    }
    out
}
