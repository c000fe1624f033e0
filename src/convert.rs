//! Pixel format conversion and Floyd–Steinberg dithering.
//!
//! ```rust
//! use pigment::{Color, DitherTarget, Image, UncompressedFormat};
//!
//! let mut img = Image::from_colors(2, 1, &[Color::WHITE, Color::BLACK]).unwrap();
//! img.convert(UncompressedFormat::R5G6B5).unwrap();
//! assert_eq!(img.data().len(), 4);
//!
//! let mut img = Image::from_colors(2, 1, &[Color::WHITE, Color::BLACK]).unwrap();
//! img.dither(DitherTarget::R4G4B4A4).unwrap();
//! assert_eq!(img.format(), UncompressedFormat::R4G4B4A4.into());
//! ```

use log::{debug, warn};

use crate::codec::{decode_normalized, encode_normalized};
use crate::color::Color;
use crate::error::ImageError;
use crate::format::{PixelFormat, UncompressedFormat};
use crate::image::{Image, decode_colors, encode_colors};

/// 16-bit layouts [`Image::dither`] can quantize into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DitherTarget {
    R5G6B5,
    R5G5B5A1,
    R4G4B4A4,
}

impl DitherTarget {
    /// Bits for R, G, B, A.
    pub const fn bits(self) -> [u32; 4] {
        match self {
            Self::R5G6B5 => [5, 6, 5, 0],
            Self::R5G5B5A1 => [5, 5, 5, 1],
            Self::R4G4B4A4 => [4, 4, 4, 4],
        }
    }

    pub const fn format(self) -> UncompressedFormat {
        match self {
            Self::R5G6B5 => UncompressedFormat::R5G6B5,
            Self::R5G5B5A1 => UncompressedFormat::R5G5B5A1,
            Self::R4G4B4A4 => UncompressedFormat::R4G4B4A4,
        }
    }
}

/// Re-encode packed pixels from `source` into `target`.
///
/// 8-bit-or-less layouts convert through [`Color`], so packed fields keep
/// their truncating decode. Anything involving a float layout converts
/// through normalized floats and loses nothing float-to-float.
pub(crate) fn convert_pixels(src: &[u8], source: UncompressedFormat, target: UncompressedFormat) -> Vec<u8> {
    if source == target {
        return src.to_vec();
    }
    if !source.is_high_precision() && !target.is_high_precision() {
        return encode_colors(&decode_colors(src, source), target);
    }
    let (sbpp, tbpp) = (source.bytes_per_pixel(), target.bytes_per_pixel());
    let mut out = vec![0u8; src.len() / sbpp * tbpp];
    for (s, d) in src.chunks_exact(sbpp).zip(out.chunks_exact_mut(tbpp)) {
        encode_normalized(d, decode_normalized(s, source), target);
    }
    out
}

impl Image {
    /// Convert to `format` in place. A mip chain present before conversion
    /// is regenerated in the new format.
    pub fn convert(&mut self, format: impl Into<PixelFormat>) -> Result<(), ImageError> {
        let format = format.into();
        if format == self.format {
            return Ok(());
        }
        let source = self.pixel_layout("convert")?;
        let PixelFormat::Uncompressed(target) = format else {
            warn!("IMAGE: convert: cannot compress on the CPU (target {format})");
            return Err(ImageError::Compressed(format));
        };
        if source.is_high_precision() && !target.is_high_precision() {
            warn!("IMAGE: convert: {source:?} to {target:?} loses precision");
        }

        let data = convert_pixels(self.base_level(), source, target);
        let mut converted = Image {
            width: self.width,
            height: self.height,
            mipmaps: 1,
            format,
            data,
        };
        if self.mipmaps > 1 {
            debug!("IMAGE: convert: regenerating {} mip levels", self.mipmaps);
            converted.gen_mipmaps()?;
        }
        *self = converted;
        Ok(())
    }

    /// Floyd–Steinberg dither into a 16-bit layout.
    ///
    /// Each pixel is quantized by truncation, and the error spreads 7/16
    /// right, 3/16 down-left, 5/16 down and 1/16 down-right in raster order.
    /// Alpha is truncated without error diffusion.
    pub fn dither(&mut self, target: DitherTarget) -> Result<(), ImageError> {
        let source = self.pixel_layout("dither")?;
        if !matches!(source, UncompressedFormat::R8G8B8 | UncompressedFormat::R8G8B8A8) {
            warn!("IMAGE: dither: {source:?} source is decoded to 8 bits per channel first");
        }
        self.note_mips_dropped("dither");

        let [rb, gb, bb, ab] = target.bits();
        let (w, h) = (self.width, self.height);
        let mut pixels = decode_colors(self.base_level(), source);
        let mut out = Vec::with_capacity(w * h * 2);

        let spread = |c: &mut Color, err: [i32; 3], k: f32| {
            let add = |v: u8, e: i32| (i32::from(v) + (e as f32 * k / 16.0) as i32).min(0xFF) as u8;
            c.r = add(c.r, err[0]);
            c.g = add(c.g, err[1]);
            c.b = add(c.b, err[2]);
        };

        for y in 0..h {
            for x in 0..w {
                let old = pixels[y * w + x];
                let q = |v: u8, bits: u32| u32::from(v) >> (8 - bits);
                let (r, g, b, a) = (q(old.r, rb), q(old.g, gb), q(old.b, bb), q(old.a, ab));
                let err = [
                    i32::from(old.r) - (r << (8 - rb)) as i32,
                    i32::from(old.g) - (g << (8 - gb)) as i32,
                    i32::from(old.b) - (b << (8 - bb)) as i32,
                ];

                if x + 1 < w {
                    spread(&mut pixels[y * w + x + 1], err, 7.0);
                }
                if y + 1 < h {
                    if x > 0 {
                        spread(&mut pixels[(y + 1) * w + x - 1], err, 3.0);
                    }
                    spread(&mut pixels[(y + 1) * w + x], err, 5.0);
                    if x + 1 < w {
                        spread(&mut pixels[(y + 1) * w + x + 1], err, 1.0);
                    }
                }

                let packed = (r << (gb + bb + ab)) | (g << (bb + ab)) | (b << ab) | a;
                out.extend_from_slice(&(packed as u16).to_ne_bytes());
            }
        }

        self.replace(w, h, target.format(), out);
        Ok(())
    }
}
