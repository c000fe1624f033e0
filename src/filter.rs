//! Whole-image filters: box-approximated Gaussian blur, kernel convolution,
//! alpha-channel operations and colour adjustments.
//!
//! Filters decode the base level to [`Color`], work there, and re-encode into
//! the image's own layout. Blur and convolution keep float and half-float
//! layouts in `f32` instead. The mip chain is discarded.

use log::{debug, warn};

use crate::bytes;
use crate::codec::{decode_normalized, decode_pixel, encode_normalized, encode_pixel, unit_to_u8};
use crate::color::{Color, NormalizedColor};
use crate::error::ImageError;
use crate::format::UncompressedFormat;
use crate::image::{Image, decode_colors, encode_colors};

/// Box-filter passes [`Image::blur_gaussian_default`] runs.
pub const GAUSSIAN_BLUR_ITERATIONS: usize = 4;

impl Image {
    /// Decode, map every pixel, re-encode.
    fn map_colors(&mut self, op: &str, f: impl FnMut(Color) -> Color) -> Result<(), ImageError> {
        let format = self.pixel_layout(op)?;
        self.note_mips_dropped(op);
        let colors: Vec<Color> = decode_colors(self.base_level(), format).into_iter().map(f).collect();
        self.replace(self.width, self.height, format, encode_colors(&colors, format));
        Ok(())
    }

    /// Decode to RGBA8, run a row kernel over the bytes, re-encode.
    fn map_rgba_bytes(
        &mut self,
        op: &str,
        kernel: fn(&mut [u8]) -> Result<(), crate::SizeError>,
    ) -> Result<(), ImageError> {
        let format = self.pixel_layout(op)?;
        self.note_mips_dropped(op);
        let mut colors = decode_colors(self.base_level(), format);
        kernel(bytemuck::cast_slice_mut(&mut colors))?;
        self.replace(self.width, self.height, format, encode_colors(&colors, format));
        Ok(())
    }
}

// ===========================================================================
// Blur and convolution
// ===========================================================================

/// One running-sum box pass over `len` samples spaced `step` apart starting
/// at `start`. The window at `i` covers `[i - radius + 1, i + radius]`,
/// clamped to the line, and averages over the samples actually covered.
fn box_pass(src: &[[f32; 4]], dst: &mut [[f32; 4]], start: usize, step: usize, len: usize, radius: usize) {
    let mut sum = [0f32; 4];
    let mut count = 0usize;
    for i in 0..radius.min(len) {
        let px = src[start + i * step];
        for c in 0..4 {
            sum[c] += px[c];
        }
        count += 1;
    }
    for i in 0..len {
        if i >= radius {
            let px = src[start + (i - radius) * step];
            for c in 0..4 {
                sum[c] -= px[c];
            }
            count -= 1;
        }
        if i + radius < len {
            let px = src[start + (i + radius) * step];
            for c in 0..4 {
                sum[c] += px[c];
            }
            count += 1;
        }
        let out = &mut dst[start + i * step];
        for c in 0..4 {
            out[c] = sum[c] / count as f32;
        }
    }
}

/// Base level as four `[0, 1]` floats per pixel. Float layouts decode
/// straight to floats; the rest go through [`Color`].
fn decode_unit(src: &[u8], format: UncompressedFormat) -> Vec<[f32; 4]> {
    if format.is_high_precision() {
        src.chunks_exact(format.bytes_per_pixel())
            .map(|px| {
                let n = decode_normalized(px, format);
                [n.r, n.g, n.b, n.a]
            })
            .collect()
    } else {
        decode_colors(src, format)
            .into_iter()
            .map(|c| {
                let n = c.normalize();
                [n.r, n.g, n.b, n.a]
            })
            .collect()
    }
}

fn encode_unit(px: &[[f32; 4]], format: UncompressedFormat) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    let mut out = vec![0u8; px.len() * bpp];
    for (dst, &[r, g, b, a]) in out.chunks_exact_mut(bpp).zip(px) {
        encode_normalized(dst, NormalizedColor::new(r, g, b, a), format);
    }
    out
}

impl Image {
    /// Approximate Gaussian blur: `iterations` rounds of separable box
    /// filtering on premultiplied colour.
    ///
    /// Layouts of 8 bits per channel or less blur in 8-bit steps; float and
    /// half-float layouts blur in `f32` throughout.
    pub fn blur_gaussian(&mut self, blur_size: usize, iterations: usize) -> Result<(), ImageError> {
        let format = self.pixel_layout("blur_gaussian")?;
        if blur_size == 0 || iterations == 0 {
            debug!("IMAGE: blur_gaussian: nothing to do (size {blur_size}, {iterations} iterations)");
            return Ok(());
        }
        self.note_mips_dropped("blur_gaussian");

        let (w, h) = (self.width, self.height);
        let high = format.is_high_precision();
        let (mut colors, mut a): (Vec<Color>, Vec<[f32; 4]>) = if high {
            let unit = decode_unit(self.base_level(), format)
                .into_iter()
                .map(|[r, g, b, alpha]| [r * alpha, g * alpha, b * alpha, alpha])
                .collect();
            (Vec::new(), unit)
        } else {
            let mut colors = decode_colors(self.base_level(), format);
            bytes::premultiply_rgba_inplace(bytemuck::cast_slice_mut(&mut colors))?;
            let unit = colors
                .iter()
                .map(|c| [f32::from(c.r), f32::from(c.g), f32::from(c.b), f32::from(c.a)])
                .collect();
            (colors, unit)
        };
        let mut b = a.clone();

        for _ in 0..iterations {
            for row in 0..h {
                box_pass(&a, &mut b, row * w, 1, w, blur_size);
            }
            for col in 0..w {
                box_pass(&b, &mut a, col, w, h, blur_size);
            }
        }

        let data = if high {
            for px in &mut a {
                let alpha = px[3];
                *px = if alpha <= 0.0 { [0.0; 4] } else { [px[0] / alpha, px[1] / alpha, px[2] / alpha, alpha] };
            }
            encode_unit(&a, format)
        } else {
            for (c, px) in colors.iter_mut().zip(&a) {
                let alpha = px[3];
                *c = if alpha <= 0.0 {
                    Color::BLANK
                } else {
                    let k = alpha / 255.0;
                    let un = |v: f32| (v / k).min(255.0) as u8;
                    Color::new(un(px[0]), un(px[1]), un(px[2]), alpha.min(255.0) as u8)
                };
            }
            encode_colors(&colors, format)
        };
        self.replace(w, h, format, data);
        Ok(())
    }

    /// [`Image::blur_gaussian`] with [`GAUSSIAN_BLUR_ITERATIONS`] rounds.
    pub fn blur_gaussian_default(&mut self, blur_size: usize) -> Result<(), ImageError> {
        self.blur_gaussian(blur_size, GAUSSIAN_BLUR_ITERATIONS)
    }

    /// Convolve all four channels with a square `kernel` given row-major.
    ///
    /// Taps that fall outside the image contribute nothing. Results are
    /// clamped to `[0, 1]`; 8-bit layouts truncate them back to bytes, float
    /// layouts keep them as computed.
    pub fn kernel_convolution(&mut self, kernel: &[f32]) -> Result<(), ImageError> {
        let format = self.pixel_layout("kernel_convolution")?;
        let k = kernel.len().isqrt();
        if k == 0 || k * k != kernel.len() {
            warn!("IMAGE: kernel_convolution: kernel of {} taps is not square", kernel.len());
            return Err(ImageError::InvalidKernel(kernel.len()));
        }
        self.note_mips_dropped("kernel_convolution");

        let (w, h) = (self.width as isize, self.height as isize);
        let src = decode_unit(self.base_level(), format);
        let lo = -((k / 2) as isize);
        let mut out = Vec::with_capacity(src.len());

        for y in 0..h {
            for x in 0..w {
                let mut acc = [0f32; 4];
                for (ky, weights) in kernel.chunks_exact(k).enumerate() {
                    let sy = y + lo + ky as isize;
                    if sy < 0 || sy >= h {
                        continue;
                    }
                    for (kx, &weight) in weights.iter().enumerate() {
                        let sx = x + lo + kx as isize;
                        if sx < 0 || sx >= w {
                            continue;
                        }
                        let p = src[(sy * w + sx) as usize];
                        for c in 0..4 {
                            acc[c] += p[c] * weight;
                        }
                    }
                }
                out.push(acc.map(|v| v.clamp(0.0, 1.0)));
            }
        }

        let data = if format.is_high_precision() {
            encode_unit(&out, format)
        } else {
            let q = |v: f32| (v * 255.0) as u8;
            let colors: Vec<Color> = out.iter().map(|&[r, g, b, a]| Color::new(q(r), q(g), q(b), q(a))).collect();
            encode_colors(&colors, format)
        };
        self.replace(self.width, self.height, format, data);
        Ok(())
    }
}

// ===========================================================================
// Alpha
// ===========================================================================

impl Image {
    /// Crop to the bounding box of pixels with alpha above `threshold`.
    /// Does nothing when no pixel qualifies.
    pub fn alpha_crop(&mut self, threshold: f32) -> Result<(), ImageError> {
        let border = self.alpha_border(threshold)?;
        if border.is_empty() {
            debug!("IMAGE: alpha_crop: no pixel above threshold {threshold}");
            return Ok(());
        }
        self.crop(border)
    }

    /// Replace every pixel whose alpha is at or below `threshold` (in
    /// `[0, 1]`) with `color`. Layouts without alpha are left alone.
    pub fn alpha_clear(&mut self, color: Color, threshold: f32) -> Result<(), ImageError> {
        let format = self.pixel_layout("alpha_clear")?;
        if !format.has_alpha() {
            debug!("IMAGE: alpha_clear: {format:?} has no alpha channel");
            return Ok(());
        }
        self.note_mips_dropped("alpha_clear");

        let bpp = format.bytes_per_pixel();
        let limit = (threshold.clamp(0.0, 1.0) * 255.0) as u8;
        let mut fill = vec![0u8; bpp];
        encode_pixel(&mut fill, color, format);

        let mut data = self.base_level().to_vec();
        for px in data.chunks_exact_mut(bpp) {
            let clear = if format.is_high_precision() {
                decode_normalized(px, format).a <= threshold
            } else {
                decode_pixel(px, format).a <= limit
            };
            if clear {
                px.copy_from_slice(&fill);
            }
        }
        self.replace(self.width, self.height, format, data);
        Ok(())
    }

    /// Use `mask`'s luminance as this image's alpha.
    ///
    /// Grayscale images become gray+alpha; every other layout becomes RGBA8.
    pub fn alpha_mask(&mut self, mask: &Image) -> Result<(), ImageError> {
        let format = self.pixel_layout("alpha_mask")?;
        let mask_format = mask.pixel_layout("alpha_mask")?;
        if (mask.width, mask.height) != (self.width, self.height) {
            warn!(
                "IMAGE: alpha_mask: mask is {}x{}, image is {}x{}",
                mask.width, mask.height, self.width, self.height
            );
            return Err(ImageError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (mask.width, mask.height),
            });
        }
        self.note_mips_dropped("alpha_mask");

        let alpha: Vec<u8> = decode_colors(mask.base_level(), mask_format)
            .into_iter()
            .map(|c| unit_to_u8(c.luminance()))
            .collect();

        if format == UncompressedFormat::Grayscale {
            let data = self.base_level().iter().zip(&alpha).flat_map(|(&g, &a)| [g, a]).collect();
            self.replace(self.width, self.height, UncompressedFormat::GrayAlpha, data);
        } else {
            let mut colors = decode_colors(self.base_level(), format);
            for (c, &a) in colors.iter_mut().zip(&alpha) {
                c.a = a;
            }
            let data = bytemuck::cast_slice::<Color, u8>(&colors).to_vec();
            self.replace(self.width, self.height, UncompressedFormat::R8G8B8A8, data);
        }
        Ok(())
    }

    /// Multiply colour by alpha, truncating. Fully transparent pixels lose
    /// their colour for good.
    pub fn alpha_premultiply(&mut self) -> Result<(), ImageError> {
        self.map_rgba_bytes("alpha_premultiply", bytes::premultiply_rgba_inplace)
    }
}

// ===========================================================================
// Colour adjustments
// ===========================================================================

impl Image {
    /// Multiply every pixel by `tint`.
    pub fn color_tint(&mut self, tint: Color) -> Result<(), ImageError> {
        self.map_colors("color_tint", |c| c.tint(tint))
    }

    /// Invert RGB, keep alpha.
    pub fn color_invert(&mut self) -> Result<(), ImageError> {
        self.map_rgba_bytes("color_invert", bytes::invert_rgba_inplace)
    }

    /// Reduce to 8-bit luminance. The image becomes [`UncompressedFormat::Grayscale`]
    /// and any alpha is dropped.
    pub fn color_grayscale(&mut self) -> Result<(), ImageError> {
        self.pixel_layout("color_grayscale")?;
        self.convert(UncompressedFormat::Grayscale)
    }

    /// `contrast` in `[-100, 100]`.
    pub fn color_contrast(&mut self, contrast: f32) -> Result<(), ImageError> {
        let factor = contrast.clamp(-100.0, 100.0) / 100.0;
        self.map_colors("color_contrast", |c| c.contrast(factor))
    }

    /// Add `brightness` in `[-255, 255]` to each colour channel, saturating.
    pub fn color_brightness(&mut self, brightness: i32) -> Result<(), ImageError> {
        let delta = brightness.clamp(-255, 255);
        let add = |v: u8| (i32::from(v) + delta).clamp(0, 255) as u8;
        self.map_colors("color_brightness", |c| Color::new(add(c.r), add(c.g), add(c.b), c.a))
    }

    /// Swap every pixel exactly equal to `from` for `to`.
    pub fn color_replace(&mut self, from: Color, to: Color) -> Result<(), ImageError> {
        self.map_colors("color_replace", |c| if c == from { to } else { c })
    }
}
