//! Geometry changes: crop, resampling, canvas resize, flips, rotations and
//! mip chain generation.
//!
//! Every operation here builds its output buffer completely before swapping
//! it into the image, so an error leaves the image as it was.

use fast_image_resize::images::{Image as FirImage, ImageRef as FirImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use log::{debug, warn};

use crate::codec::encode_pixel;
use crate::color::Color;
use crate::convert::convert_pixels;
use crate::error::ImageError;
use crate::format::{UncompressedFormat, mip_chain_size, next_level};
use crate::geometry::{Rect, to_i32};
use crate::image::Image;

/// Resample `src` with a separable convolution filter: Catmull-Rom when
/// neither axis shrinks, Mitchell otherwise.
fn resample(
    src: &[u8],
    (width, height): (usize, usize),
    (new_width, new_height): (usize, usize),
    pixel_type: PixelType,
) -> Result<Vec<u8>, ImageError> {
    let to_u32 = |v: usize| u32::try_from(v).map_err(|_| ImageError::InvalidArgument("dimension exceeds u32"));
    let view = FirImageRef::new(to_u32(width)?, to_u32(height)?, src, pixel_type)
        .map_err(|e| ImageError::Resize(e.to_string()))?;
    let mut dst = FirImage::new(to_u32(new_width)?, to_u32(new_height)?, pixel_type);

    let filter = if new_width >= width && new_height >= height {
        FilterType::CatmullRom
    } else {
        FilterType::Mitchell
    };
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(filter));
    Resizer::new()
        .resize(&view, &mut dst, &options)
        .map_err(|e| ImageError::Resize(e.to_string()))?;
    Ok(dst.into_vec())
}

/// Smallest power of two not below `v`.
#[inline]
fn next_pot(v: usize) -> usize {
    v.max(1).next_power_of_two()
}

impl Image {
    /// Keep only `rect`, clamped to the image. Fails if nothing remains.
    pub fn crop(&mut self, rect: Rect) -> Result<(), ImageError> {
        let format = self.pixel_layout("crop")?;
        let Some(clipped) = rect.clip_to(self.width, self.height) else {
            warn!("IMAGE: crop: rectangle {rect:?} out of bounds");
            return Err(self.out_of_bounds(rect));
        };
        self.note_mips_dropped("crop");
        let cropped = self.from_image(clipped)?;
        self.replace(cropped.width, cropped.height, format, cropped.data);
        Ok(())
    }

    /// Filtered resample to `new_width` x `new_height`.
    ///
    /// Grayscale, gray+alpha, RGB8 and RGBA8 resample in place; other
    /// layouts pass through RGBA8 and are converted back afterwards.
    pub fn resize(&mut self, new_width: usize, new_height: usize) -> Result<(), ImageError> {
        let format = self.pixel_layout("resize")?;
        if new_width == 0 || new_height == 0 {
            warn!("IMAGE: resize: target {new_width}x{new_height} is empty");
            return Err(ImageError::InvalidArgument("resize target must be non-empty"));
        }
        if (new_width, new_height) == (self.width, self.height) {
            return Ok(());
        }
        self.note_mips_dropped("resize");

        let from = (self.width, self.height);
        let to = (new_width, new_height);
        let native = match format {
            UncompressedFormat::Grayscale => Some(PixelType::U8),
            UncompressedFormat::GrayAlpha => Some(PixelType::U8x2),
            UncompressedFormat::R8G8B8 => Some(PixelType::U8x3),
            UncompressedFormat::R8G8B8A8 => Some(PixelType::U8x4),
            _ => None,
        };

        let data = match native {
            Some(pixel_type) => resample(self.base_level(), from, to, pixel_type)?,
            None => {
                debug!("IMAGE: resize: {format:?} resampled through RGBA8");
                let rgba = convert_pixels(self.base_level(), format, UncompressedFormat::R8G8B8A8);
                let resized = resample(&rgba, from, to, PixelType::U8x4)?;
                convert_pixels(&resized, UncompressedFormat::R8G8B8A8, format)
            }
        };
        self.replace(new_width, new_height, format, data);
        Ok(())
    }

    /// Nearest-neighbour resample in 16.16 fixed point. Copies whole pixels,
    /// so values survive bit-exact in every layout.
    pub fn resize_nn(&mut self, new_width: usize, new_height: usize) -> Result<(), ImageError> {
        let format = self.pixel_layout("resize_nn")?;
        if new_width == 0 || new_height == 0 {
            warn!("IMAGE: resize_nn: target {new_width}x{new_height} is empty");
            return Err(ImageError::InvalidArgument("resize target must be non-empty"));
        }
        self.note_mips_dropped("resize_nn");

        let (w, h) = (self.width, self.height);
        let bpp = format.bytes_per_pixel();
        let x_ratio = ((w << 16) / new_width) + 1;
        let y_ratio = ((h << 16) / new_height) + 1;
        let src = self.base_level();

        let mut data = vec![0u8; new_width * new_height * bpp];
        for (y, row) in data.chunks_exact_mut(new_width * bpp).enumerate() {
            let sy = ((y * y_ratio) >> 16).min(h - 1);
            for (x, px) in row.chunks_exact_mut(bpp).enumerate() {
                let sx = ((x * x_ratio) >> 16).min(w - 1);
                let offset = (sy * w + sx) * bpp;
                px.copy_from_slice(&src[offset..offset + bpp]);
            }
        }
        self.replace(new_width, new_height, format, data);
        Ok(())
    }

    /// Place the image at (`offset_x`, `offset_y`) on a new canvas filled
    /// with `fill`. Parts falling outside the canvas are cut off.
    pub fn resize_canvas(
        &mut self,
        new_width: usize,
        new_height: usize,
        offset_x: i32,
        offset_y: i32,
        fill: Color,
    ) -> Result<(), ImageError> {
        let format = self.pixel_layout("resize_canvas")?;
        if new_width == 0 || new_height == 0 {
            warn!("IMAGE: resize_canvas: target {new_width}x{new_height} is empty");
            return Err(ImageError::InvalidArgument("canvas must be non-empty"));
        }
        if (new_width, new_height) == (self.width, self.height) && (offset_x, offset_y) == (0, 0) {
            return Ok(());
        }
        self.note_mips_dropped("resize_canvas");

        let bpp = format.bytes_per_pixel();
        let mut fill_px = vec![0u8; bpp];
        encode_pixel(&mut fill_px, fill, format);
        let mut data = fill_px.repeat(new_width * new_height);

        let placed = Rect::new(offset_x, offset_y, to_i32(self.width), to_i32(self.height));
        if let Some(dst) = placed.clip_to(new_width, new_height) {
            let (sx, sy) = ((dst.x - offset_x) as usize, (dst.y - offset_y) as usize);
            let (dx, dy) = (dst.x as usize, dst.y as usize);
            let row_bytes = dst.width as usize * bpp;
            let src = self.base_level();
            for row in 0..dst.height as usize {
                let s = ((sy + row) * self.width + sx) * bpp;
                let d = ((dy + row) * new_width + dx) * bpp;
                data[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
            }
        }
        self.replace(new_width, new_height, format, data);
        Ok(())
    }

    /// Grow the canvas to the next power of two in each axis, anchored at
    /// the top-left corner.
    pub fn to_pot(&mut self, fill: Color) -> Result<(), ImageError> {
        self.pixel_layout("to_pot")?;
        let (pw, ph) = (next_pot(self.width), next_pot(self.height));
        if (pw, ph) == (self.width, self.height) {
            return Ok(());
        }
        self.resize_canvas(pw, ph, 0, 0, fill)
    }

    pub fn flip_vertical(&mut self) -> Result<(), ImageError> {
        let format = self.pixel_layout("flip_vertical")?;
        self.note_mips_dropped("flip_vertical");
        let row_bytes = self.width * format.bytes_per_pixel();
        let mut data = Vec::with_capacity(self.height * row_bytes);
        for row in self.base_level().chunks_exact(row_bytes).rev() {
            data.extend_from_slice(row);
        }
        self.replace(self.width, self.height, format, data);
        Ok(())
    }

    pub fn flip_horizontal(&mut self) -> Result<(), ImageError> {
        let format = self.pixel_layout("flip_horizontal")?;
        self.note_mips_dropped("flip_horizontal");
        let bpp = format.bytes_per_pixel();
        let mut data = Vec::with_capacity(self.base_level().len());
        for row in self.base_level().chunks_exact(self.width * bpp) {
            for px in row.chunks_exact(bpp).rev() {
                data.extend_from_slice(px);
            }
        }
        self.replace(self.width, self.height, format, data);
        Ok(())
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_cw(&mut self) -> Result<(), ImageError> {
        let format = self.pixel_layout("rotate_cw")?;
        self.note_mips_dropped("rotate_cw");
        let (w, h, bpp) = (self.width, self.height, format.bytes_per_pixel());
        let src = self.base_level();
        let mut data = vec![0u8; src.len()];
        for y in 0..h {
            for x in 0..w {
                let d = (x * h + (h - y - 1)) * bpp;
                let s = (y * w + x) * bpp;
                data[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
            }
        }
        self.replace(h, w, format, data);
        Ok(())
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn rotate_ccw(&mut self) -> Result<(), ImageError> {
        let format = self.pixel_layout("rotate_ccw")?;
        self.note_mips_dropped("rotate_ccw");
        let (w, h, bpp) = (self.width, self.height, format.bytes_per_pixel());
        let src = self.base_level();
        let mut data = vec![0u8; src.len()];
        for y in 0..h {
            for x in 0..w {
                let d = (x * h + y) * bpp;
                let s = (y * w + (w - x - 1)) * bpp;
                data[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
            }
        }
        self.replace(h, w, format, data);
        Ok(())
    }

    /// Rotate by an arbitrary angle (degrees, positive is clockwise in image
    /// space). The canvas grows to the rotated bounding box; uncovered
    /// corners are zero bytes. Samples are bilinear per byte.
    pub fn rotate(&mut self, degrees: f32) -> Result<(), ImageError> {
        let format = self.pixel_layout("rotate")?;
        self.note_mips_dropped("rotate");

        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);
        let new_w = ((w * cos).abs() + (h * sin).abs()) as usize;
        let new_h = ((h * cos).abs() + (w * sin).abs()) as usize;
        let (new_w, new_h) = (new_w.max(1), new_h.max(1));

        let bpp = format.bytes_per_pixel();
        let src = self.base_level();
        let (sw, sh) = (self.width, self.height);
        let mut data = vec![0u8; new_w * new_h * bpp];

        for y in 0..new_h {
            for x in 0..new_w {
                let cx = x as f32 - new_w as f32 / 2.0;
                let cy = y as f32 - new_h as f32 / 2.0;
                let old_x = cx * cos + cy * sin + w / 2.0;
                let old_y = cy * cos - cx * sin + h / 2.0;
                if !(old_x >= 0.0 && old_x < w && old_y >= 0.0 && old_y < h) {
                    continue;
                }
                let (x1, y1) = (old_x.floor() as usize, old_y.floor() as usize);
                let (x2, y2) = ((x1 + 1).min(sw - 1), (y1 + 1).min(sh - 1));
                let (px, py) = (old_x - x1 as f32, old_y - y1 as f32);

                let at = |sx: usize, sy: usize, i: usize| f32::from(src[(sy * sw + sx) * bpp + i]);
                let out = (y * new_w + x) * bpp;
                for i in 0..bpp {
                    let v = at(x1, y1, i) * (1.0 - px) * (1.0 - py)
                        + at(x2, y1, i) * px * (1.0 - py)
                        + at(x1, y2, i) * (1.0 - px) * py
                        + at(x2, y2, i) * px * py;
                    data[out + i] = v as u8;
                }
            }
        }
        self.replace(new_w, new_h, format, data);
        Ok(())
    }

    /// Build the full mip chain down to 1x1. Each level is a filtered
    /// resample of the one above it.
    pub fn gen_mipmaps(&mut self) -> Result<(), ImageError> {
        let format = self.pixel_layout("gen_mipmaps")?;

        let (mut w, mut h) = (self.width, self.height);
        let mut count = 1;
        while (w, h) != (1, 1) {
            (w, h) = next_level(w, h);
            count += 1;
        }
        if self.mipmaps >= count {
            warn!("IMAGE: gen_mipmaps: {} mip levels already available", self.mipmaps);
            return Ok(());
        }

        let mut data = Vec::with_capacity(mip_chain_size(self.width, self.height, count, self.format));
        data.extend_from_slice(self.base_level());

        let mut level = Image {
            width: self.width,
            height: self.height,
            mipmaps: 1,
            format: format.into(),
            data: self.base_level().to_vec(),
        };
        for i in 1..count {
            let (lw, lh) = next_level(level.width, level.height);
            level.resize(lw, lh)?;
            debug!("IMAGE: gen_mipmaps: level {i} is {lw}x{lh}");
            data.extend_from_slice(&level.data);
        }

        self.mipmaps = count;
        self.data = data;
        Ok(())
    }
}
