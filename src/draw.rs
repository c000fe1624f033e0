//! Rasterization onto an image's base level, image-onto-image blits and
//! n-patch stretching.
//!
//! Shapes are written straight into the pixel buffer in the image's own
//! layout, without blending. Coordinates outside the image are clipped
//! silently; only an empty or compressed target is an error.
//!
//! ```rust
//! use pigment::{Color, Image, Rect, UncompressedFormat, Vec2};
//!
//! let mut img = Image::new(16, 16, UncompressedFormat::R8G8B8A8);
//! img.clear_background(Color::BLACK).unwrap();
//! img.draw_rectangle(Rect::new(2, 2, 4, 4), Color::RED).unwrap();
//! img.draw_triangle(Vec2::new(8.0, 8.0), Vec2::new(15.0, 8.0), Vec2::new(8.0, 15.0), Color::BLUE)
//!     .unwrap();
//! assert_eq!(img.get_color(3, 3).unwrap(), Color::RED);
//! assert_eq!(img.get_color(9, 9).unwrap(), Color::BLUE);
//! ```

use std::borrow::Cow;

use log::{debug, warn};

use crate::codec::{decode_pixel, encode_pixel};
use crate::color::Color;
use crate::error::ImageError;
use crate::format::{UncompressedFormat, pixel_data_size};
use crate::geometry::{Rect, Vec2, to_i32};
use crate::image::Image;

// ===========================================================================
// Pixels and fills
// ===========================================================================

impl Image {
    /// Write one already-encoded pixel, ignoring out-of-range coordinates.
    #[inline]
    fn put(&mut self, x: i32, y: i32, px: &[u8]) {
        if x < 0 || y < 0 || x >= to_i32(self.width) || y >= to_i32(self.height) {
            return;
        }
        let offset = (y as usize * self.width + x as usize) * px.len();
        self.data[offset..offset + px.len()].copy_from_slice(px);
    }

    fn encoded(format: UncompressedFormat, color: Color) -> Vec<u8> {
        let mut px = vec![0u8; format.bytes_per_pixel()];
        encode_pixel(&mut px, color, format);
        px
    }

    /// Fill the whole base level with `color`.
    pub fn clear_background(&mut self, color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("clear_background")?;
        let px = Self::encoded(format, color);
        let size = pixel_data_size(self.width, self.height, self.format);
        for dst in self.data[..size].chunks_exact_mut(px.len()) {
            dst.copy_from_slice(&px);
        }
        Ok(())
    }

    /// Set one pixel. Coordinates outside the image do nothing.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_pixel")?;
        self.put(x, y, &Self::encoded(format, color));
        Ok(())
    }

    /// Fill `rect`, clipped to the image.
    pub fn draw_rectangle(&mut self, rect: Rect, color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_rectangle")?;
        let Some(r) = rect.clip_to(self.width, self.height) else {
            return Ok(());
        };
        let px = Self::encoded(format, color);
        let row = px.repeat(r.width as usize);
        let stride = self.width * px.len();
        for y in r.y as usize..r.bottom() as usize {
            let start = y * stride + r.x as usize * px.len();
            self.data[start..start + row.len()].copy_from_slice(&row);
        }
        Ok(())
    }

    /// Outline `rect` with bands `thick` pixels wide, drawn inside it.
    pub fn draw_rectangle_lines(&mut self, rect: Rect, thick: i32, color: Color) -> Result<(), ImageError> {
        self.pixel_layout("draw_rectangle_lines")?;
        let Rect { x, y, width, height } = rect;
        let inner_y = y.saturating_add(thick);
        let inner_h = height.saturating_sub(thick.saturating_mul(2));
        self.draw_rectangle(Rect::new(x, y, width, thick), color)?;
        self.draw_rectangle(Rect::new(x, inner_y, thick, inner_h), color)?;
        self.draw_rectangle(Rect::new(rect.right().saturating_sub(thick), inner_y, thick, inner_h), color)?;
        self.draw_rectangle(Rect::new(x, rect.bottom().saturating_sub(thick), width, thick), color)
    }
}

// ===========================================================================
// Lines and circles
// ===========================================================================

/// Liang-Barsky clip of a segment to the pixel centres of a `width` x
/// `height` image. Returns the end points rounded back to pixels, or `None`
/// when the segment misses the image.
fn clip_line(start: (i32, i32), end: (i32, i32), width: usize, height: usize) -> Option<((i32, i32), (i32, i32))> {
    let (x0, y0) = (f64::from(start.0), f64::from(start.1));
    let (dx, dy) = (f64::from(end.0) - x0, f64::from(end.1) - y0);
    let (x_max, y_max) = (width as f64 - 1.0, height as f64 - 1.0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
    }
    if t0 > t1 {
        return None;
    }
    let at = |t: f64| ((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

impl Image {
    /// Bresenham line, both end points included. Segments are clipped to
    /// the image first, so far-away end points cost nothing.
    pub fn draw_line(&mut self, start: (i32, i32), end: (i32, i32), color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_line")?;
        let px = Self::encoded(format, color);
        self.line(start, end, &px);
        Ok(())
    }

    fn line(&mut self, start: (i32, i32), end: (i32, i32), px: &[u8]) {
        let Some(((mut x0, mut y0), (x1, y1))) = clip_line(start, end, self.width, self.height) else {
            return;
        };
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, px);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Walk one octant of a midpoint circle, handing each `(x, y)` offset
    /// to `visit`.
    fn midpoint_circle(radius: i32, mut visit: impl FnMut(i32, i32)) {
        let (mut x, mut y) = (0, radius);
        let mut d = 3 - 2 * radius;
        while y >= x {
            visit(x, y);
            x += 1;
            if d > 0 {
                y -= 1;
                d += 4 * (x - y) + 10;
            } else {
                d += 4 * x + 6;
            }
        }
    }

    /// Filled circle.
    pub fn draw_circle(&mut self, center: (i32, i32), radius: i32, color: Color) -> Result<(), ImageError> {
        self.pixel_layout("draw_circle")?;
        if radius < 0 {
            return Ok(());
        }
        let (cx, cy) = center;
        let mut spans = Vec::new();
        Self::midpoint_circle(radius, |x, y| {
            spans.push(Rect::new(cx - x, cy + y, 2 * x + 1, 1));
            spans.push(Rect::new(cx - x, cy - y, 2 * x + 1, 1));
            spans.push(Rect::new(cx - y, cy + x, 2 * y + 1, 1));
            spans.push(Rect::new(cx - y, cy - x, 2 * y + 1, 1));
        });
        for span in spans {
            self.draw_rectangle(span, color)?;
        }
        Ok(())
    }

    /// Circle outline, one pixel wide.
    pub fn draw_circle_lines(&mut self, center: (i32, i32), radius: i32, color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_circle_lines")?;
        if radius < 0 {
            return Ok(());
        }
        let px = Self::encoded(format, color);
        let (cx, cy) = center;
        let mut points = Vec::new();
        Self::midpoint_circle(radius, |x, y| {
            points.extend([(x, y), (-x, y), (x, -y), (-x, -y), (y, x), (-y, x), (y, -x), (-y, -x)]);
        });
        for (dx, dy) in points {
            self.put(cx + dx, cy + dy, &px);
        }
        Ok(())
    }
}

// ===========================================================================
// Triangles
// ===========================================================================

/// Edge-function setup for one triangle over its clipped bounding box.
struct TriangleRaster {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    x_step: [i32; 3],
    y_step: [i32; 3],
    row: [i32; 3],
}

impl TriangleRaster {
    /// `None` when the triangle is degenerate or misses the image.
    fn new(v1: Vec2, v2: Vec2, v3: Vec2, width: usize, height: usize) -> Option<Self> {
        let signed_area = (v2.x - v1.x) * (v3.y - v1.y) - (v3.x - v1.x) * (v2.y - v1.y);
        if signed_area == 0.0 {
            return None;
        }

        let x_min = (v1.x.min(v2.x).min(v3.x) as i32).max(0);
        let y_min = (v1.y.min(v2.y).min(v3.y) as i32).max(0);
        let x_max = (v1.x.max(v2.x).max(v3.x) as i32).min(to_i32(width) - 1);
        let y_max = (v1.y.max(v2.y).max(v3.y) as i32).min(to_i32(height) - 1);
        if x_min > x_max || y_min > y_max {
            return None;
        }

        let mut x_step = [(v3.y - v2.y) as i32, (v1.y - v3.y) as i32, (v2.y - v1.y) as i32];
        let mut y_step = [(v2.x - v3.x) as i32, (v3.x - v1.x) as i32, (v1.x - v2.x) as i32];
        if signed_area > 0.0 {
            for s in x_step.iter_mut().chain(y_step.iter_mut()) {
                *s = -*s;
            }
        }

        let edge = |origin: Vec2, i: usize| {
            ((x_min as f32 - origin.x) * x_step[i] as f32 + y_step[i] as f32 * (y_min as f32 - origin.y)) as i32
        };
        let row = [edge(v2, 0), edge(v3, 1), edge(v1, 2)];

        Some(Self { x_min, x_max, y_min, y_max, x_step, y_step, row })
    }

    /// Call `inside(x, y, w)` for every covered pixel with its three edge
    /// weights.
    fn for_each(&self, mut inside: impl FnMut(i32, i32, [i32; 3])) {
        let mut row = self.row;
        for y in self.y_min..=self.y_max {
            let mut w = row;
            for x in self.x_min..=self.x_max {
                if (w[0] | w[1] | w[2]) >= 0 {
                    inside(x, y, w);
                }
                for i in 0..3 {
                    w[i] += self.x_step[i];
                }
            }
            for i in 0..3 {
                row[i] += self.y_step[i];
            }
        }
    }

    fn weight_sum(&self) -> i32 {
        self.row.iter().sum()
    }
}

impl Image {
    /// Filled triangle. Either winding is accepted; a zero-area triangle
    /// draws nothing.
    pub fn draw_triangle(&mut self, v1: Vec2, v2: Vec2, v3: Vec2, color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_triangle")?;
        let Some(raster) = TriangleRaster::new(v1, v2, v3, self.width, self.height) else {
            return Ok(());
        };
        let px = Self::encoded(format, color);
        raster.for_each(|x, y, _| self.put(x, y, &px));
        Ok(())
    }

    /// Filled triangle with colours interpolated from its three corners.
    pub fn draw_triangle_ex(
        &mut self,
        (v1, v2, v3): (Vec2, Vec2, Vec2),
        (c1, c2, c3): (Color, Color, Color),
    ) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_triangle_ex")?;
        let Some(raster) = TriangleRaster::new(v1, v2, v3, self.width, self.height) else {
            return Ok(());
        };
        let sum = raster.weight_sum();
        if sum == 0 {
            return Ok(());
        }
        let inv_sum = 255.0 / sum as f32;
        let mut px = vec![0u8; format.bytes_per_pixel()];
        raster.for_each(|x, y, w| {
            let [u, v, t] = w.map(|wi| u32::from((wi as f32 * inv_sum) as u8));
            let mix = |a: u8, b: u8, c: u8| ((u32::from(a) * u + u32::from(b) * v + u32::from(c) * t) / 255) as u8;
            let color = Color::new(
                mix(c1.r, c2.r, c3.r),
                mix(c1.g, c2.g, c3.g),
                mix(c1.b, c2.b, c3.b),
                mix(c1.a, c2.a, c3.a),
            );
            encode_pixel(&mut px, color, format);
            self.put(x, y, &px);
        });
        Ok(())
    }

    pub fn draw_triangle_lines(&mut self, v1: Vec2, v2: Vec2, v3: Vec2, color: Color) -> Result<(), ImageError> {
        let format = self.pixel_layout("draw_triangle_lines")?;
        let px = Self::encoded(format, color);
        let p = |v: Vec2| (v.x as i32, v.y as i32);
        self.line(p(v1), p(v2), &px);
        self.line(p(v2), p(v3), &px);
        self.line(p(v3), p(v1), &px);
        Ok(())
    }

    /// Triangles sharing `points[0]`. Needs at least three points.
    pub fn draw_triangle_fan(&mut self, points: &[Vec2], color: Color) -> Result<(), ImageError> {
        self.pixel_layout("draw_triangle_fan")?;
        if points.len() < 3 {
            warn!("IMAGE: draw_triangle_fan: {} points, need at least 3", points.len());
            return Err(ImageError::InvalidArgument("triangle fan needs at least 3 points"));
        }
        for pair in points[1..].windows(2) {
            self.draw_triangle(points[0], pair[0], pair[1], color)?;
        }
        Ok(())
    }

    /// Triangle strip; every other triangle has its winding swapped back.
    pub fn draw_triangle_strip(&mut self, points: &[Vec2], color: Color) -> Result<(), ImageError> {
        self.pixel_layout("draw_triangle_strip")?;
        if points.len() < 3 {
            warn!("IMAGE: draw_triangle_strip: {} points, need at least 3", points.len());
            return Err(ImageError::InvalidArgument("triangle strip needs at least 3 points"));
        }
        for i in 2..points.len() {
            if i % 2 == 0 {
                self.draw_triangle(points[i], points[i - 2], points[i - 1], color)?;
            } else {
                self.draw_triangle(points[i], points[i - 1], points[i - 2], color)?;
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Blit
// ===========================================================================

/// A resolved copy of `width` x `height` pixels from a source buffer into one
/// destination level.
struct Blit<'a> {
    src: Cow<'a, [u8]>,
    src_width: usize,
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
}

/// Clip the rectangles and, when their sizes differ, resample the source
/// region to the destination size.
fn plan_blit<'a>(
    src: &'a [u8],
    (src_w, src_h): (usize, usize),
    format: UncompressedFormat,
    src_rect: Rect,
    dst_rect: Rect,
    (dst_w, dst_h): (usize, usize),
) -> Result<Option<Blit<'a>>, ImageError> {
    let Some(mut from) = src_rect.clip_to(src_w, src_h) else {
        return Ok(None);
    };
    let mut buffer = Cow::Borrowed(src);
    let mut buffer_width = src_w;

    if (from.width, from.height) != (dst_rect.width, dst_rect.height) {
        if dst_rect.is_empty() {
            return Ok(None);
        }
        let whole = Image { width: src_w, height: src_h, mipmaps: 1, format: format.into(), data: src.to_vec() };
        let mut region = whole.from_image(from)?;
        region.resize(dst_rect.width as usize, dst_rect.height as usize)?;
        from = Rect::of_size(region.width, region.height);
        buffer_width = region.width;
        buffer = Cow::Owned(region.data);
    }

    let placed = Rect::new(dst_rect.x, dst_rect.y, from.width, from.height);
    let Some(to) = placed.clip_to(dst_w, dst_h) else {
        return Ok(None);
    };
    Ok(Some(Blit {
        src: buffer,
        src_width: buffer_width,
        src_x: (from.x + to.x - dst_rect.x) as usize,
        src_y: (from.y + to.y - dst_rect.y) as usize,
        dst_x: to.x as usize,
        dst_y: to.y as usize,
        width: to.width as usize,
        height: to.height as usize,
    }))
}

impl Blit<'_> {
    fn run(
        &self,
        dst: &mut [u8],
        dst_width: usize,
        src_format: UncompressedFormat,
        dst_format: UncompressedFormat,
        tint: Color,
    ) {
        let (sbpp, dbpp) = (src_format.bytes_per_pixel(), dst_format.bytes_per_pixel());
        let opaque = tint == Color::WHITE && !src_format.has_alpha();

        for row in 0..self.height {
            let s = ((self.src_y + row) * self.src_width + self.src_x) * sbpp;
            let d = ((self.dst_y + row) * dst_width + self.dst_x) * dbpp;
            let src_row = &self.src[s..s + self.width * sbpp];
            let dst_row = &mut dst[d..d + self.width * dbpp];

            if opaque && src_format == dst_format {
                dst_row.copy_from_slice(src_row);
                continue;
            }
            for (sp, dp) in src_row.chunks_exact(sbpp).zip(dst_row.chunks_exact_mut(dbpp)) {
                let src_color = decode_pixel(sp, src_format);
                let out = if opaque {
                    src_color
                } else {
                    Color::alpha_blend(decode_pixel(dp, dst_format), src_color, tint)
                };
                encode_pixel(dp, out, dst_format);
            }
        }
    }
}

impl Image {
    /// Draw `src_rect` of `src` into `dst_rect` of this image, scaling when
    /// the rectangles differ in size and alpha-blending through `tint`.
    ///
    /// When both images carry mip chains each further level is drawn too,
    /// with all rectangles halved per level.
    pub fn draw_image(&mut self, src: &Image, src_rect: Rect, dst_rect: Rect, tint: Color) -> Result<(), ImageError> {
        let dst_format = self.pixel_layout("draw_image")?;
        let src_format = src.pixel_layout("draw_image")?;

        let levels = if self.mipmaps > 1 && src.mipmaps > 1 {
            self.mipmaps.min(src.mipmaps)
        } else {
            if self.mipmaps > 1 {
                warn!("IMAGE: draw_image: source has no mip chain, drawing base level only");
            }
            1
        };

        // Resolve every level before touching the destination.
        let dst_levels: Vec<(usize, usize, usize)> =
            self.levels().take(levels).map(|l| (l.width, l.height, l.data.len())).collect();
        let mut plans = Vec::with_capacity(levels);
        let (mut s_rect, mut d_rect) = (src_rect, dst_rect);
        for (level, &(dw, dh, _)) in src.levels().zip(&dst_levels) {
            plans.push(plan_blit(level.data, (level.width, level.height), src_format, s_rect, d_rect, (dw, dh))?);
            s_rect = s_rect.halved();
            d_rect = d_rect.halved();
        }

        let mut rest = self.data.as_mut_slice();
        for (i, (plan, &(dw, _, len))) in plans.iter().zip(&dst_levels).enumerate() {
            let (level, tail) = std::mem::take(&mut rest).split_at_mut(len);
            rest = tail;
            match plan {
                Some(blit) => blit.run(level, dw, src_format, dst_format, tint),
                None => debug!("IMAGE: draw_image: level {i} fully clipped"),
            }
        }
        Ok(())
    }
}

// ===========================================================================
// N-patch
// ===========================================================================

/// How [`NPatchInfo`] splits its source rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NPatchLayout {
    /// 3x3 cells; corners keep their size, edges stretch along one axis.
    #[default]
    NinePatch,
    /// Three stacked bands split by `top` and `bottom`.
    ThreePatchVertical,
    /// Three side-by-side bands split by `left` and `right`.
    ThreePatchHorizontal,
}

/// Source region and border widths for [`Image::draw_npatch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NPatchInfo {
    pub source: Rect,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub layout: NPatchLayout,
}

/// Split a source span and a destination span into three matching bands.
/// When the destination is too small for both borders, they shrink in
/// proportion and the middle band vanishes.
fn bands(src_start: i32, src_len: i32, lo: i32, hi: i32, dst_start: i32, dst_len: i32) -> [(i32, i32, i32, i32); 3] {
    let (lo, hi) = (lo.max(0), hi.max(0));
    let (dlo, dhi, dmid) = if dst_len <= lo + hi {
        let dlo = if lo + hi > 0 { lo * dst_len / (lo + hi) } else { 0 };
        (dlo, dst_len - dlo, 0)
    } else {
        (lo, hi, dst_len - lo - hi)
    };
    [
        (src_start, lo, dst_start, dlo),
        (src_start + lo, src_len - lo - hi, dst_start + dlo, dmid),
        (src_start + src_len - hi, hi, dst_start + dlo + dmid, dhi),
    ]
}

impl Image {
    /// Stretch `info.source` of `src` over `dst_rect`, keeping the borders
    /// unscaled.
    pub fn draw_npatch(&mut self, src: &Image, info: NPatchInfo, dst_rect: Rect, tint: Color) -> Result<(), ImageError> {
        self.pixel_layout("draw_npatch")?;
        if dst_rect.is_empty() || info.source.is_empty() {
            return Ok(());
        }
        let s = info.source;
        let (left, right) = match info.layout {
            NPatchLayout::ThreePatchVertical => (0, 0),
            _ => (info.left, info.right),
        };
        let (top, bottom) = match info.layout {
            NPatchLayout::ThreePatchHorizontal => (0, 0),
            _ => (info.top, info.bottom),
        };

        let columns = bands(s.x, s.width, left, right, dst_rect.x, dst_rect.width);
        let rows = bands(s.y, s.height, top, bottom, dst_rect.y, dst_rect.height);
        for &(sy, sh, dy, dh) in &rows {
            for &(sx, sw, dx, dw) in &columns {
                if sw <= 0 || sh <= 0 || dw <= 0 || dh <= 0 {
                    continue;
                }
                self.draw_image(src, Rect::new(sx, sy, sw, sh), Rect::new(dx, dy, dw, dh), tint)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompressedFormat;

    fn canvas(w: usize, h: usize) -> Image {
        let mut img = Image::new(w, h, UncompressedFormat::R8G8B8A8);
        img.clear_background(Color::BLACK).unwrap();
        img
    }

    fn close(a: Color, b: Color) -> bool {
        a.r.abs_diff(b.r) <= 1 && a.g.abs_diff(b.g) <= 1 && a.b.abs_diff(b.b) <= 1 && a.a.abs_diff(b.a) <= 1
    }

    fn count(img: &Image, c: Color) -> usize {
        img.colors().unwrap().into_iter().filter(|&p| p == c).count()
    }

    #[test]
    fn pixel_out_of_bounds_is_silent() {
        let mut img = canvas(2, 2);
        let before = img.clone();
        img.draw_pixel(-1, 0, Color::RED).unwrap();
        img.draw_pixel(0, 2, Color::RED).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn drawing_on_compressed_fails() {
        let mut img = Image::new(4, 4, CompressedFormat::Etc1Rgb);
        assert!(matches!(img.draw_pixel(0, 0, Color::RED), Err(ImageError::Compressed(_))));
        assert!(img.clear_background(Color::RED).is_err());
    }

    #[test]
    fn grayscale_pixel_stores_luma() {
        let mut img = Image::new(1, 1, UncompressedFormat::Grayscale);
        img.draw_pixel(0, 0, Color::new(255, 0, 0, 255)).unwrap();
        assert_eq!(img.data(), &[76]);
    }

    #[test]
    fn rectangle_clips() {
        let mut img = canvas(4, 4);
        img.draw_rectangle(Rect::new(-2, 2, 4, 10), Color::RED).unwrap();
        assert_eq!(count(&img, Color::RED), 4);
        assert_eq!(img.get_color(1, 3).unwrap(), Color::RED);
        assert_eq!(img.get_color(2, 3).unwrap(), Color::BLACK);
    }

    #[test]
    fn rectangle_outline() {
        let mut img = canvas(5, 5);
        img.draw_rectangle_lines(Rect::new(0, 0, 5, 5), 1, Color::RED).unwrap();
        assert_eq!(count(&img, Color::RED), 16);
        assert_eq!(img.get_color(2, 2).unwrap(), Color::BLACK);
    }

    #[test]
    fn line_covers_endpoints() {
        let mut img = canvas(8, 8);
        img.draw_line((0, 0), (7, 3), Color::RED).unwrap();
        assert_eq!(img.get_color(0, 0).unwrap(), Color::RED);
        assert_eq!(img.get_color(7, 3).unwrap(), Color::RED);
        assert_eq!(count(&img, Color::RED), 8);

        let mut img = canvas(4, 4);
        img.draw_line((1, 3), (1, 0), Color::RED).unwrap();
        assert_eq!(count(&img, Color::RED), 4);
    }

    #[test]
    fn line_clipped_to_image() {
        let mut img = canvas(8, 4);
        img.draw_line((i32::MIN, 1), (i32::MAX, 1), Color::RED).unwrap();
        assert_eq!(count(&img, Color::RED), 8);
        assert!((0..8).all(|x| img.get_color(x, 1).unwrap() == Color::RED));

        let mut img = canvas(8, 4);
        img.draw_line((-3, -3), (10, 10), Color::RED).unwrap();
        assert_eq!(count(&img, Color::RED), 4);
        assert_eq!(img.get_color(3, 3).unwrap(), Color::RED);

        let mut img = canvas(8, 4);
        let before = img.clone();
        img.draw_line((-100, -5), (100, -1), Color::RED).unwrap();
        img.draw_line((i32::MIN, i32::MIN), (i32::MAX, i32::MIN), Color::RED).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn extreme_rectangles_clip() {
        let mut img = canvas(4, 4);
        img.draw_rectangle(Rect::new(2, 1, i32::MAX, i32::MAX), Color::RED).unwrap();
        assert_eq!(count(&img, Color::RED), 6);

        let before = img.clone();
        img.draw_rectangle_lines(Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX), i32::MAX, Color::BLUE)
            .unwrap();
        assert_eq!(img, before);

        img.crop(Rect::new(1, 1, i32::MAX, i32::MAX)).unwrap();
        assert_eq!((img.width(), img.height()), (3, 3));
    }

    #[test]
    fn circles() {
        let mut img = canvas(11, 11);
        img.draw_circle((5, 5), 3, Color::RED).unwrap();
        assert_eq!(img.get_color(5, 5).unwrap(), Color::RED);
        assert_eq!(img.get_color(8, 5).unwrap(), Color::RED);
        assert_eq!(img.get_color(0, 0).unwrap(), Color::BLACK);

        let mut ring = canvas(11, 11);
        ring.draw_circle_lines((5, 5), 3, Color::RED).unwrap();
        assert_eq!(ring.get_color(5, 2).unwrap(), Color::RED);
        assert_eq!(ring.get_color(5, 5).unwrap(), Color::BLACK);
    }

    #[test]
    fn triangle_either_winding() {
        let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0), Vec2::new(0.0, 8.0));
        let mut cw = canvas(10, 10);
        cw.draw_triangle(a, b, c, Color::RED).unwrap();
        let mut ccw = canvas(10, 10);
        ccw.draw_triangle(a, c, b, Color::RED).unwrap();
        assert_eq!(cw, ccw);
        assert_eq!(cw.get_color(1, 1).unwrap(), Color::RED);
        assert_eq!(cw.get_color(8, 8).unwrap(), Color::BLACK);
    }

    #[test]
    fn degenerate_triangle_draws_nothing() {
        let mut img = canvas(6, 6);
        let before = img.clone();
        img.draw_triangle(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0), Vec2::new(4.0, 4.0), Color::RED)
            .unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn triangle_ex_solid_matches_plain() {
        let (a, b, c) = (Vec2::new(1.0, 1.0), Vec2::new(9.0, 2.0), Vec2::new(3.0, 9.0));
        let mut img = canvas(10, 10);
        img.draw_triangle_ex((a, b, c), (Color::WHITE, Color::WHITE, Color::WHITE)).unwrap();
        for p in img.colors().unwrap() {
            assert!(p == Color::BLACK || (p.r >= 250 && p.r == p.g && p.g == p.b), "{p:?}");
        }
    }

    #[test]
    fn fan_and_strip() {
        let quad = [Vec2::new(0.0, 0.0), Vec2::new(6.0, 0.0), Vec2::new(6.0, 6.0), Vec2::new(0.0, 6.0)];
        let mut fan = canvas(8, 8);
        fan.draw_triangle_fan(&quad, Color::RED).unwrap();
        assert_eq!(fan.get_color(1, 4).unwrap(), Color::RED);
        assert_eq!(fan.get_color(4, 1).unwrap(), Color::RED);
        assert!(fan.draw_triangle_fan(&quad[..2], Color::RED).is_err());

        let strip = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 6.0), Vec2::new(6.0, 0.0), Vec2::new(6.0, 6.0)];
        let mut img = canvas(8, 8);
        img.draw_triangle_strip(&strip, Color::RED).unwrap();
        assert_eq!(img.get_color(1, 4).unwrap(), Color::RED);
        assert_eq!(img.get_color(4, 1).unwrap(), Color::RED);
    }

    #[test]
    fn opaque_blit_is_byte_copy() {
        let src = Image::from_colors(2, 2, &[Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]).unwrap();
        let mut dst = canvas(2, 2);
        dst.draw_image(&src, Rect::of_size(2, 2), Rect::of_size(2, 2), Color::WHITE).unwrap();
        assert_eq!(dst.data(), src.data());
    }

    #[test]
    fn blit_negative_offset_shifts_source() {
        let src = Image::from_colors(3, 1, &[Color::RED, Color::GREEN, Color::BLUE]).unwrap();
        let mut dst = canvas(3, 1);
        dst.draw_image(&src, Rect::of_size(3, 1), Rect::new(-1, 0, 3, 1), Color::WHITE).unwrap();
        assert_eq!(dst.colors().unwrap(), vec![Color::GREEN, Color::BLUE, Color::BLACK]);
    }

    #[test]
    fn blit_blends_translucent_source() {
        let src = Image::from_colors(1, 1, &[Color::new(255, 255, 255, 0)]).unwrap();
        let mut dst = canvas(1, 1);
        dst.draw_image(&src, Rect::of_size(1, 1), Rect::of_size(1, 1), Color::WHITE).unwrap();
        assert_eq!(dst.get_color(0, 0).unwrap(), Color::BLACK);
    }

    #[test]
    fn blit_scales_and_converts() {
        let mut src = Image::from_colors(1, 1, &[Color::new(10, 200, 30, 255)]).unwrap();
        src.convert(UncompressedFormat::R8G8B8).unwrap();
        let mut dst = canvas(4, 4);
        dst.draw_image(&src, Rect::of_size(1, 1), Rect::new(1, 1, 2, 2), Color::WHITE).unwrap();
        assert!(close(dst.get_color(2, 2).unwrap(), Color::new(10, 200, 30, 255)));
        assert_eq!(dst.get_color(0, 0).unwrap(), Color::BLACK);
        assert_eq!(dst.get_color(3, 3).unwrap(), Color::BLACK);
    }

    #[test]
    fn blit_walks_mip_chains() {
        let mut src = Image::from_colors(4, 4, &[Color::RED; 16]).unwrap();
        src.gen_mipmaps().unwrap();
        let mut dst = canvas(4, 4);
        dst.gen_mipmaps().unwrap();
        dst.draw_image(&src, Rect::of_size(4, 4), Rect::of_size(4, 4), Color::WHITE).unwrap();
        let last = dst.levels().last().unwrap();
        assert_eq!(last.data, src.levels().last().unwrap().data);
        assert!(dst.is_valid());
    }

    #[test]
    fn nine_patch_keeps_corners() {
        let mut colors = vec![Color::GREEN; 9];
        colors[0] = Color::RED;
        colors[8] = Color::BLUE;
        let src = Image::from_colors(3, 3, &colors).unwrap();
        let info = NPatchInfo { source: Rect::of_size(3, 3), left: 1, top: 1, right: 1, bottom: 1, ..Default::default() };
        let mut dst = canvas(6, 5);
        dst.draw_npatch(&src, info, Rect::of_size(6, 5), Color::WHITE).unwrap();
        assert_eq!(dst.get_color(0, 0).unwrap(), Color::RED);
        assert_eq!(dst.get_color(5, 4).unwrap(), Color::BLUE);
        assert!(close(dst.get_color(1, 0).unwrap(), Color::GREEN));
        assert!(close(dst.get_color(3, 2).unwrap(), Color::GREEN));
    }

    #[test]
    fn three_patch_bands() {
        assert_eq!(bands(0, 10, 2, 3, 0, 20), [(0, 2, 0, 2), (2, 5, 2, 15), (7, 3, 17, 3)]);
        // too small: borders shrink, middle vanishes
        assert_eq!(bands(0, 10, 2, 2, 0, 2), [(0, 2, 0, 1), (2, 6, 1, 0), (8, 2, 1, 1)]);
    }
}
