//! Procedural RGBA8 images: solid fills, gradients, checkerboards and noise.
//!
//! Random sources are passed in, so output is reproducible under a seeded
//! generator.
//!
//! ```rust
//! use pigment::{Color, Image};
//!
//! let img = Image::gen_checked(4, 4, 2, 2, Color::BLACK, Color::WHITE);
//! assert_eq!(img.get_color(0, 0).unwrap(), Color::BLACK);
//! assert_eq!(img.get_color(2, 0).unwrap(), Color::WHITE);
//! ```

use std::f32::consts::PI;

use log::warn;
use rand::Rng;

use crate::color::Color;
use crate::format::UncompressedFormat;
use crate::image::Image;
use crate::noise::{NoiseSource, PERLIN_GAIN, PERLIN_LACUNARITY, PERLIN_OCTAVES};

/// Build an RGBA8 image from a per-pixel function of `(x, y)`.
fn generate(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Color) -> Image {
    let mut colors = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            colors.push(f(x, y));
        }
    }
    Image {
        width,
        height,
        mipmaps: 1,
        format: UncompressedFormat::R8G8B8A8.into(),
        data: bytemuck::allocation::cast_vec(colors),
    }
}

/// `end * factor + start * (1 - factor)`, truncated.
#[inline]
fn blend(start: Color, end: Color, factor: f32) -> Color {
    let mix = |s: u8, e: u8| (f32::from(e) * factor + f32::from(s) * (1.0 - factor)) as u8;
    Color::new(mix(start.r, end.r), mix(start.g, end.g), mix(start.b, end.b), mix(start.a, end.a))
}

fn at_least_one(value: usize, what: &str) -> usize {
    if value == 0 {
        warn!("IMAGE: generator {what} of 0 treated as 1");
        1
    } else {
        value
    }
}

impl Image {
    pub fn gen_color(width: usize, height: usize, color: Color) -> Image {
        generate(width, height, |_, _| color)
    }

    /// Linear gradient from `start` to `end`. `direction` is in degrees:
    /// 0 runs top to bottom, 90 left to right.
    pub fn gen_gradient_linear(width: usize, height: usize, direction: i32, start: Color, end: Color) -> Image {
        let radians = (90 - direction) as f32 / 180.0 * PI;
        let (sin, cos) = radians.sin_cos();
        let (w, h) = (width as f32, height as f32);

        // Distance of the top-left pixel from the centre along the gradient.
        let origin = 0.5 - cos * w / 2.0 - sin * h / 2.0;
        let extent = if sin.is_sign_negative() == cos.is_sign_negative() {
            origin.abs()
        } else {
            (origin + w * cos).abs()
        };

        generate(width, height, |x, y| {
            let pos = (origin + x as f32 * cos + y as f32 * sin) / extent;
            let factor = pos.clamp(-1.0, 1.0) / 2.0 + 0.5;
            blend(start, end, factor)
        })
    }

    /// `top` to `bottom`, factor `y / height`.
    pub fn gen_gradient_vertical(width: usize, height: usize, top: Color, bottom: Color) -> Image {
        generate(width, height, |_, y| blend(top, bottom, y as f32 / height as f32))
    }

    /// `left` to `right`, factor `x / width`.
    pub fn gen_gradient_horizontal(width: usize, height: usize, left: Color, right: Color) -> Image {
        generate(width, height, |x, _| blend(left, right, x as f32 / width as f32))
    }

    /// Circular gradient. `density` in `[0, 1]` sets how much of the radius
    /// stays solid `inner` before fading to `outer`.
    pub fn gen_gradient_radial(width: usize, height: usize, density: f32, inner: Color, outer: Color) -> Image {
        let radius = width.min(height) as f32 / 2.0;
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        generate(width, height, |x, y| {
            let dist = (x as f32 - cx).hypot(y as f32 - cy);
            let factor = (dist - radius * density) / (radius * (1.0 - density));
            blend(inner, outer, factor.max(0.0).min(1.0))
        })
    }

    /// Square gradient on the normalized Chebyshev distance from the centre.
    pub fn gen_gradient_square(width: usize, height: usize, density: f32, inner: Color, outer: Color) -> Image {
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        generate(width, height, |x, y| {
            let dx = (x as f32 - cx).abs() / cx;
            let dy = (y as f32 - cy).abs() / cy;
            let factor = (dx.max(dy) - density) / (1.0 - density);
            blend(inner, outer, factor.max(0.0).min(1.0))
        })
    }

    /// Checkerboard of `checks_x` x `checks_y` pixel cells; the top-left
    /// cell is `col1`.
    pub fn gen_checked(width: usize, height: usize, checks_x: usize, checks_y: usize, col1: Color, col2: Color) -> Image {
        let cx = at_least_one(checks_x, "check width");
        let cy = at_least_one(checks_y, "check height");
        generate(width, height, |x, y| if (x / cx + y / cy) % 2 == 0 { col1 } else { col2 })
    }

    /// Each pixel is white with probability `factor`, otherwise black.
    pub fn gen_white_noise<R: Rng>(width: usize, height: usize, factor: f32, rng: &mut R) -> Image {
        let threshold = (factor * 100.0) as i32;
        generate(width, height, |_, _| {
            if rng.gen_range(0..100) < threshold { Color::WHITE } else { Color::BLACK }
        })
    }

    /// Grayscale fBm noise with the default lacunarity, gain and octave
    /// count. The longer side is stretched so features stay square.
    pub fn gen_perlin_noise<N: NoiseSource + ?Sized>(
        width: usize,
        height: usize,
        offset_x: i32,
        offset_y: i32,
        scale: f32,
        noise: &N,
    ) -> Image {
        let (w, h) = (width as f32, height as f32);
        let aspect = w / h;
        generate(width, height, |x, y| {
            let mut nx = (x as i64 + i64::from(offset_x)) as f32 * (scale / w);
            let mut ny = (y as i64 + i64::from(offset_y)) as f32 * (scale / h);
            if width > height {
                nx *= aspect;
            } else {
                ny /= aspect;
            }
            let p = noise.fbm_noise3(nx, ny, 1.0, PERLIN_LACUNARITY, PERLIN_GAIN, PERLIN_OCTAVES);
            let intensity = ((p.clamp(-1.0, 1.0) + 1.0) / 2.0 * 255.0) as u8;
            Color::new(intensity, intensity, intensity, 255)
        })
    }

    /// Worley noise: one random seed per `tile_size` tile, intensity from the
    /// distance to the nearest seed in the surrounding 3x3 tiles.
    pub fn gen_cellular<R: Rng>(width: usize, height: usize, tile_size: usize, rng: &mut R) -> Image {
        let tile = at_least_one(tile_size, "tile size");
        let (per_row, per_col) = (width / tile, height / tile);
        let seeds: Vec<(i64, i64)> = (0..per_row * per_col)
            .map(|i| {
                let y = (i / per_row * tile + rng.gen_range(0..tile)) as i64;
                let x = (i % per_row * tile + rng.gen_range(0..tile)) as i64;
                (x, y)
            })
            .collect();

        generate(width, height, |x, y| {
            let (tx, ty) = ((x / tile) as i64, (y / tile) as i64);
            let mut min_dist = 65536.0f32;
            for j in -1..=1 {
                let row = ty + j;
                if row < 0 || row >= per_col as i64 {
                    continue;
                }
                for i in -1..=1 {
                    let col = tx + i;
                    if col < 0 || col >= per_row as i64 {
                        continue;
                    }
                    let (sx, sy) = seeds[(row * per_row as i64 + col) as usize];
                    let d = ((x as i64 - sx) as f32).hypot((y as i64 - sy) as f32);
                    min_dist = min_dist.min(d);
                }
            }
            let intensity = ((min_dist * 256.0 / tile as f32) as i32).min(255) as u8;
            Color::new(intensity, intensity, intensity, 255)
        })
    }

    /// Grayscale image whose bytes are `text`, truncated or zero-padded.
    pub fn gen_text(width: usize, height: usize, text: &str) -> Image {
        let mut data = vec![0u8; width * height];
        let n = text.len().min(data.len());
        data[..n].copy_from_slice(&text.as_bytes()[..n]);
        Image { width, height, mipmaps: 1, format: UncompressedFormat::Grayscale.into(), data }
    }
}
