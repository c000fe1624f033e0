//! Text rendered from an injected bitmap font and blitted onto images.
//!
//! The crate has no font of its own. A [`Font`] hands out one glyph image
//! per character; layout happens at the font's base size and the finished
//! text image is scaled to the requested size afterwards.

use log::{debug, info, warn};

use crate::color::Color;
use crate::error::ImageError;
use crate::geometry::{Rect, to_i32};
use crate::image::Image;

/// One glyph as a font supplies it.
#[derive(Clone, Copy, Debug)]
pub struct Glyph<'a> {
    pub image: &'a Image,
    /// Offset from the pen position to the glyph image's top-left corner.
    pub offset_x: i32,
    pub offset_y: i32,
    /// Pen advance in pixels. Zero means "use the image width".
    pub advance_x: i32,
}

/// A bitmap font laid out at [`Font::base_size`] pixels per line.
pub trait Font {
    /// Line height of the glyph images, in pixels.
    fn base_size(&self) -> usize;

    /// Glyph for `ch`, or `None` when the font lacks it. Missing glyphs fall
    /// back to `'?'`.
    fn glyph(&self, ch: char) -> Option<Glyph<'_>>;

    /// Scale rendered text with nearest-neighbour sampling instead of the
    /// filtered resampler. Pixel fonts want this.
    fn pixelated(&self) -> bool {
        false
    }
}

/// Pen positions of every drawable glyph at base size, and the extent.
struct Layout<'f> {
    placed: Vec<(Glyph<'f>, i32, i32)>,
    width: i32,
    height: i32,
}

fn layout<'f, F: Font + ?Sized>(font: &'f F, text: &str, spacing: f32) -> Layout<'f> {
    let base = to_i32(font.base_size());
    let line_step = base + base / 2;
    let spacing = spacing as i32;
    let (mut pen_x, mut pen_y) = (0i32, 0i32);
    let (mut width, mut height) = (0i32, 0i32);
    let mut placed = Vec::new();

    for ch in text.chars() {
        if ch == '\n' {
            pen_x = 0;
            pen_y = pen_y.saturating_add(line_step);
            continue;
        }
        let Some(glyph) = font.glyph(ch).or_else(|| font.glyph('?')) else {
            debug!("IMAGE: text: no glyph for {ch:?}");
            continue;
        };
        let glyph_w = to_i32(glyph.image.width());
        if ch != ' ' && ch != '\t' {
            let x = pen_x.saturating_add(glyph.offset_x);
            let y = pen_y.saturating_add(glyph.offset_y);
            width = width.max(x.saturating_add(glyph_w));
            height = height.max(y.saturating_add(to_i32(glyph.image.height())));
            placed.push((glyph, x, y));
        }
        let advance = if glyph.advance_x == 0 { glyph_w } else { glyph.advance_x };
        pen_x = pen_x.saturating_add(advance).saturating_add(spacing);
        width = width.max(pen_x.saturating_sub(spacing));
        height = height.max(pen_y.saturating_add(base));
    }
    Layout { placed, width, height }
}

impl Image {
    /// Render `text` into a new RGBA8 image `font_size` pixels per line.
    ///
    /// Glyphs are alpha-blended through `tint` onto a transparent canvas.
    /// `'\n'` starts a new line one and a half base heights down.
    pub fn text_ex<F: Font + ?Sized>(
        font: &F,
        text: &str,
        font_size: f32,
        spacing: f32,
        tint: Color,
    ) -> Result<Image, ImageError> {
        let base = font.base_size();
        if base == 0 || font_size.is_nan() || font_size <= 0.0 {
            warn!("IMAGE: text: font base size {base}, requested size {font_size}");
            return Err(ImageError::InvalidArgument("font sizes must be positive"));
        }
        let Layout { placed, width, height } = layout(font, text, spacing);
        if width <= 0 || height <= 0 {
            warn!("IMAGE: text: {text:?} renders to nothing");
            return Err(ImageError::Empty);
        }

        let mut canvas = Image::gen_color(width as usize, height as usize, Color::BLANK);
        for (glyph, x, y) in placed {
            let (gw, gh) = (glyph.image.width(), glyph.image.height());
            canvas.draw_image(glyph.image, Rect::of_size(gw, gh), Rect::new(x, y, to_i32(gw), to_i32(gh)), tint)?;
        }

        let scale = font_size / base as f32;
        if scale != 1.0 {
            let w = ((width as f32 * scale) as usize).max(1);
            let h = ((height as f32 * scale) as usize).max(1);
            info!("IMAGE: text scaled by factor {scale}");
            if font.pixelated() {
                canvas.resize_nn(w, h)?;
            } else {
                canvas.resize(w, h)?;
            }
        }
        Ok(canvas)
    }

    /// [`Image::text_ex`] with size clamped to at least the font's base size
    /// and one pixel of spacing per base size.
    pub fn text<F: Font + ?Sized>(font: &F, text: &str, font_size: i32, color: Color) -> Result<Image, ImageError> {
        let base = to_i32(font.base_size()).max(1);
        let size = font_size.max(base);
        Image::text_ex(font, text, size as f32, (size / base) as f32, color)
    }

    /// Render `text` and draw it with its top-left corner at `position`.
    pub fn draw_text_ex<F: Font + ?Sized>(
        &mut self,
        font: &F,
        text: &str,
        position: (i32, i32),
        font_size: f32,
        spacing: f32,
        tint: Color,
    ) -> Result<(), ImageError> {
        self.pixel_layout("draw_text")?;
        let rendered = Image::text_ex(font, text, font_size, spacing, tint)?;
        let (w, h) = (to_i32(rendered.width()), to_i32(rendered.height()));
        self.draw_image(&rendered, Rect::new(0, 0, w, h), Rect::new(position.0, position.1, w, h), Color::WHITE)
    }

    /// [`Image::draw_text_ex`] with spacing derived from the size the way
    /// [`Image::text`] does it.
    pub fn draw_text<F: Font + ?Sized>(
        &mut self,
        font: &F,
        text: &str,
        position: (i32, i32),
        font_size: i32,
        color: Color,
    ) -> Result<(), ImageError> {
        let base = to_i32(font.base_size()).max(1);
        self.draw_text_ex(font, text, position, font_size as f32, (font_size / base) as f32, color)
    }
}
