//! Interop with [`rgb`] crate pixel types.
//!
//! [`Color`] and `Rgba<u8>` share a layout, so slices convert for free.
//!
//! ```rust
//! use pigment::{Color, Image, typed};
//! use rgb::Rgba;
//!
//! let pixels = vec![Rgba::new(255u8, 0, 128, 255); 4];
//! let img = Image::from_rgba_pixels(2, 2, &pixels).unwrap();
//! assert_eq!(img.get_color(1, 1).unwrap(), Color::new(255, 0, 128, 255));
//! assert_eq!(typed::as_rgba(&img.colors().unwrap()), pixels.as_slice());
//! ```

use rgb::{Gray, GrayAlpha, Rgb, Rgba};

use crate::color::Color;
use crate::error::ImageError;
use crate::format::UncompressedFormat;
use crate::image::Image;

impl From<Color> for Rgba<u8> {
    #[inline]
    fn from(c: Color) -> Self {
        Rgba::new(c.r, c.g, c.b, c.a)
    }
}

impl From<Rgba<u8>> for Color {
    #[inline]
    fn from(p: Rgba<u8>) -> Self {
        Color::new(p.r, p.g, p.b, p.a)
    }
}

/// Opaque.
impl From<Rgb<u8>> for Color {
    #[inline]
    fn from(p: Rgb<u8>) -> Self {
        Color::new(p.r, p.g, p.b, 255)
    }
}

/// Reinterpret colours as `Rgba<u8>` without copying.
pub fn as_rgba(colors: &[Color]) -> &[Rgba<u8>] {
    bytemuck::cast_slice(colors)
}

/// Reinterpret `Rgba<u8>` pixels as colours without copying.
pub fn as_colors(pixels: &[Rgba<u8>]) -> &[Color] {
    bytemuck::cast_slice(pixels)
}

impl Image {
    pub fn from_rgba_pixels(width: usize, height: usize, pixels: &[Rgba<u8>]) -> Result<Image, ImageError> {
        Image::from_colors(width, height, as_colors(pixels))
    }

    pub fn from_rgb_pixels(width: usize, height: usize, pixels: &[Rgb<u8>]) -> Result<Image, ImageError> {
        let data = bytemuck::cast_slice::<Rgb<u8>, u8>(pixels).to_vec();
        Image::from_raw_parts(width, height, 1, UncompressedFormat::R8G8B8, data)
    }

    pub fn from_gray_pixels(width: usize, height: usize, pixels: &[Gray<u8>]) -> Result<Image, ImageError> {
        let data = bytemuck::cast_slice::<Gray<u8>, u8>(pixels).to_vec();
        Image::from_raw_parts(width, height, 1, UncompressedFormat::Grayscale, data)
    }

    pub fn from_gray_alpha_pixels(width: usize, height: usize, pixels: &[GrayAlpha<u8>]) -> Result<Image, ImageError> {
        let data = bytemuck::cast_slice::<GrayAlpha<u8>, u8>(pixels).to_vec();
        Image::from_raw_parts(width, height, 1, UncompressedFormat::GrayAlpha, data)
    }

    /// Base level decoded to `Rgba<u8>`, whatever the stored layout.
    pub fn to_rgba_pixels(&self) -> Result<Vec<Rgba<u8>>, ImageError> {
        Ok(bytemuck::allocation::cast_vec(self.colors()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_conversions() {
        let c = Color::new(1, 2, 3, 4);
        let p: Rgba<u8> = c.into();
        assert_eq!(p, Rgba::new(1, 2, 3, 4));
        assert_eq!(Color::from(p), c);
        assert_eq!(Color::from(Rgb::new(9u8, 8, 7)), Color::new(9, 8, 7, 255));
    }

    #[test]
    fn typed_constructors_pick_layout() {
        let rgb = Image::from_rgb_pixels(2, 1, &[Rgb::new(1u8, 2, 3), Rgb::new(4, 5, 6)]).unwrap();
        assert_eq!(rgb.format(), UncompressedFormat::R8G8B8.into());
        assert_eq!(rgb.data(), &[1, 2, 3, 4, 5, 6]);

        let gray = Image::from_gray_pixels(1, 1, &[Gray::new(100u8)]).unwrap();
        assert_eq!(gray.to_rgba_pixels().unwrap(), vec![Rgba::new(100, 100, 100, 255)]);

        let ga = Image::from_gray_alpha_pixels(1, 1, &[GrayAlpha::new(100u8, 50)]).unwrap();
        assert_eq!(ga.to_rgba_pixels().unwrap(), vec![Rgba::new(100, 100, 100, 50)]);
    }

    #[test]
    fn pixel_count_checked() {
        assert!(Image::from_rgb_pixels(2, 2, &[Rgb::new(0u8, 0, 0)]).is_err());
        assert!(Image::from_rgba_pixels(1, 2, &[Rgba::new(0u8, 0, 0, 0)]).is_err());
    }
}
