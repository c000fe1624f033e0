//! Interop with [`imgref`] image views.
//!
//! ```rust
//! use imgref::ImgVec;
//! use pigment::{Color, Image};
//! use rgb::Rgba;
//!
//! let src = ImgVec::new(vec![Rgba::new(10u8, 20, 30, 255); 6], 3, 2);
//! let img = Image::from_imgref(src.as_ref()).unwrap();
//! let view = img.as_imgref().unwrap();
//! assert_eq!((view.width(), view.height()), (3, 2));
//! assert_eq!(img.to_imgvec().unwrap().buf()[5], Rgba::new(10, 20, 30, 255));
//! ```

use imgref::{ImgRef, ImgVec};
use log::warn;
use rgb::Rgba;

use crate::color::Color;
use crate::error::ImageError;
use crate::format::{PixelFormat, UncompressedFormat};
use crate::image::Image;

impl Image {
    /// Borrow the base level as an `ImgRef`. Only RGBA8 images can be viewed
    /// without decoding; use [`Image::to_imgvec`] for the rest.
    pub fn as_imgref(&self) -> Result<ImgRef<'_, Rgba<u8>>, ImageError> {
        self.pixel_layout("as_imgref")?;
        if self.format != PixelFormat::Uncompressed(UncompressedFormat::R8G8B8A8) {
            warn!("IMAGE: as_imgref: {} needs decoding, not viewable in place", self.format);
            return Err(ImageError::InvalidArgument("only RGBA8 images can be borrowed as ImgRef"));
        }
        let pixels: &[Rgba<u8>] = bytemuck::cast_slice(self.base_level());
        Ok(ImgRef::new(pixels, self.width, self.height))
    }

    /// Base level decoded into an owned RGBA8 `ImgVec`.
    pub fn to_imgvec(&self) -> Result<ImgVec<Rgba<u8>>, ImageError> {
        let pixels: Vec<Rgba<u8>> = bytemuck::allocation::cast_vec(self.colors()?);
        Ok(ImgVec::new(pixels, self.width, self.height))
    }

    /// Copy a possibly strided view into a new RGBA8 image.
    pub fn from_imgref(view: ImgRef<'_, Rgba<u8>>) -> Result<Image, ImageError> {
        let mut colors: Vec<Color> = Vec::with_capacity(view.width() * view.height());
        for row in view.rows() {
            colors.extend_from_slice(bytemuck::cast_slice(row));
        }
        Image::from_colors(view.width(), view.height(), &colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_view_is_compacted() {
        // 2x2 image in a buffer with stride 3
        let buf = vec![
            Rgba::new(1u8, 0, 0, 255),
            Rgba::new(2, 0, 0, 255),
            Rgba::new(99, 99, 99, 99),
            Rgba::new(3, 0, 0, 255),
            Rgba::new(4, 0, 0, 255),
        ];
        let view = ImgRef::new_stride(&buf, 2, 2, 3);
        let img = Image::from_imgref(view).unwrap();
        let reds: Vec<u8> = img.colors().unwrap().iter().map(|c| c.r).collect();
        assert_eq!(reds, vec![1, 2, 3, 4]);
    }

    #[test]
    fn only_rgba8_borrows() {
        let mut img = Image::gen_color(2, 2, Color::RED);
        assert!(img.as_imgref().is_ok());
        img.convert(UncompressedFormat::R8G8B8).unwrap();
        assert!(img.as_imgref().is_err());
        let owned = img.to_imgvec().unwrap();
        assert_eq!(owned.buf()[0], Rgba::new(230, 41, 55, 255));
    }
}
