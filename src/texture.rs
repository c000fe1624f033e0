//! The narrow interface between CPU images and a GPU.
//!
//! A [`TextureBackend`] moves bytes to and from device memory; the crate
//! never talks to a graphics API itself. Backends keep their own handle type.

use log::{info, warn};

use crate::error::ImageError;
use crate::format::{PixelFormat, pixel_data_size};
use crate::image::Image;

/// Uploads pixel data and reads it back.
pub trait TextureBackend {
    type Handle;

    /// Create a texture holding `data`, which is the full mip chain laid out
    /// as [`Image::data`] describes.
    fn upload(
        &mut self,
        width: usize,
        height: usize,
        mipmaps: usize,
        format: PixelFormat,
        data: &[u8],
    ) -> Result<Self::Handle, ImageError>;

    /// Read back the base level of `texture`.
    fn read_back(&mut self, texture: &Texture<Self::Handle>) -> Result<Vec<u8>, ImageError>;
}

/// A device texture and the layout it was created with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture<H> {
    pub handle: H,
    pub width: usize,
    pub height: usize,
    pub mipmaps: usize,
    pub format: PixelFormat,
}

impl Image {
    /// Upload every level of this image.
    pub fn upload<B: TextureBackend>(&self, backend: &mut B) -> Result<Texture<B::Handle>, ImageError> {
        if !self.is_valid() {
            warn!("TEXTURE: upload: image is empty or malformed");
            return Err(ImageError::Empty);
        }
        let handle = backend.upload(self.width, self.height, self.mipmaps, self.format, &self.data)?;
        info!(
            "TEXTURE: uploaded {}x{} {} with {} mip levels",
            self.width, self.height, self.format, self.mipmaps
        );
        Ok(Texture { handle, width: self.width, height: self.height, mipmaps: self.mipmaps, format: self.format })
    }

    /// Copy a texture's base level back into a single-level image.
    pub fn from_texture<B: TextureBackend>(backend: &mut B, texture: &Texture<B::Handle>) -> Result<Image, ImageError> {
        if texture.format.is_compressed() {
            warn!("TEXTURE: read back of compressed format {} not supported", texture.format);
            return Err(ImageError::Compressed(texture.format));
        }
        let data = backend.read_back(texture)?;
        let expected = pixel_data_size(texture.width, texture.height, texture.format);
        if data.len() != expected {
            warn!("TEXTURE: read back {} bytes, expected {expected}", data.len());
            return Err(ImageError::DataSize { expected, actual: data.len() });
        }
        Image::from_raw_parts(texture.width, texture.height, 1, texture.format, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, CompressedFormat, UncompressedFormat};

    /// Keeps uploads in a vector; handles are indices.
    #[derive(Default)]
    struct MemoryBackend {
        textures: Vec<Vec<u8>>,
        truncate_reads: bool,
    }

    impl TextureBackend for MemoryBackend {
        type Handle = usize;

        fn upload(
            &mut self,
            width: usize,
            height: usize,
            _mipmaps: usize,
            format: PixelFormat,
            data: &[u8],
        ) -> Result<usize, ImageError> {
            let base = pixel_data_size(width, height, format);
            self.textures.push(data[..base].to_vec());
            Ok(self.textures.len() - 1)
        }

        fn read_back(&mut self, texture: &Texture<usize>) -> Result<Vec<u8>, ImageError> {
            let mut data = self
                .textures
                .get(texture.handle)
                .cloned()
                .ok_or_else(|| ImageError::Backend(format!("no texture {}", texture.handle)))?;
            if self.truncate_reads {
                data.pop();
            }
            Ok(data)
        }
    }

    #[test]
    fn round_trip_through_backend() {
        let mut img = Image::gen_color(4, 4, Color::SKYBLUE);
        img.gen_mipmaps().unwrap();
        let mut backend = MemoryBackend::default();
        let tex = img.upload(&mut backend).unwrap();
        assert_eq!((tex.width, tex.height, tex.mipmaps), (4, 4, 3));

        let back = Image::from_texture(&mut backend, &tex).unwrap();
        assert_eq!(back.mipmaps(), 1);
        assert_eq!(back.data(), img.base_level());
    }

    #[test]
    fn empty_image_not_uploaded() {
        let mut backend = MemoryBackend::default();
        assert!(matches!(Image::default().upload(&mut backend), Err(ImageError::Empty)));
        assert!(backend.textures.is_empty());
    }

    #[test]
    fn read_back_errors() {
        let mut backend = MemoryBackend::default();
        let missing = Texture { handle: 9, width: 1, height: 1, mipmaps: 1, format: UncompressedFormat::Grayscale.into() };
        assert!(matches!(Image::from_texture(&mut backend, &missing), Err(ImageError::Backend(_))));

        let compressed = Texture { format: CompressedFormat::Dxt5Rgba.into(), ..missing.clone() };
        assert!(matches!(Image::from_texture(&mut backend, &compressed), Err(ImageError::Compressed(_))));

        let tex = Image::gen_color(2, 2, Color::RED).upload(&mut backend).unwrap();
        backend.truncate_reads = true;
        assert!(matches!(Image::from_texture(&mut backend, &tex), Err(ImageError::DataSize { .. })));
    }
}
