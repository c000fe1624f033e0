//! Seams for container codecs (PNG, DDS, KTX, ...) and raw byte loading.
//!
//! Codecs live outside the crate. They hand over a [`DecodedImage`], which
//! is validated into an [`Image`] before anything else sees it.

use log::warn;

use crate::error::ImageError;
use crate::format::{PixelFormat, pixel_data_size};
use crate::image::Image;

/// What a decoder produced, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub mipmaps: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, ImageError>;
}

pub trait ImageEncoder {
    fn encode(&self, image: &Image) -> Result<Vec<u8>, ImageError>;
}

impl Image {
    /// Decode `bytes` and check the result against its declared layout.
    pub fn decode_with<D: ImageDecoder + ?Sized>(decoder: &D, bytes: &[u8]) -> Result<Image, ImageError> {
        let DecodedImage { width, height, mipmaps, format, data } = decoder.decode(bytes)?;
        Image::from_raw_parts(width, height, mipmaps, format, data).inspect_err(|e| {
            warn!("IMAGE: decoder returned an inconsistent image: {e}");
        })
    }

    pub fn encode_with<E: ImageEncoder + ?Sized>(&self, encoder: &E) -> Result<Vec<u8>, ImageError> {
        if !self.is_valid() {
            warn!("IMAGE: encode: image is empty or malformed");
            return Err(ImageError::Empty);
        }
        encoder.encode(self)
    }

    /// Headerless pixel data: skip `header_size` bytes, then read one level
    /// of `width` x `height` in `format`. Trailing bytes are ignored.
    pub fn from_raw_bytes(
        bytes: &[u8],
        width: usize,
        height: usize,
        format: impl Into<PixelFormat>,
        header_size: usize,
    ) -> Result<Image, ImageError> {
        let format = format.into();
        let size = pixel_data_size(width, height, format);
        let Some(body) = bytes.get(header_size..header_size.saturating_add(size)) else {
            warn!(
                "IMAGE: raw data holds {} bytes, need {} after a {header_size} byte header",
                bytes.len(),
                size
            );
            return Err(ImageError::DataSize { expected: header_size.saturating_add(size), actual: bytes.len() });
        };
        Image::from_raw_parts(width, height, 1, format, body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, UncompressedFormat};

    /// "Container": 2 bytes width, 2 bytes height, then RGBA8.
    struct TinyCodec;

    impl ImageDecoder for TinyCodec {
        fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, ImageError> {
            let [w0, w1, h0, h1, rest @ ..] = bytes else {
                return Err(ImageError::Backend("truncated header".into()));
            };
            Ok(DecodedImage {
                width: u16::from_le_bytes([*w0, *w1]).into(),
                height: u16::from_le_bytes([*h0, *h1]).into(),
                mipmaps: 1,
                format: UncompressedFormat::R8G8B8A8.into(),
                data: rest.to_vec(),
            })
        }
    }

    impl ImageEncoder for TinyCodec {
        fn encode(&self, image: &Image) -> Result<Vec<u8>, ImageError> {
            let mut rgba = image.clone();
            rgba.convert(UncompressedFormat::R8G8B8A8)?;
            let mut out = Vec::new();
            out.extend_from_slice(&(image.width() as u16).to_le_bytes());
            out.extend_from_slice(&(image.height() as u16).to_le_bytes());
            out.extend_from_slice(rgba.base_level());
            Ok(out)
        }
    }

    #[test]
    fn encode_then_decode() {
        let img = Image::gen_checked(4, 2, 1, 1, Color::RED, Color::BLUE);
        let bytes = img.encode_with(&TinyCodec).unwrap();
        assert_eq!(bytes.len(), 4 + 4 * 2 * 4);
        assert_eq!(Image::decode_with(&TinyCodec, &bytes).unwrap(), img);
    }

    #[test]
    fn inconsistent_decode_rejected() {
        let bytes = [2, 0, 2, 0, 1, 2, 3];
        assert!(matches!(Image::decode_with(&TinyCodec, &bytes), Err(ImageError::DataSize { .. })));
        assert!(matches!(Image::decode_with(&TinyCodec, &[1]), Err(ImageError::Backend(_))));
    }

    #[test]
    fn raw_bytes_skip_header() {
        let bytes = [0xAA, 0xBB, 1, 2, 3, 4, 5, 6, 99];
        let img = Image::from_raw_bytes(&bytes, 2, 1, UncompressedFormat::R8G8B8, 2).unwrap();
        assert_eq!(img.data(), &[1, 2, 3, 4, 5, 6]);
        assert!(Image::from_raw_bytes(&bytes, 3, 1, UncompressedFormat::R8G8B8, 2).is_err());
    }

    #[test]
    fn empty_image_not_encoded() {
        assert!(matches!(Image::default().encode_with(&TinyCodec), Err(ImageError::Empty)));
    }
}
