//! # pigment
//!
//! *Every pixel, any format.*
//!
//! CPU-side images in a dozen uncompressed layouts (8-bit grayscale up to
//! 32-bit float RGBA, packed 16-bit formats included) plus opaque
//! block-compressed payloads, and the algorithms that work on them:
//! format conversion and dithering, resampling, rotation, blur and
//! convolution, alpha compositing, rasterization, text from injected fonts,
//! and procedural generation.
//!
//! ```rust
//! use pigment::{Color, Image, Rect, UncompressedFormat};
//!
//! let mut img = Image::gen_gradient_vertical(64, 64, Color::SKYBLUE, Color::DARKBLUE);
//! img.draw_circle((32, 32), 10, Color::GOLD).unwrap();
//! img.resize(32, 32).unwrap();
//! img.crop(Rect::new(8, 8, 16, 16)).unwrap();
//! img.convert(UncompressedFormat::R5G6B5).unwrap();
//! img.gen_mipmaps().unwrap();
//!
//! assert_eq!(img.mipmaps(), 5);
//! assert!(img.is_valid());
//! ```
//!
//! ## Errors
//!
//! Every operation that can refuse its input returns [`ImageError`] and
//! leaves the image untouched. Refusals and lossy paths are also reported
//! through the [`log`] facade.
//!
//! ## Row kernels
//!
//! [`bytes`] holds the SIMD-dispatched byte-row operations the image code is
//! built on (channel expansion, alpha stripping, premultiply, invert). They
//! pick AVX2 or NEON at runtime and fall back to scalar code.
//!
//! ## Feature flags
//!
//! - **`rgb`**: conversions to and from [`rgb`] pixel types.
//! - **`imgref`**: [`imgref`] views of RGBA8 images. Implies `rgb`.

#![forbid(unsafe_code)]

mod adapter;
pub mod bytes;
mod codec;
mod color;
mod convert;
mod draw;
mod error;
mod filter;
mod format;
mod generate;
mod geometry;
mod half_float;
mod image;
pub mod noise;
mod text;
mod texture;
mod transform;

pub use adapter::{DecodedImage, ImageDecoder, ImageEncoder};
pub use codec::{R5G5B5A1_ALPHA_THRESHOLD, decode_normalized, decode_pixel, encode_normalized, encode_pixel};
pub use color::{Color, Hsv, NormalizedColor};
pub use convert::DitherTarget;
pub use draw::{NPatchInfo, NPatchLayout};
pub use error::{ImageError, SizeError};
pub use filter::GAUSSIAN_BLUR_ITERATIONS;
pub use format::{CompressedFormat, PixelFormat, UncompressedFormat, mip_chain_size, pixel_data_size};
pub use geometry::{Rect, Vec2};
pub use half_float::{f32_to_half, half_to_f32};
pub use image::{Image, MipLevel};
pub use noise::{NoiseSource, Perlin};
pub use text::{Font, Glyph};
pub use texture::{Texture, TextureBackend};

#[cfg(feature = "rgb")]
pub mod typed;

#[cfg(feature = "imgref")]
pub mod img;
