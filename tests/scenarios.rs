//! End-to-end behaviour through the public API only.

use pigment::{
    Color, CompressedFormat, Image, ImageError, PixelFormat, Rect, UncompressedFormat, decode_pixel, encode_pixel,
};

fn gradient(w: usize, h: usize) -> Image {
    let colors: Vec<Color> = (0..w * h)
        .map(|i| Color::new((i * 7) as u8, (i * 13) as u8, (i * 29) as u8, 255))
        .collect();
    Image::from_colors(w, h, &colors).unwrap()
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test_log::test]
fn pure_red_survives_r5g6b5() {
    let red = Color::new(255, 0, 0, 255);
    let mut img = Image::gen_color(4, 4, red);
    img.convert(UncompressedFormat::R5G6B5).unwrap();
    assert_eq!(img.data().len(), 4 * 4 * 2);
    assert!(img.colors().unwrap().iter().all(|&c| c == red));
}

#[test]
fn checkerboard_parity() {
    let img = Image::gen_checked(2, 2, 1, 1, Color::BLACK, Color::WHITE);
    assert_eq!(img.get_color(0, 0).unwrap(), Color::BLACK);
    assert_eq!(img.get_color(1, 0).unwrap(), Color::WHITE);
    assert_eq!(img.get_color(0, 1).unwrap(), Color::WHITE);
    assert_eq!(img.get_color(1, 1).unwrap(), Color::BLACK);
}

#[test]
fn pixel_on_grayscale_stores_luminance() {
    let mut img = Image::new(3, 3, UncompressedFormat::Grayscale);
    img.draw_pixel(1, 1, Color::new(255, 0, 0, 255)).unwrap();
    assert_eq!(img.data()[4], 76);
    assert_eq!(img.data().iter().filter(|&&b| b != 0).count(), 1);
}

#[test_log::test]
fn opaque_blit_is_byte_exact() {
    let src = gradient(2, 2);
    let mut dst = Image::new(2, 2, UncompressedFormat::R8G8B8A8);
    dst.draw_image(&src, Rect::new(0, 0, 2, 2), Rect::new(0, 0, 2, 2), Color::WHITE)
        .unwrap();
    assert_eq!(dst.data(), src.data());
}

#[test]
fn compressed_images_are_refused() {
    let size = pigment::pixel_data_size(8, 8, CompressedFormat::Dxt1Rgb.into());
    let mut img = Image::from_raw_parts(8, 8, 1, CompressedFormat::Dxt1Rgb, vec![0; size]).unwrap();
    let before = img.clone();
    assert!(matches!(img.flip_vertical(), Err(ImageError::Compressed(_))));
    assert!(matches!(img.draw_pixel(0, 0, Color::RED), Err(ImageError::Compressed(_))));
    assert!(matches!(img.convert(UncompressedFormat::R8G8B8A8), Err(ImageError::Compressed(_))));
    assert_eq!(img, before);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn convert_to_same_format_is_noop() {
    for format in UncompressedFormat::ALL {
        let mut img = gradient(5, 3);
        img.convert(format).unwrap();
        let before = img.clone();
        img.convert(format).unwrap();
        assert_eq!(img, before, "{format:?}");
    }
}

#[test]
fn resize_to_same_size_is_identity() {
    let mut img = gradient(7, 5);
    let before = img.clone();
    img.resize(7, 5).unwrap();
    assert_eq!(img, before);
    img.resize_nn(7, 5).unwrap();
    assert_eq!(img, before);
}

#[test]
fn flips_are_involutions() {
    for format in [UncompressedFormat::Grayscale, UncompressedFormat::R8G8B8, UncompressedFormat::R32G32B32A32] {
        let mut img = gradient(5, 4);
        img.convert(format).unwrap();
        let before = img.clone();
        img.flip_horizontal().unwrap();
        assert_ne!(img, before);
        img.flip_horizontal().unwrap();
        img.flip_vertical().unwrap();
        img.flip_vertical().unwrap();
        assert_eq!(img, before, "{format:?}");
    }
}

#[test]
fn four_quarter_turns_restore() {
    let mut img = gradient(5, 3);
    let before = img.clone();
    img.rotate_cw().unwrap();
    assert_eq!((img.width(), img.height()), (3, 5));
    for _ in 0..3 {
        img.rotate_cw().unwrap();
    }
    assert_eq!(img, before);
    img.rotate_ccw().unwrap();
    img.rotate_cw().unwrap();
    assert_eq!(img, before);
}

#[test]
fn crop_keeps_contained_pixels() {
    let src = gradient(8, 6);
    let mut img = src.clone();
    img.crop(Rect::new(2, 1, 4, 3)).unwrap();
    assert_eq!((img.width(), img.height()), (4, 3));
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(img.get_color(x, y).unwrap(), src.get_color(x + 2, y + 1).unwrap());
        }
    }
    assert!(img.clone().crop(Rect::new(10, 10, 2, 2)).is_err());
}

#[test_log::test]
fn mip_chain_of_100_square() {
    let mut img = Image::gen_color(100, 100, Color::ORANGE);
    img.gen_mipmaps().unwrap();
    assert_eq!(img.mipmaps(), 7);
    let sizes: Vec<_> = img.levels().map(|l| (l.width, l.height)).collect();
    assert_eq!(sizes.first(), Some(&(100, 100)));
    assert_eq!(sizes.last(), Some(&(1, 1)));
    assert!(img.is_valid());

    // base-level edits discard the chain
    img.flip_vertical().unwrap();
    assert_eq!(img.mipmaps(), 1);
}

#[test]
fn black_and_white_round_trip_every_format() {
    for format in UncompressedFormat::ALL {
        let mut buf = [0u8; 16];
        for c in [Color::BLACK, Color::WHITE] {
            encode_pixel(&mut buf, c, format);
            assert_eq!(decode_pixel(&buf, format), c, "{format:?}");
        }
    }
}

#[test]
fn eight_bit_formats_keep_channel_values() {
    let c = Color::new(12, 34, 56, 78);
    let mut buf = [0u8; 4];
    encode_pixel(&mut buf, c, UncompressedFormat::R8G8B8A8);
    assert_eq!(decode_pixel(&buf, UncompressedFormat::R8G8B8A8), c);
    encode_pixel(&mut buf, c, UncompressedFormat::R8G8B8);
    assert_eq!(decode_pixel(&buf, UncompressedFormat::R8G8B8), Color::new(12, 34, 56, 255));
}

#[test]
fn data_always_matches_layout() {
    let mut img = gradient(9, 7);
    img.gen_mipmaps().unwrap();
    img.convert(UncompressedFormat::R16G16B16A16).unwrap();
    assert!(img.is_valid());
    img.resize(4, 3).unwrap();
    img.rotate(30.0).unwrap();
    img.blur_gaussian_default(2).unwrap();
    img.to_pot(Color::BLANK).unwrap();
    assert!(img.is_valid());
    assert_eq!(img.format(), PixelFormat::from(UncompressedFormat::R16G16B16A16));
    assert!(img.width().is_power_of_two() && img.height().is_power_of_two());
}
