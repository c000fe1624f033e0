//! Per-pixel decode/encode between stored bytes and [`Color`].
//!
//! Packed 16-bit fields decode by truncating integer scaling (`v * 255 / 31`)
//! and encode by rounding (`round(c / 255 * 31)`). 8-bit targets fed from
//! normalized floats round to nearest. Luminance-only targets store
//! `0.299 R + 0.587 G + 0.114 B`. Multi-byte values use native byte order,
//! matching what a GPU upload expects.

use crate::color::{Color, NormalizedColor};
use crate::format::UncompressedFormat;
use crate::half_float::{f32_to_half, half_to_f32};

/// Alpha above this 8-bit value sets the single alpha bit of R5G5B5A1.
pub const R5G5B5A1_ALPHA_THRESHOLD: u8 = 50;

#[inline]
fn read_u16(b: &[u8]) -> u16 {
    u16::from_ne_bytes([b[0], b[1]])
}

#[inline]
fn write_u16(b: &mut [u8], v: u16) {
    b[..2].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn read_f32(b: &[u8], i: usize) -> f32 {
    f32::from_ne_bytes([b[i * 4], b[i * 4 + 1], b[i * 4 + 2], b[i * 4 + 3]])
}

#[inline]
fn write_f32(b: &mut [u8], i: usize, v: f32) {
    b[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn read_half(b: &[u8], i: usize) -> f32 {
    half_to_f32(u16::from_ne_bytes([b[i * 2], b[i * 2 + 1]]))
}

#[inline]
fn write_half(b: &mut [u8], i: usize, v: f32) {
    b[i * 2..i * 2 + 2].copy_from_slice(&f32_to_half(v).to_ne_bytes());
}

/// `[0, 1]` to 8 bits, rounding.
#[inline]
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `[0, 1]` to an `n`-level field, rounding.
#[inline]
fn unit_to_bits(v: f32, max: f32) -> u16 {
    (v.clamp(0.0, 1.0) * max).round() as u16
}

#[inline]
fn scale_down(v: u16, max: u16) -> u8 {
    (u32::from(v) * 255 / u32::from(max)) as u8
}

/// Decode one pixel. `src` must hold at least `format.bytes_per_pixel()` bytes.
pub fn decode_pixel(src: &[u8], format: UncompressedFormat) -> Color {
    use UncompressedFormat::*;
    match format {
        Grayscale => Color::new(src[0], src[0], src[0], 255),
        GrayAlpha => Color::new(src[0], src[0], src[0], src[1]),
        R5G6B5 => {
            let p = read_u16(src);
            Color::new(
                scale_down(p >> 11, 31),
                scale_down((p >> 5) & 0x3F, 63),
                scale_down(p & 0x1F, 31),
                255,
            )
        }
        R5G5B5A1 => {
            let p = read_u16(src);
            Color::new(
                scale_down(p >> 11, 31),
                scale_down((p >> 6) & 0x1F, 31),
                scale_down((p >> 1) & 0x1F, 31),
                if p & 1 == 1 { 255 } else { 0 },
            )
        }
        R4G4B4A4 => {
            let p = read_u16(src);
            Color::new(
                scale_down(p >> 12, 15),
                scale_down((p >> 8) & 0xF, 15),
                scale_down((p >> 4) & 0xF, 15),
                scale_down(p & 0xF, 15),
            )
        }
        R8G8B8 => Color::new(src[0], src[1], src[2], 255),
        R8G8B8A8 => Color::new(src[0], src[1], src[2], src[3]),
        R32 | R32G32B32 | R32G32B32A32 | R16 | R16G16B16 | R16G16B16A16 => {
            let n = decode_normalized(src, format);
            Color::new(unit_to_u8(n.r), unit_to_u8(n.g), unit_to_u8(n.b), unit_to_u8(n.a))
        }
    }
}

/// Decode one pixel to `[0, 1]` floats without going through 8 bits.
pub fn decode_normalized(src: &[u8], format: UncompressedFormat) -> NormalizedColor {
    use UncompressedFormat::*;
    match format {
        R32 => {
            let v = read_f32(src, 0);
            NormalizedColor::new(v, v, v, 1.0)
        }
        R32G32B32 => NormalizedColor::new(read_f32(src, 0), read_f32(src, 1), read_f32(src, 2), 1.0),
        R32G32B32A32 => NormalizedColor::new(
            read_f32(src, 0),
            read_f32(src, 1),
            read_f32(src, 2),
            read_f32(src, 3),
        ),
        R16 => {
            let v = read_half(src, 0);
            NormalizedColor::new(v, v, v, 1.0)
        }
        R16G16B16 => {
            NormalizedColor::new(read_half(src, 0), read_half(src, 1), read_half(src, 2), 1.0)
        }
        R16G16B16A16 => NormalizedColor::new(
            read_half(src, 0),
            read_half(src, 1),
            read_half(src, 2),
            read_half(src, 3),
        ),
        R5G6B5 => {
            let p = read_u16(src);
            NormalizedColor::new(
                f32::from(p >> 11) / 31.0,
                f32::from((p >> 5) & 0x3F) / 63.0,
                f32::from(p & 0x1F) / 31.0,
                1.0,
            )
        }
        R5G5B5A1 => {
            let p = read_u16(src);
            NormalizedColor::new(
                f32::from(p >> 11) / 31.0,
                f32::from((p >> 6) & 0x1F) / 31.0,
                f32::from((p >> 1) & 0x1F) / 31.0,
                f32::from(p & 1),
            )
        }
        R4G4B4A4 => {
            let p = read_u16(src);
            NormalizedColor::new(
                f32::from(p >> 12) / 15.0,
                f32::from((p >> 8) & 0xF) / 15.0,
                f32::from((p >> 4) & 0xF) / 15.0,
                f32::from(p & 0xF) / 15.0,
            )
        }
        Grayscale | GrayAlpha | R8G8B8 | R8G8B8A8 => decode_pixel(src, format).normalize(),
    }
}

/// Encode one pixel. `dst` must hold at least `format.bytes_per_pixel()` bytes.
pub fn encode_pixel(dst: &mut [u8], color: Color, format: UncompressedFormat) {
    use UncompressedFormat::*;
    match format {
        R8G8B8 => dst[..3].copy_from_slice(&[color.r, color.g, color.b]),
        R8G8B8A8 => dst[..4].copy_from_slice(&[color.r, color.g, color.b, color.a]),
        R5G5B5A1 => {
            let n = color.normalize();
            let p = (unit_to_bits(n.r, 31.0) << 11)
                | (unit_to_bits(n.g, 31.0) << 6)
                | (unit_to_bits(n.b, 31.0) << 1)
                | u16::from(color.a > R5G5B5A1_ALPHA_THRESHOLD);
            write_u16(dst, p);
        }
        _ => encode_normalized(dst, color.normalize(), format),
    }
}

/// Encode one pixel from `[0, 1]` floats. Float formats store the values
/// unclamped.
pub fn encode_normalized(dst: &mut [u8], n: NormalizedColor, format: UncompressedFormat) {
    use UncompressedFormat::*;
    match format {
        Grayscale => dst[0] = unit_to_u8(n.luminance()),
        GrayAlpha => {
            dst[0] = unit_to_u8(n.luminance());
            dst[1] = unit_to_u8(n.a);
        }
        R5G6B5 => write_u16(
            dst,
            (unit_to_bits(n.r, 31.0) << 11) | (unit_to_bits(n.g, 63.0) << 5) | unit_to_bits(n.b, 31.0),
        ),
        R5G5B5A1 => write_u16(
            dst,
            (unit_to_bits(n.r, 31.0) << 11)
                | (unit_to_bits(n.g, 31.0) << 6)
                | (unit_to_bits(n.b, 31.0) << 1)
                | u16::from(n.a > f32::from(R5G5B5A1_ALPHA_THRESHOLD) / 255.0),
        ),
        R4G4B4A4 => write_u16(
            dst,
            (unit_to_bits(n.r, 15.0) << 12)
                | (unit_to_bits(n.g, 15.0) << 8)
                | (unit_to_bits(n.b, 15.0) << 4)
                | unit_to_bits(n.a, 15.0),
        ),
        R8G8B8 => dst[..3].copy_from_slice(&[unit_to_u8(n.r), unit_to_u8(n.g), unit_to_u8(n.b)]),
        R8G8B8A8 => dst[..4].copy_from_slice(&[
            unit_to_u8(n.r),
            unit_to_u8(n.g),
            unit_to_u8(n.b),
            unit_to_u8(n.a),
        ]),
        R32 => write_f32(dst, 0, n.luminance()),
        R32G32B32 => {
            write_f32(dst, 0, n.r);
            write_f32(dst, 1, n.g);
            write_f32(dst, 2, n.b);
        }
        R32G32B32A32 => {
            write_f32(dst, 0, n.r);
            write_f32(dst, 1, n.g);
            write_f32(dst, 2, n.b);
            write_f32(dst, 3, n.a);
        }
        R16 => write_half(dst, 0, n.luminance()),
        R16G16B16 => {
            write_half(dst, 0, n.r);
            write_half(dst, 1, n.g);
            write_half(dst, 2, n.b);
        }
        R16G16B16A16 => {
            write_half(dst, 0, n.r);
            write_half(dst, 1, n.g);
            write_half(dst, 2, n.b);
            write_half(dst, 3, n.a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use UncompressedFormat::*;

    fn round_trip(c: Color, f: UncompressedFormat) -> Color {
        let mut buf = [0u8; 16];
        encode_pixel(&mut buf, c, f);
        decode_pixel(&buf, f)
    }

    #[test]
    fn rgb565_extremes_exact() {
        for c in [Color::WHITE, Color::BLACK, Color::new(255, 0, 255, 255)] {
            assert_eq!(round_trip(c, R5G6B5), c);
        }
    }

    #[test]
    fn packed_round_trip_within_quantization() {
        let bounds = [(R5G6B5, 8), (R5G5B5A1, 8), (R4G4B4A4, 17)];
        for (f, bound) in bounds {
            for v in (0..=255u8).step_by(3) {
                let c = Color::new(v, 255 - v, v / 2, 255);
                let out = round_trip(c, f);
                for (a, b) in [(c.r, out.r), (c.g, out.g), (c.b, out.b)] {
                    assert!(a.abs_diff(b) <= bound, "{f:?} {c:?} -> {out:?}");
                }
            }
        }
    }

    #[test]
    fn exact_formats_round_trip() {
        for f in [R8G8B8A8, R32G32B32A32, R16G16B16A16] {
            for v in 0..=255u8 {
                let c = Color::new(v, v.wrapping_mul(7), 255 - v, v.wrapping_add(13));
                assert_eq!(round_trip(c, f), c, "{f:?}");
            }
        }
        for v in 0..=255u8 {
            let c = Color::new(v, 255 - v, v / 3, 255);
            assert_eq!(round_trip(c, R8G8B8), c);
            assert_eq!(round_trip(c, R32G32B32), c);
            assert_eq!(round_trip(c, R16G16B16), c);
        }
    }

    #[test]
    fn one_bit_alpha_threshold() {
        let mut buf = [0u8; 2];
        encode_pixel(&mut buf, Color::new(0, 0, 0, 50), R5G5B5A1);
        assert_eq!(decode_pixel(&buf, R5G5B5A1).a, 0);
        encode_pixel(&mut buf, Color::new(0, 0, 0, 51), R5G5B5A1);
        assert_eq!(decode_pixel(&buf, R5G5B5A1).a, 255);
    }

    #[test]
    fn grayscale_uses_luminance() {
        let mut buf = [0u8; 4];
        encode_pixel(&mut buf, Color::new(255, 0, 0, 255), Grayscale);
        assert_eq!(buf[0], 76);
        assert_eq!(decode_pixel(&buf, Grayscale), Color::new(76, 76, 76, 255));

        encode_pixel(&mut buf, Color::WHITE, R32);
        assert!((f32::from_ne_bytes(buf) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_is_lossless_for_floats() {
        let n = NormalizedColor::new(0.123, 0.456, 0.789, 0.5);
        let mut buf = [0u8; 16];
        encode_normalized(&mut buf, n, R32G32B32A32);
        assert_eq!(decode_normalized(&buf, R32G32B32A32), n);
    }

    #[test]
    fn packed_decode_truncates() {
        // 5-bit 30 -> 30 * 255 / 31 = 246.77
        let p: u16 = 30 << 11;
        assert_eq!(decode_pixel(&p.to_ne_bytes(), R5G6B5).r, 246);
    }
}
