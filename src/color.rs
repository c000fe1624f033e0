//! Canonical 8-bit RGBA colour and the algebra on it.
//!
//! Every conversion in the crate funnels through [`Color`] or
//! [`NormalizedColor`]. `Color` is `#[repr(C)]` and [`bytemuck::Pod`], so a
//! `&[Color]` is also an RGBA8 byte row.
//!
//! ```rust
//! use pigment::Color;
//!
//! let half_red = Color::new(255, 0, 0, 128);
//! let out = Color::alpha_blend(Color::BLACK, half_red, Color::WHITE);
//! assert_eq!(out.a, 255);
//! assert!(out.r > 120 && out.r < 135);
//! ```

use bytemuck::{Pod, Zeroable};

/// 8 bits per channel, alpha 255 is opaque.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Four channels in `[0, 1]`. The intermediate form for high-precision formats.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct NormalizedColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
///
/// Achromatic colours (greys, black, white) have no hue; `hue` is NaN for
/// them. Check with `hue.is_nan()` rather than comparing against 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Color {
    pub const LIGHTGRAY: Color = Color::new(200, 200, 200, 255);
    pub const GRAY: Color = Color::new(130, 130, 130, 255);
    pub const DARKGRAY: Color = Color::new(80, 80, 80, 255);
    pub const YELLOW: Color = Color::new(253, 249, 0, 255);
    pub const GOLD: Color = Color::new(255, 203, 0, 255);
    pub const ORANGE: Color = Color::new(255, 161, 0, 255);
    pub const PINK: Color = Color::new(255, 109, 194, 255);
    pub const RED: Color = Color::new(230, 41, 55, 255);
    pub const MAROON: Color = Color::new(190, 33, 55, 255);
    pub const GREEN: Color = Color::new(0, 228, 48, 255);
    pub const LIME: Color = Color::new(0, 158, 47, 255);
    pub const DARKGREEN: Color = Color::new(0, 117, 44, 255);
    pub const SKYBLUE: Color = Color::new(102, 191, 255, 255);
    pub const BLUE: Color = Color::new(0, 121, 241, 255);
    pub const DARKBLUE: Color = Color::new(0, 82, 172, 255);
    pub const PURPLE: Color = Color::new(200, 122, 255, 255);
    pub const VIOLET: Color = Color::new(135, 60, 190, 255);
    pub const BROWN: Color = Color::new(127, 106, 79, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const BLANK: Color = Color::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with alpha set to `alpha` in `[0, 1]` (clamped).
    pub fn fade(self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self { a: (255.0 * alpha) as u8, ..self }
    }

    /// Packed `0xRRGGBBAA`.
    #[inline]
    pub const fn to_int(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// From packed `0xRRGGBBAA`.
    #[inline]
    pub const fn from_hex(hex: u32) -> Self {
        let [r, g, b, a] = hex.to_be_bytes();
        Self { r, g, b, a }
    }

    pub fn normalize(self) -> NormalizedColor {
        NormalizedColor {
            r: f32::from(self.r) / 255.0,
            g: f32::from(self.g) / 255.0,
            b: f32::from(self.b) / 255.0,
            a: f32::from(self.a) / 255.0,
        }
    }

    /// Truncating conversion from `[0, 1]` channels.
    pub fn from_normalized(n: NormalizedColor) -> Self {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(c(n.r), c(n.g), c(n.b), c(n.a))
    }

    pub fn to_hsv(self) -> Hsv {
        let n = self.normalize();
        let max = n.r.max(n.g).max(n.b);
        let min = n.r.min(n.g).min(n.b);
        let delta = max - min;

        if delta < 0.00001 {
            return Hsv { hue: f32::NAN, saturation: 0.0, value: max };
        }

        let mut hue = if n.r >= max {
            (n.g - n.b) / delta
        } else if n.g >= max {
            2.0 + (n.b - n.r) / delta
        } else {
            4.0 + (n.r - n.g) / delta
        };
        hue *= 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }

        Hsv { hue, saturation: delta / max, value: max }
    }

    /// Opaque colour from HSV. A NaN hue is read as 0.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let hue = if hue.is_nan() { 0.0 } else { hue };
        let channel = |n: f32| {
            let k = (n + hue / 60.0) % 6.0;
            let k = k.min(4.0 - k).clamp(0.0, 1.0);
            ((value - value * saturation * k) * 255.0) as u8
        };
        Self::new(channel(5.0), channel(3.0), channel(1.0), 255)
    }

    /// Channel-wise multiply by `tint`, truncating.
    pub fn tint(self, tint: Color) -> Self {
        let mul = |c: u8, t: u8| ((f32::from(c) / 255.0 * (f32::from(t) / 255.0)) * 255.0) as u8;
        Self::new(
            mul(self.r, tint.r),
            mul(self.g, tint.g),
            mul(self.b, tint.b),
            mul(self.a, tint.a),
        )
    }

    /// `factor` in `[-1, 1]`: negative darkens toward black, positive
    /// lightens toward white. Alpha unchanged.
    pub fn brightness(self, factor: f32) -> Self {
        let factor = factor.clamp(-1.0, 1.0);
        let adjust = |c: u8| {
            let c = f32::from(c);
            if factor < 0.0 {
                (c * (1.0 + factor)) as u8
            } else {
                ((255.0 - c) * factor + c) as u8
            }
        };
        Self { r: adjust(self.r), g: adjust(self.g), b: adjust(self.b), a: self.a }
    }

    /// `factor` in `[-1, 1]`; pivots each channel around mid-grey by
    /// `(1 + factor)^2`.
    pub fn contrast(self, factor: f32) -> Self {
        let k = (1.0 + factor.clamp(-1.0, 1.0)).powi(2);
        let adjust = |c: u8| (((f32::from(c) / 255.0 - 0.5) * k + 0.5) * 255.0).clamp(0.0, 255.0) as u8;
        Self { r: adjust(self.r), g: adjust(self.g), b: adjust(self.b), a: self.a }
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| ((1.0 - t) * f32::from(a) + t * f32::from(b)) as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Composite `src` over `dst` after tinting `src` by `tint`.
    ///
    /// Integer arithmetic only: tint is `(s * (t + 1)) >> 8`, fully
    /// transparent and fully opaque sources short-circuit, otherwise both the
    /// output alpha and the colour channels use `src.a + 1` as weight.
    pub fn alpha_blend(dst: Color, src: Color, tint: Color) -> Color {
        let t = |s: u8, t: u8| ((u32::from(s) * (u32::from(t) + 1)) >> 8) as u8;
        let src = Color::new(t(src.r, tint.r), t(src.g, tint.g), t(src.b, tint.b), t(src.a, tint.a));

        match src.a {
            0 => dst,
            255 => src,
            a => {
                let alpha = u32::from(a) + 1;
                let dst_a = u32::from(dst.a);
                let out_a = (alpha * 256 + dst_a * (256 - alpha)) >> 8;
                let mix = |s: u8, d: u8| {
                    (((u32::from(s) * alpha * 256 + u32::from(d) * dst_a * (256 - alpha)) / out_a) >> 8)
                        .min(255) as u8
                };
                Color::new(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), out_a as u8)
            }
        }
    }

    /// Rec.601 luma of the colour, in `[0, 1]`.
    #[inline]
    pub(crate) fn luminance(self) -> f32 {
        self.normalize().luminance()
    }
}

impl NormalizedColor {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub(crate) fn luminance(self) -> f32 {
        self.r * 0.299 + self.g * 0.587 + self.b * 0.114
    }
}

impl From<Color> for NormalizedColor {
    fn from(c: Color) -> Self {
        c.normalize()
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Color::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Color::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_int(), 0x1234_5678);
        assert_eq!(Color::from_hex(0x1234_5678), c);
    }

    #[test]
    fn blend_boundaries() {
        let dst = Color::new(10, 20, 30, 200);
        let src = Color::new(200, 100, 50, 0);
        assert_eq!(Color::alpha_blend(dst, src, Color::WHITE), dst);

        let opaque = Color::new(200, 100, 50, 255);
        assert_eq!(Color::alpha_blend(dst, opaque, Color::WHITE), opaque);
    }

    #[test]
    fn blend_half_over_opaque() {
        let out = Color::alpha_blend(Color::BLACK, Color::new(255, 255, 255, 127), Color::WHITE);
        assert_eq!(out.a, 255);
        // weight 128/256 of white over black
        assert_eq!(out.r, 128);
    }

    #[test]
    fn blend_tint_scales_source() {
        let out = Color::alpha_blend(Color::BLACK, Color::WHITE, Color::new(127, 255, 255, 255));
        assert_eq!(out, Color::new(127, 255, 255, 255));
    }

    #[test]
    fn hsv_primary_and_achromatic() {
        let hsv = Color::new(255, 0, 0, 255).to_hsv();
        assert_eq!(hsv.hue, 0.0);
        assert_eq!(hsv.saturation, 1.0);
        assert_eq!(hsv.value, 1.0);

        let blue = Color::new(0, 0, 255, 255).to_hsv();
        assert!((blue.hue - 240.0).abs() < 1e-3);

        let grey = Color::new(90, 90, 90, 255).to_hsv();
        assert!(grey.hue.is_nan());
        assert_eq!(grey.saturation, 0.0);

        assert!(Color::BLACK.to_hsv().hue.is_nan());
    }

    #[test]
    fn hsv_round_trip_primaries() {
        for c in [
            Color::new(255, 0, 0, 255),
            Color::new(0, 255, 0, 255),
            Color::new(0, 0, 255, 255),
            Color::new(255, 255, 0, 255),
            Color::WHITE,
            Color::BLACK,
        ] {
            let hsv = c.to_hsv();
            assert_eq!(Color::from_hsv(hsv.hue, hsv.saturation, hsv.value), c, "{c:?}");
        }
    }

    #[test]
    fn brightness_and_contrast() {
        let c = Color::new(100, 200, 0, 42);
        assert_eq!(c.brightness(0.0), c);
        assert_eq!(c.brightness(-1.0), Color::new(0, 0, 0, 42));
        assert_eq!(c.brightness(1.0), Color::new(255, 255, 255, 42));
        assert_eq!(c.contrast(-1.0), Color::new(127, 127, 127, 42));
    }

    #[test]
    fn fade_and_lerp() {
        assert_eq!(Color::RED.fade(0.5).a, 127);
        assert_eq!(Color::RED.fade(2.0).a, 255);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.5).r, 127);
    }

    #[test]
    fn tint_truncates() {
        assert_eq!(Color::WHITE.tint(Color::MAGENTA), Color::MAGENTA);
        assert_eq!(Color::new(255, 255, 255, 255).tint(Color::BLANK), Color::BLANK);
    }
}
