//! IEEE-754 binary16 conversion by bit manipulation.
//!
//! Normal values rebias the exponent by 112 (127 - 15) and shift the mantissa
//! by 13. Subnormal halves are renormalized through their leading-zero count.
//! Encoding rounds to nearest, ties to even.

/// Decode a binary16 bit pattern. Exact for every finite value.
pub fn half_to_f32(h: u16) -> f32 {
    let h = u32::from(h);
    let sign = (h & 0x8000) << 16;
    let exp = (h & 0x7C00) >> 10;
    let man = h & 0x03FF;

    let bits = match (exp, man) {
        (0, 0) => sign,
        (0, m) => {
            // top set bit p of m gives value 1.f * 2^(p - 24)
            let p = 31 - m.leading_zeros();
            sign | ((p + 103) << 23) | ((m << (23 - p)) & 0x007F_FFFF)
        }
        (0x1F, m) => sign | 0x7F80_0000 | (m << 13),
        (e, m) => sign | ((e + 112) << 23) | (m << 13),
    };
    f32::from_bits(bits)
}

/// Encode to binary16, rounding to nearest even. Out-of-range values saturate
/// to infinity, tiny values flush through the subnormal range to zero.
pub fn f32_to_half(x: f32) -> u16 {
    let bits = x.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let man = bits & 0x007F_FFFF;

    if exp == 0xFF {
        let nan = if man != 0 { 0x0200 | (man >> 13) as u16 } else { 0 };
        return sign | 0x7C00 | nan;
    }

    let half_exp = exp - 112;
    if half_exp >= 0x1F {
        return sign | 0x7C00;
    }

    if half_exp <= 0 {
        if half_exp < -10 {
            return sign;
        }
        let full = man | 0x0080_0000;
        let shift = (14 - half_exp) as u32;
        let kept = full >> shift;
        let rem = full & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        let rounded = if rem > halfway || (rem == halfway && kept & 1 == 1) {
            kept + 1
        } else {
            kept
        };
        return sign | rounded as u16;
    }

    let kept = man >> 13;
    let rem = man & 0x1FFF;
    let mut out = ((half_exp as u32) << 10) | kept;
    // a carry out of the mantissa bumps the exponent, up to infinity
    if rem > 0x1000 || (rem == 0x1000 && kept & 1 == 1) {
        out += 1;
    }
    sign | out as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_for_every_pattern() {
        for bits in 0..=u16::MAX {
            let ours = half_to_f32(bits);
            let reference = half::f16::from_bits(bits).to_f32();
            if reference.is_nan() {
                assert!(ours.is_nan(), "{bits:#06x}");
            } else {
                assert_eq!(ours.to_bits(), reference.to_bits(), "{bits:#06x}");
            }
        }
    }

    #[test]
    fn finite_round_trip_is_exact() {
        for bits in 0..=u16::MAX {
            if bits & 0x7C00 == 0x7C00 {
                continue;
            }
            assert_eq!(f32_to_half(half_to_f32(bits)), bits, "{bits:#06x}");
        }
    }

    #[test]
    fn encode_matches_reference() {
        let samples = [
            0.0f32, -0.0, 1.0, 0.5, 0.1, 1.0 / 3.0, 65504.0, 65520.0, 1e-5, 6.0e-8, 2.9e-8, 1e-9,
            -2.75, 255.0, 100_000.0,
        ];
        for x in samples {
            assert_eq!(
                f32_to_half(x),
                half::f16::from_f32(x).to_bits(),
                "x={x}"
            );
        }
    }

    #[test]
    fn specials() {
        assert_eq!(f32_to_half(f32::INFINITY), 0x7C00);
        assert_eq!(f32_to_half(f32::NEG_INFINITY), 0xFC00);
        assert!(half_to_f32(f32_to_half(f32::NAN)).is_nan());
        assert_eq!(half_to_f32(0x3C00), 1.0);
        assert_eq!(half_to_f32(0x0001), 2f32.powi(-24));
    }
}
