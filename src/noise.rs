//! Gradient noise for [`Image::gen_perlin_noise`](crate::Image::gen_perlin_noise).

/// Spacing between successive fBm octaves.
pub const PERLIN_LACUNARITY: f32 = 2.0;
/// Amplitude falloff per octave.
pub const PERLIN_GAIN: f32 = 0.5;
pub const PERLIN_OCTAVES: u32 = 6;

/// A 3D noise primitive in roughly `[-1, 1]`.
pub trait NoiseSource {
    /// Single-octave noise. `seed` picks one of 256 decorrelated variants.
    fn noise3(&self, x: f32, y: f32, z: f32, seed: u8) -> f32;

    /// Fractal Brownian motion: `octaves` layers of [`NoiseSource::noise3`],
    /// each at `lacunarity` times the frequency and `gain` times the
    /// amplitude of the one before.
    fn fbm_noise3(&self, x: f32, y: f32, z: f32, lacunarity: f32, gain: f32, octaves: u32) -> f32 {
        let (mut frequency, mut amplitude, mut sum) = (1.0f32, 1.0f32, 0.0f32);
        for octave in 0..octaves {
            sum += self.noise3(x * frequency, y * frequency, z * frequency, octave as u8) * amplitude;
            frequency *= lacunarity;
            amplitude *= gain;
        }
        sum
    }
}

/// Improved Perlin noise over Ken Perlin's reference permutation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Perlin;

#[rustfmt::skip]
const PERMUTATION: [u8; 256] = [
    151, 160, 137,  91,  90,  15, 131,  13, 201,  95,  96,  53, 194, 233,   7, 225,
    140,  36, 103,  30,  69, 142,   8,  99,  37, 240,  21,  10,  23, 190,   6, 148,
    247, 120, 234,  75,   0,  26, 197,  62,  94, 252, 219, 203, 117,  35,  11,  32,
     57, 177,  33,  88, 237, 149,  56,  87, 174,  20, 125, 136, 171, 168,  68, 175,
     74, 165,  71, 134, 139,  48,  27, 166,  77, 146, 158, 231,  83, 111, 229, 122,
     60, 211, 133, 230, 220, 105,  92,  41,  55,  46, 245,  40, 244, 102, 143,  54,
     65,  25,  63, 161,   1, 216,  80,  73, 209,  76, 132, 187, 208,  89,  18, 169,
    200, 196, 135, 130, 116, 188, 159,  86, 164, 100, 109, 198, 173, 186,   3,  64,
     52, 217, 226, 250, 124, 123,   5, 202,  38, 147, 118, 126, 255,  82,  85, 212,
    207, 206,  59, 227,  47,  16,  58,  17, 182, 189,  28,  42, 223, 183, 170, 213,
    119, 248, 152,   2,  44, 154, 163,  70, 221, 153, 101, 155, 167,  43, 172,   9,
    129,  22,  39, 253,  19,  98, 108, 110,  79, 113, 224, 232, 178, 185, 112, 104,
    218, 246,  97, 228, 251,  34, 242, 193, 238, 210, 144,  12, 191, 179, 162, 241,
     81,  51, 145, 235, 249,  14, 239, 107,  49, 192, 214,  31, 181, 199, 106, 157,
    184,  84, 204, 176, 115, 121,  50,  45, 127,   4, 150, 254, 138, 236, 205,  93,
    222, 114,  67,  29,  24,  72, 243, 141, 128, 195,  78,  66, 215,  61, 156, 180,
];

#[inline]
fn hash(i: i32) -> i32 {
    i32::from(PERMUTATION[(i & 255) as usize])
}

/// Lattice coordinate reduced to the 256-cell period of the permutation.
/// Saturating casts keep huge and non-finite inputs in range.
#[inline]
fn lattice(f: f32) -> i32 {
    (f as i64 & 255) as i32
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Dot product with one of 12 cube-edge gradients picked by `h`.
#[inline]
fn grad(h: i32, x: f32, y: f32, z: f32) -> f32 {
    let h = h & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

impl NoiseSource for Perlin {
    fn noise3(&self, x: f32, y: f32, z: f32, seed: u8) -> f32 {
        let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
        let (xi, yi, zi) = (lattice(fx), lattice(fy), lattice(fz));
        let (x, y, z) = (x - fx, y - fy, z - fz);
        let (u, v, w) = (fade(x), fade(y), fade(z));
        let seed = i32::from(seed);

        let a = hash(xi + seed) + yi;
        let aa = hash(a) + zi;
        let ab = hash(a + 1) + zi;
        let b = hash(xi + 1 + seed) + yi;
        let ba = hash(b) + zi;
        let bb = hash(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(hash(aa), x, y, z), grad(hash(ba), x - 1.0, y, z)),
                lerp(u, grad(hash(ab), x, y - 1.0, z), grad(hash(bb), x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(u, grad(hash(aa + 1), x, y, z - 1.0), grad(hash(ba + 1), x - 1.0, y, z - 1.0)),
                lerp(u, grad(hash(ab + 1), x, y - 1.0, z - 1.0), grad(hash(bb + 1), x - 1.0, y - 1.0, z - 1.0)),
            ),
        )
    }
}
