use archmage::prelude::*;
use safe_unaligned_simd::x86_64::{_mm256_loadu_si256, _mm256_storeu_si256};

use super::premul;

// ===========================================================================
// SIMD constants
// ===========================================================================

const ALPHA_FF_MASK_AVX: [i8; 32] = [
    0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0,
    0, 0, -1,
];

const COLOR_FF_MASK_AVX: [i8; 32] = [
    -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1,
    -1, -1, 0, -1, -1, -1, 0,
];

// 8 gray bytes broadcast to both lanes; low lane expands 0..4, high lane 4..8
const GRAY_EXPAND_MASK_AVX: [i8; 32] = [
    0, 0, 0, -128, 1, 1, 1, -128, 2, 2, 2, -128, 3, 3, 3, -128, 4, 4, 4, -128, 5, 5, 5, -128, 6, 6,
    6, -128, 7, 7, 7, -128,
];

const GA_EXPAND_MASK_AVX: [i8; 32] = [
    0, 0, 0, 1, 2, 2, 2, 3, 4, 4, 4, 5, 6, 6, 6, 7, 8, 8, 8, 9, 10, 10, 10, 11, 12, 12, 12, 13, 14,
    14, 14, 15,
];

// moves RGB bytes 12..24 into the high lane so both lanes start on a pixel
const RGB_ALIGN_PERM_AVX: [i8; 32] = [
    0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0,
];

const RGB_TO_RGBA_SHUF_AVX: [i8; 32] = [
    0, 1, 2, -128, 3, 4, 5, -128, 6, 7, 8, -128, 9, 10, 11, -128, 0, 1, 2, -128, 3, 4, 5, -128, 6,
    7, 8, -128, 9, 10, 11, -128,
];

const RGBA_TO_RGB_SHUF_AVX: [i8; 32] = [
    0, 1, 2, 4, 5, 6, 8, 9, 10, 12, 13, 14, -128, -128, -128, -128, 0, 1, 2, 4, 5, 6, 8, 9, 10, 12,
    13, 14, -128, -128, -128, -128,
];

// packs the 12 useful bytes of each lane into 24 contiguous bytes
const PACK_3X4_PERM_AVX: [i8; 32] = [
    0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

// ===========================================================================
// x86-64 AVX2: rite row implementations
// ===========================================================================

#[rite]
pub(super) fn gray_to_rgba_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let expand = _mm256_loadu_si256(&GRAY_EXPAND_MASK_AVX);
    let alpha = _mm256_loadu_si256(&ALPHA_FF_MASK_AVX);
    let mut d_chunks = dst.chunks_exact_mut(32);
    let mut s_chunks = src.chunks_exact(8);
    for (s, d) in (&mut s_chunks).zip(&mut d_chunks) {
        let mut lanes = [0u8; 8];
        lanes.copy_from_slice(s);
        let grays = _mm256_set1_epi64x(i64::from_ne_bytes(lanes));
        let rgba = _mm256_or_si256(_mm256_shuffle_epi8(grays, expand), alpha);
        let d: &mut [u8; 32] = d.try_into().unwrap();
        _mm256_storeu_si256(d, rgba);
    }
    let done = src.len() - s_chunks.remainder().len();
    for (&v, d) in src[done..].iter().zip(dst[done * 4..].chunks_exact_mut(4)) {
        d.copy_from_slice(&[v, v, v, 255]);
    }
}

#[rite]
pub(super) fn gray_alpha_to_rgba_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let expand = _mm256_loadu_si256(&GA_EXPAND_MASK_AVX);
    let mut d_chunks = dst.chunks_exact_mut(32);
    let mut s_chunks = src.chunks_exact(16);
    for (s, d) in (&mut s_chunks).zip(&mut d_chunks) {
        let lo = i64::from_ne_bytes(s[..8].try_into().unwrap());
        let hi = i64::from_ne_bytes(s[8..].try_into().unwrap());
        let gas = _mm256_set_epi64x(hi, lo, hi, lo);
        let d: &mut [u8; 32] = d.try_into().unwrap();
        _mm256_storeu_si256(d, _mm256_shuffle_epi8(gas, expand));
    }
    let done = src.len() - s_chunks.remainder().len();
    for (ga, d) in src[done..].chunks_exact(2).zip(dst[done * 2..].chunks_exact_mut(4)) {
        d.copy_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
    }
}

#[rite]
pub(super) fn rgb_to_rgba_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let perm = _mm256_loadu_si256(&RGB_ALIGN_PERM_AVX);
    let shuf = _mm256_loadu_si256(&RGB_TO_RGBA_SHUF_AVX);
    let alpha = _mm256_loadu_si256(&ALPHA_FF_MASK_AVX);
    let (slen, dlen) = (src.len(), dst.len());
    let (mut is, mut id) = (0, 0);
    // loads 32 bytes, consumes 24
    while is + 32 <= slen && id + 32 <= dlen {
        let s: &[u8; 32] = src[is..is + 32].try_into().unwrap();
        let aligned = _mm256_permutevar8x32_epi32(_mm256_loadu_si256(s), perm);
        let rgba = _mm256_or_si256(_mm256_shuffle_epi8(aligned, shuf), alpha);
        let d: &mut [u8; 32] = (&mut dst[id..id + 32]).try_into().unwrap();
        _mm256_storeu_si256(d, rgba);
        is += 24;
        id += 32;
    }
    for (s, d) in src[is..].chunks_exact(3).zip(dst[id..].chunks_exact_mut(4)) {
        d.copy_from_slice(&[s[0], s[1], s[2], 255]);
    }
}

#[rite]
pub(super) fn rgba_to_rgb_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let shuf = _mm256_loadu_si256(&RGBA_TO_RGB_SHUF_AVX);
    let pack = _mm256_loadu_si256(&PACK_3X4_PERM_AVX);
    let (slen, dlen) = (src.len(), dst.len());
    let (mut is, mut id) = (0, 0);
    while is + 32 <= slen && id + 24 <= dlen {
        let s: &[u8; 32] = src[is..is + 32].try_into().unwrap();
        let stripped = _mm256_shuffle_epi8(_mm256_loadu_si256(s), shuf);
        let packed = _mm256_permutevar8x32_epi32(stripped, pack);
        let mut tmp = [0u8; 32];
        _mm256_storeu_si256(&mut tmp, packed);
        dst[id..id + 24].copy_from_slice(&tmp[..24]);
        is += 32;
        id += 24;
    }
    for (s, d) in src[is..].chunks_exact(4).zip(dst[id..].chunks_exact_mut(3)) {
        d.copy_from_slice(&s[..3]);
    }
}

/// Exact `x / 255` for `x <= 255 * 255`, per 16-bit lane.
#[rite]
fn div255_epu16_v3(_token: X64V3Token, x: __m256i) -> __m256i {
    let one = _mm256_set1_epi16(1);
    let t = _mm256_add_epi16(_mm256_add_epi16(x, one), _mm256_srli_epi16::<8>(x));
    _mm256_srli_epi16::<8>(t)
}

#[rite]
pub(super) fn premultiply_row_v3(token: X64V3Token, row: &mut [u8]) {
    let keep_alpha = _mm256_loadu_si256(&ALPHA_FF_MASK_AVX);
    let zero = _mm256_setzero_si256();
    let mut chunks = row.chunks_exact_mut(32);
    for chunk in &mut chunks {
        let px: &mut [u8; 32] = chunk.try_into().unwrap();
        let v = _mm256_loadu_si256(px);
        let lo = _mm256_unpacklo_epi8(v, zero);
        let hi = _mm256_unpackhi_epi8(v, zero);
        // broadcast each pixel's alpha word across its four words
        let a_lo = _mm256_shufflehi_epi16::<0xFF>(_mm256_shufflelo_epi16::<0xFF>(lo));
        let a_hi = _mm256_shufflehi_epi16::<0xFF>(_mm256_shufflelo_epi16::<0xFF>(hi));
        let lo = div255_epu16_v3(token, _mm256_mullo_epi16(lo, a_lo));
        let hi = div255_epu16_v3(token, _mm256_mullo_epi16(hi, a_hi));
        let out = _mm256_blendv_epi8(_mm256_packus_epi16(lo, hi), v, keep_alpha);
        _mm256_storeu_si256(px, out);
    }
    for px in chunks.into_remainder().chunks_exact_mut(4) {
        let a = px[3];
        px[0] = premul(px[0], a);
        px[1] = premul(px[1], a);
        px[2] = premul(px[2], a);
    }
}

#[rite]
pub(super) fn invert_row_v3(_token: X64V3Token, row: &mut [u8]) {
    let mask = _mm256_loadu_si256(&COLOR_FF_MASK_AVX);
    let mut chunks = row.chunks_exact_mut(32);
    for chunk in &mut chunks {
        let px: &mut [u8; 32] = chunk.try_into().unwrap();
        let v = _mm256_loadu_si256(px);
        _mm256_storeu_si256(px, _mm256_xor_si256(v, mask));
    }
    for px in chunks.into_remainder().chunks_exact_mut(4) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

// ===========================================================================
// x86-64 arcane wrappers
// ===========================================================================

#[arcane]
pub(super) fn gray_to_rgba_impl_v3(t: X64V3Token, s: &[u8], d: &mut [u8]) {
    gray_to_rgba_row_v3(t, s, d);
}
#[arcane]
pub(super) fn gray_alpha_to_rgba_impl_v3(t: X64V3Token, s: &[u8], d: &mut [u8]) {
    gray_alpha_to_rgba_row_v3(t, s, d);
}
#[arcane]
pub(super) fn rgb_to_rgba_impl_v3(t: X64V3Token, s: &[u8], d: &mut [u8]) {
    rgb_to_rgba_row_v3(t, s, d);
}
#[arcane]
pub(super) fn rgba_to_rgb_impl_v3(t: X64V3Token, s: &[u8], d: &mut [u8]) {
    rgba_to_rgb_row_v3(t, s, d);
}
#[arcane]
pub(super) fn premultiply_impl_v3(t: X64V3Token, b: &mut [u8]) {
    premultiply_row_v3(t, b);
}
#[arcane]
pub(super) fn invert_impl_v3(t: X64V3Token, b: &mut [u8]) {
    invert_row_v3(t, b);
}
