use archmage::prelude::*;
use core::arch::aarch64::{veorq_u8, vorrq_u8, vqtbl1q_u8};
use safe_unaligned_simd::aarch64::{vld1q_u8, vst1q_u8};

use super::premul;

const ALPHA_FF: [u8; 16] = [0, 0, 0, 0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF];
const COLOR_FF: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0,
];

// ===========================================================================
// ARM NEON: rite row implementations
// ===========================================================================

#[rite]
pub(super) fn gray_to_rgba_row_neon(_token: NeonToken, src: &[u8], dst: &mut [u8]) {
    let masks: [[u8; 16]; 4] = core::array::from_fn(|q| {
        core::array::from_fn(|i| if i % 4 == 3 { 0x80 } else { (q * 4 + i / 4) as u8 })
    });
    let m: [_; 4] = core::array::from_fn(|i| vld1q_u8(&masks[i]));
    let alpha = vld1q_u8(&ALPHA_FF);
    let mut s_chunks = src.chunks_exact(16);
    for (s, d) in (&mut s_chunks).zip(dst.chunks_exact_mut(64)) {
        let grays = vld1q_u8(s.try_into().unwrap());
        for (j, out) in d.chunks_exact_mut(16).enumerate() {
            vst1q_u8(out.try_into().unwrap(), vorrq_u8(vqtbl1q_u8(grays, m[j]), alpha));
        }
    }
    let done = src.len() - s_chunks.remainder().len();
    for (&v, d) in src[done..].iter().zip(dst[done * 4..].chunks_exact_mut(4)) {
        d.copy_from_slice(&[v, v, v, 255]);
    }
}

#[rite]
pub(super) fn gray_alpha_to_rgba_row_neon(_token: NeonToken, src: &[u8], dst: &mut [u8]) {
    let lo = vld1q_u8(&[0, 0, 0, 1, 2, 2, 2, 3, 4, 4, 4, 5, 6, 6, 6, 7]);
    let hi = vld1q_u8(&[8, 8, 8, 9, 10, 10, 10, 11, 12, 12, 12, 13, 14, 14, 14, 15]);
    let mut s_chunks = src.chunks_exact(16);
    for (s, d) in (&mut s_chunks).zip(dst.chunks_exact_mut(32)) {
        let gas = vld1q_u8(s.try_into().unwrap());
        let (d0, d1) = d.split_at_mut(16);
        vst1q_u8(d0.try_into().unwrap(), vqtbl1q_u8(gas, lo));
        vst1q_u8(d1.try_into().unwrap(), vqtbl1q_u8(gas, hi));
    }
    let done = src.len() - s_chunks.remainder().len();
    for (ga, d) in src[done..].chunks_exact(2).zip(dst[done * 2..].chunks_exact_mut(4)) {
        d.copy_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
    }
}

#[rite]
pub(super) fn rgb_to_rgba_row_neon(_token: NeonToken, src: &[u8], dst: &mut [u8]) {
    let shuf = vld1q_u8(&[0, 1, 2, 0x80, 3, 4, 5, 0x80, 6, 7, 8, 0x80, 9, 10, 11, 0x80]);
    let alpha = vld1q_u8(&ALPHA_FF);
    let (slen, dlen) = (src.len(), dst.len());
    let (mut is, mut id) = (0, 0);
    // loads 16 bytes, consumes 12
    while is + 16 <= slen && id + 16 <= dlen {
        let v = vld1q_u8(src[is..is + 16].try_into().unwrap());
        vst1q_u8(
            (&mut dst[id..id + 16]).try_into().unwrap(),
            vorrq_u8(vqtbl1q_u8(v, shuf), alpha),
        );
        is += 12;
        id += 16;
    }
    for (s, d) in src[is..].chunks_exact(3).zip(dst[id..].chunks_exact_mut(4)) {
        d.copy_from_slice(&[s[0], s[1], s[2], 255]);
    }
}

#[rite]
pub(super) fn rgba_to_rgb_row_neon(_token: NeonToken, src: &[u8], dst: &mut [u8]) {
    let shuf = vld1q_u8(&[0, 1, 2, 4, 5, 6, 8, 9, 10, 12, 13, 14, 0x80, 0x80, 0x80, 0x80]);
    let mut s_chunks = src.chunks_exact(16);
    for (s, d) in (&mut s_chunks).zip(dst.chunks_exact_mut(12)) {
        let mut tmp = [0u8; 16];
        vst1q_u8(&mut tmp, vqtbl1q_u8(vld1q_u8(s.try_into().unwrap()), shuf));
        d.copy_from_slice(&tmp[..12]);
    }
    let done = src.len() - s_chunks.remainder().len();
    for (s, d) in src[done..].chunks_exact(4).zip(dst[done / 4 * 3..].chunks_exact_mut(3)) {
        d.copy_from_slice(&s[..3]);
    }
}

#[rite]
pub(super) fn premultiply_row_neon(_token: NeonToken, row: &mut [u8]) {
    // widening multiply autovectorizes under the NEON feature set
    for px in row.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = premul(px[0], a);
        px[1] = premul(px[1], a);
        px[2] = premul(px[2], a);
    }
}

#[rite]
pub(super) fn invert_row_neon(_token: NeonToken, row: &mut [u8]) {
    let mask = vld1q_u8(&COLOR_FF);
    let mut chunks = row.chunks_exact_mut(16);
    for chunk in &mut chunks {
        let px: &mut [u8; 16] = chunk.try_into().unwrap();
        let v = vld1q_u8(px);
        vst1q_u8(px, veorq_u8(v, mask));
    }
    for px in chunks.into_remainder().chunks_exact_mut(4) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

// ===========================================================================
// ARM arcane wrappers
// ===========================================================================

#[arcane]
pub(super) fn gray_to_rgba_impl_neon(t: NeonToken, s: &[u8], d: &mut [u8]) {
    gray_to_rgba_row_neon(t, s, d);
}
#[arcane]
pub(super) fn gray_alpha_to_rgba_impl_neon(t: NeonToken, s: &[u8], d: &mut [u8]) {
    gray_alpha_to_rgba_row_neon(t, s, d);
}
#[arcane]
pub(super) fn rgb_to_rgba_impl_neon(t: NeonToken, s: &[u8], d: &mut [u8]) {
    rgb_to_rgba_row_neon(t, s, d);
}
#[arcane]
pub(super) fn rgba_to_rgb_impl_neon(t: NeonToken, s: &[u8], d: &mut [u8]) {
    rgba_to_rgb_row_neon(t, s, d);
}
#[arcane]
pub(super) fn premultiply_impl_neon(t: NeonToken, b: &mut [u8]) {
    premultiply_row_neon(t, b);
}
#[arcane]
pub(super) fn invert_impl_neon(t: NeonToken, b: &mut [u8]) {
    invert_row_neon(t, b);
}
