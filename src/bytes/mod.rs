// ---------------------------------------------------------------------------
// Row-level RGBA8 kernels with SIMD dispatch.
//
// Architecture: per-tier row loops live in scalar.rs / avx2.rs / neon.rs.
// #[arcane] wrappers compile each loop with the tier's target features and
// incant! picks the best available tier at runtime.
// ---------------------------------------------------------------------------

use crate::SizeError;
use archmage::incant;

mod scalar;
use scalar::*;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
use avx2::*;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
use neon::*;


// ===========================================================================
// Validation helpers
// ===========================================================================

#[inline]
fn check_inplace(len: usize, bpp: usize) -> Result<(), SizeError> {
    if len == 0 || !len.is_multiple_of(bpp) {
        Err(SizeError::NotPixelAligned)
    } else {
        Ok(())
    }
}

#[inline]
fn check_copy(
    src_len: usize,
    src_bpp: usize,
    dst_len: usize,
    dst_bpp: usize,
) -> Result<(), SizeError> {
    if src_len == 0 || !src_len.is_multiple_of(src_bpp) {
        return Err(SizeError::NotPixelAligned);
    }
    if dst_len < (src_len / src_bpp) * dst_bpp {
        return Err(SizeError::PixelCountMismatch);
    }
    Ok(())
}

// ===========================================================================
// Utility
// ===========================================================================

/// `c * a / 255`, truncating.
#[inline(always)]
fn premul(c: u8, a: u8) -> u8 {
    (u16::from(c) * u16::from(a) / 255) as u8
}

// ===========================================================================
// Public API
// ===========================================================================

/// Gray (1 byte/px) → RGBA (4 bytes/px). Replicates luminance, alpha=255.
pub fn gray_to_rgba(src: &[u8], dst: &mut [u8]) -> Result<(), SizeError> {
    check_copy(src.len(), 1, dst.len(), 4)?;
    incant!(gray_to_rgba_impl(src, dst), [v3, neon, scalar]);
    Ok(())
}

/// Gray+alpha (2 bytes/px) → RGBA (4 bytes/px).
pub fn gray_alpha_to_rgba(src: &[u8], dst: &mut [u8]) -> Result<(), SizeError> {
    check_copy(src.len(), 2, dst.len(), 4)?;
    incant!(gray_alpha_to_rgba_impl(src, dst), [v3, neon, scalar]);
    Ok(())
}

/// RGB (3 bytes/px) → RGBA (4 bytes/px). Keeps channel order, alpha=255.
pub fn rgb_to_rgba(src: &[u8], dst: &mut [u8]) -> Result<(), SizeError> {
    check_copy(src.len(), 3, dst.len(), 4)?;
    incant!(rgb_to_rgba_impl(src, dst), [v3, neon, scalar]);
    Ok(())
}

/// RGBA (4 bytes/px) → RGB (3 bytes/px). Drops alpha.
pub fn rgba_to_rgb(src: &[u8], dst: &mut [u8]) -> Result<(), SizeError> {
    check_copy(src.len(), 4, dst.len(), 3)?;
    incant!(rgba_to_rgb_impl(src, dst), [v3, neon, scalar]);
    Ok(())
}

/// Multiply R, G, B by alpha in-place. Alpha 0 zeroes the colour.
pub fn premultiply_rgba_inplace(buf: &mut [u8]) -> Result<(), SizeError> {
    check_inplace(buf.len(), 4)?;
    incant!(premultiply_impl(buf), [v3, neon, scalar]);
    Ok(())
}

/// `255 - c` on R, G, B in-place. Alpha untouched.
pub fn invert_rgba_inplace(buf: &mut [u8]) -> Result<(), SizeError> {
    check_inplace(buf.len(), 4)?;
    incant!(invert_impl(buf), [v3, neon, scalar]);
    Ok(())
}
