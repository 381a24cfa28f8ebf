use crate::foundation::error::{BeatframeError, BeatframeResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// Premultiplied source-over with an extra layer opacity.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> BeatframeResult<()> {
    if dst.len() != src.len() || dst.len() % 4 != 0 {
        return Err(BeatframeError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Source-over of `src` shifted by `(dx, dy)` pixels; uncovered destination pixels are kept.
pub(crate) fn over_offset_in_place(
    dst: &mut [u8],
    src: &[u8],
    width: u32,
    (dx, dy): (i32, i32),
    opacity: f32,
) -> BeatframeResult<()> {
    if (dx, dy) == (0, 0) {
        return over_in_place(dst, src, opacity);
    }
    let stride = width as usize * 4;
    if dst.len() != src.len() || stride == 0 || dst.len() % stride != 0 {
        return Err(BeatframeError::validation(
            "over_offset_in_place expects equal-length rgba8 buffers of whole rows",
        ));
    }
    let (w, h) = (width as i64, (dst.len() / stride) as i64);
    for (y, row) in dst.chunks_exact_mut(stride).enumerate() {
        let sy = y as i64 - i64::from(dy);
        if !(0..h).contains(&sy) {
            continue;
        }
        let src_row = &src[sy as usize * stride..(sy as usize + 1) * stride];
        for (x, d) in row.chunks_exact_mut(4).enumerate() {
            let sx = x as i64 - i64::from(dx);
            if !(0..w).contains(&sx) {
                continue;
            }
            let s = &src_row[sx as usize * 4..sx as usize * 4 + 4];
            if s[3] == 0 {
                continue;
            }
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Darken towards the corners.
///
/// `strength` 0 is a no-op; 1 takes the corners to black. The inner 30% of the radius is
/// untouched.
pub(crate) fn apply_vignette(dst: &mut [u8], width: u32, height: u32, strength: f64) {
    if strength.is_nan() || strength <= 0.0 || width == 0 || height == 0 {
        return;
    }
    let strength = strength.min(1.0);
    let cx = f64::from(width) * 0.5;
    let cy = f64::from(height) * 0.5;
    let max_d = (cx * cx + cy * cy).sqrt();

    for (y, row) in dst.chunks_exact_mut(width as usize * 4).enumerate() {
        let dy = y as f64 + 0.5 - cy;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let dx = x as f64 + 0.5 - cx;
            let d = (dx * dx + dy * dy).sqrt() / max_d;
            let t = ((d - 0.3) / 0.7).clamp(0.0, 1.0);
            let keep = 1.0 - strength * t * t;
            let k = (keep * 255.0).round() as u16;
            for c in &mut px[..3] {
                *c = mul_div255_u8(u16::from(*c), k);
            }
        }
    }
}

/// Fill `bar_px` rows at the top and bottom with opaque black.
pub(crate) fn apply_letterbox(dst: &mut [u8], width: u32, height: u32, bar_px: u32) {
    let bar = bar_px.min(height / 2) as usize;
    if bar == 0 {
        return;
    }
    let stride = width as usize * 4;
    let h = height as usize;
    for y in (0..bar).chain(h - bar..h) {
        for px in dst[y * stride..(y + 1) * stride].chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
