//! `vello_cpu` glue: pixmap helpers, kurbo conversion and frame readback.

use crate::foundation::core::{Affine, BezPath, Canvas, Point};
use crate::foundation::error::{BeatframeError, BeatframeResult};
use std::path::Path;

/// Rendered frame pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        out
    }

    /// Write the frame as a PNG.
    pub fn save_png(&self, path: &Path) -> BeatframeResult<()> {
        use anyhow::Context;

        image::save_buffer(
            path,
            &self.to_straight_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

pub(crate) fn new_pixmap(canvas: Canvas) -> BeatframeResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_u16(canvas)?;
    Ok(vello_cpu::Pixmap::new(w, h))
}

pub(crate) fn canvas_u16(canvas: Canvas) -> BeatframeResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| BeatframeError::validation("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| BeatframeError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

/// Premultiplied bytes to an image paint usable with `set_paint`.
pub(crate) fn premul_bytes_to_image(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> BeatframeResult<vello_cpu::Image> {
    let (w, h) = canvas_u16(Canvas { width, height })?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(BeatframeError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
