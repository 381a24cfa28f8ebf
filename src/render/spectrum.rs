//! Spectrum geometry in pixel space.
//!
//! Pure functions from a snapshot and a config to filled/stroked paths; the compositor only
//! paints what this module returns.

use crate::foundation::core::{Affine, BezPath, Canvas, Point, Vec2};
use crate::scene::color::Color;
use crate::scene::config::{ColorMode, LayoutMode, SceneConfig, SpectrumStyle};
use kurbo::{RoundedRect, Shape};

/// Canonical base radius of the circular layout.
pub(crate) const CIRCLE_RADIUS: f64 = 200.0;
/// Canonical pixels per full-scale bin in the circular layout.
pub(crate) const CIRCLE_BAR_SCALE: f64 = 150.0;
/// Canonical pixels per full-scale bin in the linear layout.
pub(crate) const LINEAR_BAR_SCALE: f64 = 300.0;
/// Pulse radius multiplier on beat.
pub(crate) const BEAT_PULSE: f64 = 1.02;

/// How a shape is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Paint {
    Fill,
    Stroke(f64),
}

/// One colored spectrum primitive.
#[derive(Clone, Debug)]
pub(crate) struct SpectrumShape {
    pub(crate) path: BezPath,
    pub(crate) color: Color,
    pub(crate) paint: Paint,
}

/// Per-frame spectrum inputs besides the config.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SpectrumFrame {
    pub(crate) canvas: Canvas,
    pub(crate) time_secs: f64,
    pub(crate) beat: bool,
}

/// Bar heights in pixels, one per bar. Bins past the snapshot end read as zero.
pub(crate) fn bar_heights(cfg: &SceneConfig, snapshot: &[u8], px_per_unit: f64) -> Vec<f64> {
    (0..cfg.bar_count as usize)
        .map(|i| {
            let v = f64::from(snapshot.get(i).copied().unwrap_or(0)) / 255.0;
            v * cfg.sensitivity * cfg.bar_height_scale * px_per_unit
        })
        .collect()
}

/// Color of bar `i` of `n`.
pub(crate) fn bar_color(cfg: &SceneConfig, i: usize, n: usize, time_secs: f64) -> Color {
    if cfg.rainbow_mode {
        let hue = 360.0 * i as f64 / n.max(1) as f64 + time_secs * cfg.color_cycle_speed * 60.0;
        return Color::hsl(hue, 1.0, 0.55);
    }
    match cfg.color_mode {
        ColorMode::Solid => {
            if i % 2 == 0 {
                cfg.primary_color
            } else {
                cfg.secondary_color
            }
        }
        ColorMode::Gradient => {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            cfg.primary_color.lerp(cfg.secondary_color, t)
        }
    }
}

/// Build the spectrum layer. `cfg` is expected to be sanitized.
pub(crate) fn build(cfg: &SceneConfig, snapshot: &[u8], frame: SpectrumFrame) -> Vec<SpectrumShape> {
    match cfg.mode {
        LayoutMode::Circular => circular(cfg, snapshot, frame),
        LayoutMode::Linear => linear(cfg, snapshot, frame),
    }
}

fn circular(cfg: &SceneConfig, snapshot: &[u8], frame: SpectrumFrame) -> Vec<SpectrumShape> {
    let scale = frame.canvas.scale_factor();
    let pulse = if frame.beat { BEAT_PULSE } else { 1.0 };
    let radius = CIRCLE_RADIUS * cfg.spectrum_scale * scale * pulse;
    let heights = bar_heights(cfg, snapshot, CIRCLE_BAR_SCALE * scale);
    let n = heights.len();
    let center = frame.canvas.center();
    let rotation = frame.time_secs * cfg.rotation_speed;
    let step = std::f64::consts::TAU / n.max(1) as f64;
    let bar_w = cfg.bar_width * scale;

    match cfg.spectrum_style {
        SpectrumStyle::Bars => heights
            .iter()
            .enumerate()
            .filter(|(_, h)| **h >= 0.5)
            .map(|(i, &h)| {
                let corner = cfg.bar_roundness * bar_w * 0.5;
                let rect = RoundedRect::new(-bar_w * 0.5, radius, bar_w * 0.5, radius + h, corner);
                let xf = Affine::translate(center.to_vec2())
                    * Affine::rotate(rotation + i as f64 * step);
                SpectrumShape {
                    path: xf * rect.to_path(0.1),
                    color: bar_color(cfg, i, n, frame.time_secs),
                    paint: Paint::Fill,
                }
            })
            .collect(),
        SpectrumStyle::Wave | SpectrumStyle::Curve => {
            let tips: Vec<Point> = heights
                .iter()
                .enumerate()
                .map(|(i, &h)| {
                    let a = rotation + i as f64 * step;
                    center + Vec2::new(-a.sin(), a.cos()) * (radius + h)
                })
                .collect();
            let color = bar_color(cfg, 0, n, frame.time_secs);
            let line_w = (bar_w * 0.5).max(1.0);
            if cfg.spectrum_style == SpectrumStyle::Wave {
                vec![SpectrumShape {
                    path: polyline(&tips, true),
                    color,
                    paint: Paint::Stroke(line_w),
                }]
            } else {
                let path = smooth_closed(&tips);
                vec![
                    SpectrumShape {
                        path: path.clone(),
                        color: color.with_opacity(cfg.fill_opacity),
                        paint: Paint::Fill,
                    },
                    SpectrumShape {
                        path,
                        color,
                        paint: Paint::Stroke(line_w),
                    },
                ]
            }
        }
    }
}

fn linear(cfg: &SceneConfig, snapshot: &[u8], frame: SpectrumFrame) -> Vec<SpectrumShape> {
    let scale = frame.canvas.scale_factor();
    let w = f64::from(frame.canvas.width);
    let h_canvas = f64::from(frame.canvas.height);
    let pulse = if frame.beat { BEAT_PULSE } else { 1.0 };
    let heights: Vec<f64> = bar_heights(cfg, snapshot, LINEAR_BAR_SCALE * scale * cfg.spectrum_scale)
        .into_iter()
        .map(|h| h * pulse)
        .collect();
    let n = heights.len();
    let baseline = h_canvas * 0.8;

    // Mirror lays bins out from the center towards both edges.
    let slots: Vec<(f64, usize)> = if cfg.mirror {
        let half = w * 0.5 / n.max(1) as f64;
        (0..n)
            .flat_map(|i| {
                let off = (i as f64 + 0.5) * half;
                [(w * 0.5 - off, i), (w * 0.5 + off, i)]
            })
            .collect()
    } else {
        let slot = w / n.max(1) as f64;
        (0..n).map(|i| ((i as f64 + 0.5) * slot, i)).collect()
    };
    let slot_w = if cfg.mirror {
        w * 0.5 / n.max(1) as f64
    } else {
        w / n.max(1) as f64
    };
    let bar_w = (cfg.bar_width * scale).min(slot_w * 0.9).max(0.5);

    match cfg.spectrum_style {
        SpectrumStyle::Bars => slots
            .iter()
            .filter(|(_, i)| heights[*i] >= 0.5)
            .map(|&(x, i)| {
                let corner = cfg.bar_roundness * bar_w * 0.5;
                let rect = RoundedRect::new(
                    x - bar_w * 0.5,
                    baseline - heights[i],
                    x + bar_w * 0.5,
                    baseline,
                    corner,
                );
                SpectrumShape {
                    path: rect.to_path(0.1),
                    color: bar_color(cfg, i, n, frame.time_secs),
                    paint: Paint::Fill,
                }
            })
            .collect(),
        SpectrumStyle::Wave | SpectrumStyle::Curve => {
            let mut ordered = slots.clone();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
            let tips: Vec<Point> = ordered
                .iter()
                .map(|&(x, i)| Point::new(x, baseline - heights[i]))
                .collect();
            let color = bar_color(cfg, 0, n, frame.time_secs);
            let line_w = (cfg.bar_width * scale * 0.5).max(1.0);
            if cfg.spectrum_style == SpectrumStyle::Wave {
                vec![SpectrumShape {
                    path: polyline(&tips, false),
                    color,
                    paint: Paint::Stroke(line_w),
                }]
            } else {
                let outline = smooth_open(&tips);
                let mut fill = outline.clone();
                if let (Some(first), Some(last)) = (tips.first(), tips.last()) {
                    fill.line_to((last.x, baseline));
                    fill.line_to((first.x, baseline));
                    fill.close_path();
                }
                vec![
                    SpectrumShape {
                        path: fill,
                        color: color.with_opacity(cfg.fill_opacity),
                        paint: Paint::Fill,
                    },
                    SpectrumShape {
                        path: outline,
                        color,
                        paint: Paint::Stroke(line_w),
                    },
                ]
            }
        }
    }
}

fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    if closed {
        path.close_path();
    }
    path
}

/// Quadratic smoothing through midpoints; control points are the samples.
fn smooth_open(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    match points {
        [] => path,
        [only] => {
            path.move_to(*only);
            path
        }
        [first, .., last] => {
            path.move_to(*first);
            for pair in points.windows(2).skip(1) {
                path.quad_to(pair[0], pair[0].midpoint(pair[1]));
            }
            path.line_to(*last);
            path
        }
    }
}

fn smooth_closed(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let n = points.len();
    if n < 3 {
        return polyline(points, true);
    }
    path.move_to(points[n - 1].midpoint(points[0]));
    for i in 0..n {
        let next = points[(i + 1) % n];
        path.quad_to(points[i], points[i].midpoint(next));
    }
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/spectrum.rs"]
mod tests;
