use crate::foundation::error::{BeatframeError, BeatframeResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> BeatframeResult<Self> {
        if den == 0 {
            return Err(BeatframeError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(BeatframeError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate (`num/1`).
    pub fn whole(num: u32) -> BeatframeResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp of frame `frames` in seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Raster surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Reference resolution every size-dependent draw value is expressed against.
    pub const CANONICAL: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Create a validated canvas size.
    ///
    /// `vello_cpu` pixmaps are addressed with `u16`, so both sides must fit.
    pub fn new(width: u32, height: u32) -> BeatframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(BeatframeError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(BeatframeError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        Ok(Self { width, height })
    }

    /// Uniform scale from canonical space to this canvas (`width / 1920`).
    pub fn scale_factor(self) -> f64 {
        f64::from(self.width) / f64::from(Self::CANONICAL.width)
    }

    /// Center point in pixel space.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) * 0.5, f64::from(self.height) * 0.5)
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Pixel bytes in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
