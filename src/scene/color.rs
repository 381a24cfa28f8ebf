use crate::foundation::core::Rgba8Premul;
use crate::foundation::math::{hsl_to_rgb8, mul_div255_u8, unit_to_u8};
use serde::{Deserialize, Serialize, Serializer};

/// Straight-alpha RGBA8 color as used by the scene model.
///
/// Deserializes from `#RRGGBB`, `#RRGGBBAA`, `{r,g,b[,a]}`, `{h,s,l[,a]}` or `[r,g,b(,a)]` (unit
/// components). Serializes to `#RRGGBB` when opaque, otherwise `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (straight).
    pub a: u8,
}

impl Color {
    /// Opaque color from RGB bytes.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from straight RGBA bytes.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from hue (degrees), saturation and lightness (0..1).
    pub fn hsl(h_deg: f64, s: f64, l: f64) -> Self {
        let [r, g, b] = hsl_to_rgb8(h_deg, s, l);
        Self::rgb(r, g, b)
    }

    /// Parse a `#RRGGBB` / `#RRGGBBAA` string (the `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        if !s.is_ascii() {
            return Err("hex color must be ascii".to_owned());
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::rgba(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
        }
    }

    /// Format as lowercase hex.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same color with alpha multiplied by `opacity` (clamped to 0..1).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let op = if opacity.is_finite() {
            (opacity.clamp(0.0, 1.0) * 255.0).round() as u16
        } else {
            0
        };
        Self {
            a: mul_div255_u8(u16::from(self.a), op),
            ..self
        }
    }

    /// Linear interpolation in straight RGBA space.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| -> u8 {
            let af = f64::from(a);
            let bf = f64::from(b);
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Premultiplied form used by the raster surface.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Paint color for `vello_cpu` draw calls.
    pub(crate) fn to_paint(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            HslaObj {
                h: f64,
                s: f64,
                l: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        fn unit(x: f64) -> u8 {
            unit_to_u8(x as f32)
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(unit(r), unit(g), unit(b), unit(a))),
            Repr::HslaObj { h, s, l, a } => Ok(Self {
                a: unit(a),
                ..Self::hsl(h, s, l)
            }),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(unit(*r), unit(*g), unit(*b))),
                [r, g, b, a] => Ok(Self::rgba(unit(*r), unit(*g), unit(*b), unit(*a))),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/color.rs"]
mod tests;
