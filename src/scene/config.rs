use crate::foundation::math::clamp_finite;
use crate::scene::color::Color;
use serde::{Deserialize, Serialize};

/// Spectrum layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Radial spectrum around the canvas center.
    #[default]
    Circular,
    /// Left-to-right spectrum across the full width.
    Linear,
}

/// How bar colors are picked when rainbow mode is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Alternate primary and secondary per bar.
    #[default]
    Solid,
    /// Interpolate primary to secondary across the spectrum.
    Gradient,
}

/// Spectrum drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumStyle {
    /// Discrete rounded bars.
    #[default]
    Bars,
    /// Polyline through bar tips.
    Wave,
    /// Smooth filled curve through bar tips.
    Curve,
}

/// Inclusive numeric range with a default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Default value, also used in place of non-finite input.
    pub default: f64,
}

impl FieldRange {
    const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    /// Clamp `v` into range.
    pub fn clamp(self, v: f64) -> f64 {
        clamp_finite(v, self.min, self.max, self.default)
    }

    fn clamp_u32(self, v: u32) -> u32 {
        (f64::from(v).clamp(self.min, self.max)) as u32
    }
}

/// Valid ranges for every numeric [`SceneConfig`] field.
pub mod ranges {
    use super::FieldRange;

    /// `rotationSpeed` in radians per second.
    pub const ROTATION_SPEED: FieldRange = FieldRange::new(-5.0, 5.0, 0.2);
    /// `vignette`
    pub const VIGNETTE: FieldRange = FieldRange::new(0.0, 1.0, 0.3);
    /// `shakeStrength` in canonical pixels.
    pub const SHAKE_STRENGTH: FieldRange = FieldRange::new(0.0, 50.0, 0.0);
    /// `colorCycleSpeed`
    pub const COLOR_CYCLE_SPEED: FieldRange = FieldRange::new(0.0, 10.0, 1.0);
    /// `spectrumScale`
    pub const SPECTRUM_SCALE: FieldRange = FieldRange::new(0.2, 3.0, 1.0);
    /// `barCount`
    pub const BAR_COUNT: FieldRange = FieldRange::new(8.0, 256.0, 64.0);
    /// `barWidth` in canonical pixels.
    pub const BAR_WIDTH: FieldRange = FieldRange::new(1.0, 40.0, 8.0);
    /// `barHeightScale`
    pub const BAR_HEIGHT_SCALE: FieldRange = FieldRange::new(0.1, 5.0, 1.0);
    /// `barRoundness`
    pub const BAR_ROUNDNESS: FieldRange = FieldRange::new(0.0, 1.0, 0.5);
    /// `fillOpacity`
    pub const FILL_OPACITY: FieldRange = FieldRange::new(0.0, 1.0, 0.3);
    /// `bloomStrength` in canonical pixels of blur.
    pub const BLOOM_STRENGTH: FieldRange = FieldRange::new(0.0, 50.0, 10.0);
    /// `sensitivity`
    pub const SENSITIVITY: FieldRange = FieldRange::new(0.1, 5.0, 1.5);
    /// `smoothing`
    pub const SMOOTHING: FieldRange = FieldRange::new(0.0, 0.99, 0.8);
    /// `particleCount`
    pub const PARTICLE_COUNT: FieldRange = FieldRange::new(0.0, 500.0, 100.0);
    /// `particleSpeed`
    pub const PARTICLE_SPEED: FieldRange = FieldRange::new(0.0, 10.0, 1.0);
    /// `backgroundOpacity`
    pub const BACKGROUND_OPACITY: FieldRange = FieldRange::new(0.0, 1.0, 1.0);
    /// `backgroundBlur` in canonical pixels.
    pub const BACKGROUND_BLUR: FieldRange = FieldRange::new(0.0, 50.0, 0.0);
    /// `centerImageSize` as a fraction of canvas height.
    pub const CENTER_IMAGE_SIZE: FieldRange = FieldRange::new(0.05, 1.0, 0.3);
    /// `textSize` in canonical pixels.
    pub const TEXT_SIZE: FieldRange = FieldRange::new(8.0, 200.0, 48.0);
    /// `textOpacity`
    pub const TEXT_OPACITY: FieldRange = FieldRange::new(0.0, 1.0, 1.0);
    /// `letterSpacing` in canonical pixels.
    pub const LETTER_SPACING: FieldRange = FieldRange::new(-10.0, 50.0, 2.0);
}

/// Complete description of the scene's appearance.
///
/// Serialized as camelCase JSON. Every field has a default so partial documents deserialize;
/// see [`crate::apply_overlay`] for tolerant ingestion of untrusted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    /// Display name of the preset this config came from.
    pub preset_name: String,

    /// Spectrum layout.
    pub mode: LayoutMode,
    /// Mirror the linear spectrum around the vertical center.
    pub mirror: bool,
    /// Circular rotation speed (radians per second).
    pub rotation_speed: f64,
    /// Draw letterbox bars.
    pub cinematic_bars: bool,
    /// Radial vignette strength.
    pub vignette: f64,
    /// Camera shake strength.
    pub shake_strength: f64,

    /// Primary palette color.
    pub primary_color: Color,
    /// Secondary palette color.
    pub secondary_color: Color,
    /// Background fill color.
    pub background_color: Color,
    /// Bar coloring mode.
    pub color_mode: ColorMode,
    /// Cycle hue over time instead of using the palette.
    pub rainbow_mode: bool,
    /// Hue cycle speed for rainbow mode.
    pub color_cycle_speed: f64,

    /// Draw the spectrum layer.
    pub show_bars: bool,
    /// Spectrum drawing style.
    pub spectrum_style: SpectrumStyle,
    /// Overall spectrum radius/extent multiplier.
    pub spectrum_scale: f64,
    /// Number of bars sampled from the snapshot.
    pub bar_count: u32,
    /// Bar thickness.
    pub bar_width: f64,
    /// Bar height multiplier.
    pub bar_height_scale: f64,
    /// Corner rounding as a fraction of half the bar width.
    pub bar_roundness: f64,
    /// Fill opacity of the curve style.
    pub fill_opacity: f64,
    /// Bloom blur radius.
    pub bloom_strength: f64,
    /// Magnitude gain applied to each bin.
    pub sensitivity: f64,
    /// Analyser smoothing time constant.
    pub smoothing: f64,

    /// Draw beat particles.
    pub show_particles: bool,
    /// Particle population cap.
    pub particle_count: u32,
    /// Particle speed multiplier.
    pub particle_speed: f64,

    /// Background image reference (path or asset key).
    pub background_image: Option<String>,
    /// Background image opacity.
    pub background_opacity: f64,
    /// Background image blur radius.
    pub background_blur: f64,
    /// Center image reference (path or asset key).
    pub center_image: Option<String>,
    /// Center image size as a fraction of canvas height.
    pub center_image_size: f64,
    /// Clip the center image to a circle.
    pub center_image_circular: bool,

    /// Draw the text overlay.
    pub show_text: bool,
    /// First (title) line.
    pub text_line1: String,
    /// Second (subtitle) line.
    pub text_line2: String,
    /// Font family name, resolved against the registered fonts.
    pub font_family: String,
    /// Title font size.
    pub text_size: f64,
    /// Text color.
    pub text_color: Color,
    /// Text opacity.
    pub text_opacity: f64,
    /// Extra spacing between glyphs.
    pub letter_spacing: f64,
    /// Draw a drop shadow beneath the text.
    pub text_shadow: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            preset_name: "Default".to_owned(),

            mode: LayoutMode::Circular,
            mirror: false,
            rotation_speed: ranges::ROTATION_SPEED.default,
            cinematic_bars: false,
            vignette: ranges::VIGNETTE.default,
            shake_strength: ranges::SHAKE_STRENGTH.default,

            primary_color: Color::rgb(0x00, 0xf0, 0xff),
            secondary_color: Color::rgb(0xff, 0x00, 0xaa),
            background_color: Color::rgb(0x0a, 0x0a, 0x12),
            color_mode: ColorMode::Solid,
            rainbow_mode: false,
            color_cycle_speed: ranges::COLOR_CYCLE_SPEED.default,

            show_bars: true,
            spectrum_style: SpectrumStyle::Bars,
            spectrum_scale: ranges::SPECTRUM_SCALE.default,
            bar_count: ranges::BAR_COUNT.default as u32,
            bar_width: ranges::BAR_WIDTH.default,
            bar_height_scale: ranges::BAR_HEIGHT_SCALE.default,
            bar_roundness: ranges::BAR_ROUNDNESS.default,
            fill_opacity: ranges::FILL_OPACITY.default,
            bloom_strength: ranges::BLOOM_STRENGTH.default,
            sensitivity: ranges::SENSITIVITY.default,
            smoothing: ranges::SMOOTHING.default,

            show_particles: true,
            particle_count: ranges::PARTICLE_COUNT.default as u32,
            particle_speed: ranges::PARTICLE_SPEED.default,

            background_image: None,
            background_opacity: ranges::BACKGROUND_OPACITY.default,
            background_blur: ranges::BACKGROUND_BLUR.default,
            center_image: None,
            center_image_size: ranges::CENTER_IMAGE_SIZE.default,
            center_image_circular: true,

            show_text: true,
            text_line1: "BEATFRAME".to_owned(),
            text_line2: String::new(),
            font_family: "sans-serif".to_owned(),
            text_size: ranges::TEXT_SIZE.default,
            text_color: Color::rgb(0xff, 0xff, 0xff),
            text_opacity: ranges::TEXT_OPACITY.default,
            letter_spacing: ranges::LETTER_SPACING.default,
            text_shadow: true,
        }
    }
}

impl SceneConfig {
    /// Copy with every numeric field clamped into its valid range.
    ///
    /// Non-finite values become the field default.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.rotation_speed = ranges::ROTATION_SPEED.clamp(self.rotation_speed);
        out.vignette = ranges::VIGNETTE.clamp(self.vignette);
        out.shake_strength = ranges::SHAKE_STRENGTH.clamp(self.shake_strength);
        out.color_cycle_speed = ranges::COLOR_CYCLE_SPEED.clamp(self.color_cycle_speed);
        out.spectrum_scale = ranges::SPECTRUM_SCALE.clamp(self.spectrum_scale);
        out.bar_count = ranges::BAR_COUNT.clamp_u32(self.bar_count);
        out.bar_width = ranges::BAR_WIDTH.clamp(self.bar_width);
        out.bar_height_scale = ranges::BAR_HEIGHT_SCALE.clamp(self.bar_height_scale);
        out.bar_roundness = ranges::BAR_ROUNDNESS.clamp(self.bar_roundness);
        out.fill_opacity = ranges::FILL_OPACITY.clamp(self.fill_opacity);
        out.bloom_strength = ranges::BLOOM_STRENGTH.clamp(self.bloom_strength);
        out.sensitivity = ranges::SENSITIVITY.clamp(self.sensitivity);
        out.smoothing = ranges::SMOOTHING.clamp(self.smoothing);
        out.particle_count = ranges::PARTICLE_COUNT.clamp_u32(self.particle_count);
        out.particle_speed = ranges::PARTICLE_SPEED.clamp(self.particle_speed);
        out.background_opacity = ranges::BACKGROUND_OPACITY.clamp(self.background_opacity);
        out.background_blur = ranges::BACKGROUND_BLUR.clamp(self.background_blur);
        out.center_image_size = ranges::CENTER_IMAGE_SIZE.clamp(self.center_image_size);
        out.text_size = ranges::TEXT_SIZE.clamp(self.text_size);
        out.text_opacity = ranges::TEXT_OPACITY.clamp(self.text_opacity);
        out.letter_spacing = ranges::LETTER_SPACING.clamp(self.letter_spacing);
        out
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> crate::BeatframeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::BeatframeError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
