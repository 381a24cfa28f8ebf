use crate::scene::color::Color;
use crate::scene::config::{ColorMode, LayoutMode, SceneConfig, SpectrumStyle};
use serde_json::{Map, Value};

/// Producer of a best-effort scene configuration from audio content.
///
/// Implementations may call out to a remote service; their output is never trusted to be
/// complete or well-typed.
pub trait ConfigGenerator {
    /// Propose a configuration as loosely-typed JSON.
    fn generate(&self, audio: &[u8], mime_type: &str, file_name: &str) -> anyhow::Result<Value>;
}

/// Generator returning a fixed JSON value. Handy for tests and for loading a config file.
#[derive(Debug, Clone)]
pub struct StaticGenerator(pub Value);

impl ConfigGenerator for StaticGenerator {
    fn generate(&self, _audio: &[u8], _mime: &str, _name: &str) -> anyhow::Result<Value> {
        Ok(self.0.clone())
    }
}

/// Overlay `value` onto `base` field by field.
///
/// Unknown keys are ignored. A field whose value does not deserialize into the field type keeps
/// the base value. Numeric fields are clamped into their valid ranges afterwards. Non-object input
/// yields `base` unchanged.
pub fn apply_overlay(base: &SceneConfig, value: &Value) -> SceneConfig {
    let Some(incoming) = value.as_object() else {
        tracing::debug!("config overlay is not an object, keeping base");
        return base.sanitized();
    };

    let mut merged: Map<String, Value> = match serde_json::to_value(base) {
        Ok(Value::Object(m)) => m,
        _ => return base.sanitized(),
    };

    for (key, field) in incoming {
        let Some(prev) = merged.get(key).cloned() else {
            tracing::debug!(key = %key, "ignoring unknown config field");
            continue;
        };
        merged.insert(key.clone(), field.clone());
        if let Err(e) = serde_json::from_value::<SceneConfig>(Value::Object(merged.clone())) {
            tracing::debug!(key = %key, error = %e, "ignoring malformed config field");
            merged.insert(key.clone(), prev);
        }
    }

    match serde_json::from_value::<SceneConfig>(Value::Object(merged)) {
        Ok(cfg) => cfg.sanitized(),
        Err(e) => {
            tracing::debug!(error = %e, "config overlay failed, keeping base");
            base.sanitized()
        }
    }
}

/// Ask `generator` for a config and overlay it onto the defaults.
///
/// Generator failure yields [`SceneConfig::default`].
#[tracing::instrument(skip(generator, audio), fields(bytes = audio.len()))]
pub fn ingest_generated(
    generator: &dyn ConfigGenerator,
    audio: &[u8],
    mime_type: &str,
    file_name: &str,
) -> SceneConfig {
    match generator.generate(audio, mime_type, file_name) {
        Ok(value) => apply_overlay(&SceneConfig::default(), &value),
        Err(e) => {
            tracing::debug!(error = %e, "config generator failed, using defaults");
            SceneConfig::default()
        }
    }
}

/// Names of the built-in presets.
pub const PRESET_NAMES: [&str; 3] = ["neon-pulse", "minimal-wave", "sunset-bloom"];

/// Built-in preset by slug.
pub fn preset(name: &str) -> Option<SceneConfig> {
    let base = SceneConfig::default();
    match name.trim().to_ascii_lowercase().as_str() {
        "neon-pulse" => Some(SceneConfig {
            preset_name: "Neon Pulse".to_owned(),
            primary_color: Color::rgb(0x00, 0xf0, 0xff),
            secondary_color: Color::rgb(0xff, 0x00, 0xaa),
            background_color: Color::rgb(0x05, 0x02, 0x10),
            spectrum_style: SpectrumStyle::Bars,
            bar_count: 96,
            bloom_strength: 18.0,
            shake_strength: 12.0,
            particle_count: 150,
            ..base
        }),
        "minimal-wave" => Some(SceneConfig {
            preset_name: "Minimal Wave".to_owned(),
            mode: LayoutMode::Linear,
            mirror: true,
            primary_color: Color::rgb(0xf5, 0xf5, 0xf5),
            secondary_color: Color::rgb(0x88, 0x88, 0x88),
            background_color: Color::rgb(0x11, 0x11, 0x11),
            spectrum_style: SpectrumStyle::Wave,
            bar_width: 3.0,
            bloom_strength: 0.0,
            vignette: 0.0,
            show_particles: false,
            ..base
        }),
        "sunset-bloom" => Some(SceneConfig {
            preset_name: "Sunset Bloom".to_owned(),
            primary_color: Color::rgb(0xff, 0x7a, 0x18),
            secondary_color: Color::rgb(0xaf, 0x00, 0x2d),
            background_color: Color::rgb(0x19, 0x08, 0x1e),
            color_mode: ColorMode::Gradient,
            spectrum_style: SpectrumStyle::Curve,
            fill_opacity: 0.45,
            bloom_strength: 24.0,
            cinematic_bars: true,
            vignette: 0.5,
            ..base
        }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/overlay.rs"]
mod tests;
