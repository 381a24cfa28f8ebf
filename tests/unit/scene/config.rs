use super::*;
use serde_json::json;

#[test]
fn default_values_match_range_defaults() {
    let c = SceneConfig::default();
    assert_eq!(c.bar_count, 64);
    assert_eq!(c.particle_count, 100);
    assert_eq!(c.smoothing, 0.8);
    assert_eq!(c.mode, LayoutMode::Circular);
    assert_eq!(c.sanitized(), c);
}

#[test]
fn serializes_camel_case_with_lowercase_enums() {
    let v = serde_json::to_value(SceneConfig::default()).unwrap();
    assert_eq!(v["barCount"], json!(64));
    assert_eq!(v["mode"], json!("circular"));
    assert_eq!(v["spectrumStyle"], json!("bars"));
    assert_eq!(v["backgroundImage"], json!(null));
    assert!(v.get("bar_count").is_none());
}

#[test]
fn partial_document_fills_defaults() {
    let c: SceneConfig =
        serde_json::from_value(json!({"mode": "linear", "barCount": 128})).unwrap();
    assert_eq!(c.mode, LayoutMode::Linear);
    assert_eq!(c.bar_count, 128);
    assert_eq!(c.vignette, SceneConfig::default().vignette);
}

#[test]
fn sanitized_clamps_and_replaces_non_finite() {
    let c = SceneConfig {
        bar_count: 10_000,
        particle_count: 9_999,
        vignette: -3.0,
        smoothing: 1.0,
        sensitivity: f64::NAN,
        shake_strength: f64::INFINITY,
        ..SceneConfig::default()
    };
    let s = c.sanitized();
    assert_eq!(s.bar_count, 256);
    assert_eq!(s.particle_count, 500);
    assert_eq!(s.vignette, 0.0);
    assert_eq!(s.smoothing, 0.99);
    assert_eq!(s.sensitivity, ranges::SENSITIVITY.default);
    assert_eq!(s.shake_strength, ranges::SHAKE_STRENGTH.default);

    let low = SceneConfig {
        bar_count: 0,
        ..SceneConfig::default()
    };
    assert_eq!(low.sanitized().bar_count, 8);
}
