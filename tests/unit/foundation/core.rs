use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::whole(60).unwrap().frame_duration_secs(), 1.0 / 60.0);
}

#[test]
fn canvas_scale_factor_is_relative_to_canonical_width() {
    assert_eq!(Canvas::CANONICAL.scale_factor(), 1.0);
    assert_eq!(Canvas::new(1280, 720).unwrap().scale_factor(), 1280.0 / 1920.0);
    assert_eq!(Canvas::new(3840, 2160).unwrap().scale_factor(), 2.0);
}

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap().rgba8_len(), 32);
}

#[test]
fn premul_conversion_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
}
