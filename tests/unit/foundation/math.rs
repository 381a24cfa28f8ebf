use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 255), 0);
}

#[test]
fn unit_to_u8_clamps_and_handles_nan() {
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(2.0), 255);
    assert_eq!(unit_to_u8(f32::NAN), 0);
}

#[test]
fn clamp_finite_falls_back() {
    assert_eq!(clamp_finite(f64::INFINITY, 0.0, 1.0, 0.5), 0.5);
    assert_eq!(clamp_finite(3.0, 0.0, 1.0, 0.5), 1.0);
}

#[test]
fn hsl_primary_hues() {
    assert_eq!(hsl_to_rgb8(0.0, 1.0, 0.5), [255, 0, 0]);
    assert_eq!(hsl_to_rgb8(120.0, 1.0, 0.5), [0, 255, 0]);
    assert_eq!(hsl_to_rgb8(240.0, 1.0, 0.5), [0, 0, 255]);
    assert_eq!(hsl_to_rgb8(-120.0, 1.0, 0.5), [0, 0, 255]);
}
