use super::*;

#[test]
fn radius_zero_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (6u32, 4u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap(), src);
}

#[test]
fn energy_spreads_symmetrically_from_a_point() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.0).unwrap();
    assert!(out[center + 3] < 255);
    let left = ((2 * w + 1) * 4 + 3) as usize;
    let right = ((2 * w + 3) * 4 + 3) as usize;
    assert!(out[left] > 0);
    assert_eq!(out[left], out[right]);
}

#[test]
fn rejects_bad_inputs() {
    assert!(blur_rgba8_premul(&[0u8; 4], 2, 2, 1, 1.0).is_err());
    assert!(blur_rgba8_premul(&[0u8; 16], 2, 2, 1, 0.0).is_err());
}

#[test]
fn blur_params_threshold() {
    assert_eq!(blur_params(0.0), None);
    assert_eq!(blur_params(f64::NAN), None);
    assert_eq!(blur_params(10.0), Some((10, 5.0)));
}
