use super::*;

#[test]
fn over_opaque_replaces_and_transparent_keeps() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 1.0), [9, 8, 7, 255]);
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 0], 1.0), [1, 2, 3, 255]);
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 0.0), [1, 2, 3, 255]);
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], f32::NAN), [1, 2, 3, 255]);
}

#[test]
fn over_half_alpha_blends() {
    let out = over([0, 0, 0, 255], [128, 0, 0, 128], 1.0);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    over_in_place(&mut dst, &[255, 255, 255, 255, 0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255, 0, 0, 0, 0]);
}

#[test]
fn vignette_darkens_corners_not_center() {
    let (w, h) = (9u32, 9u32);
    let mut buf = [200u8, 200, 200, 255].repeat((w * h) as usize);
    apply_vignette(&mut buf, w, h, 1.0);
    let center = ((4 * w + 4) * 4) as usize;
    assert_eq!(buf[center], 200);
    assert!(buf[0] < 100);
    assert_eq!(buf[3], 255);
}

#[test]
fn vignette_zero_is_noop() {
    let mut buf = vec![7u8; 16];
    apply_vignette(&mut buf, 2, 2, 0.0);
    assert_eq!(buf, vec![7u8; 16]);
}

#[test]
fn letterbox_paints_top_and_bottom_rows() {
    let (w, h) = (2u32, 6u32);
    let mut buf = vec![255u8; (w * h * 4) as usize];
    apply_letterbox(&mut buf, w, h, 1);
    let row = |y: usize| &buf[y * 8..(y + 1) * 8];
    assert_eq!(row(0), &[0, 0, 0, 255, 0, 0, 0, 255]);
    assert_eq!(row(5), &[0, 0, 0, 255, 0, 0, 0, 255]);
    assert_eq!(row(2), &[255u8; 8]);
}

#[test]
fn offset_over_shifts_source_and_keeps_uncovered_pixels() {
    // 3x1 row: src has a single opaque red pixel at x=0
    let mut dst = [0u8, 0, 255, 255].repeat(3);
    let mut src = vec![0u8; 12];
    src[..4].copy_from_slice(&[255, 0, 0, 255]);
    over_offset_in_place(&mut dst, &src, 3, (2, 0), 1.0).unwrap();
    assert_eq!(&dst[..4], &[0, 0, 255, 255]);
    assert_eq!(&dst[8..], &[255, 0, 0, 255]);

    let mut dst = [0u8, 0, 255, 255].repeat(3);
    over_offset_in_place(&mut dst, &src, 3, (0, 1), 1.0).unwrap();
    assert_eq!(dst, [0u8, 0, 255, 255].repeat(3));
    assert!(over_offset_in_place(&mut dst, &src[..8], 3, (1, 0), 1.0).is_err());
}
