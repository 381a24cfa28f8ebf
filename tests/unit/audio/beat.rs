use super::*;
use approx::assert_relative_eq;

#[test]
fn beat_requires_average_strictly_above_threshold() {
    let d = BeatDetector::default();
    let mut snap = [0u8; 256];

    snap[..16].fill(200);
    assert!(!d.detect(&snap).is_beat);

    snap[..16].fill(201);
    let r = d.detect(&snap);
    assert!(r.is_beat);
    assert_relative_eq!(r.bass_average, 201.0);
    assert_relative_eq!(r.intensity, 201.0 / 255.0);
}

#[test]
fn only_bass_bins_count() {
    let d = BeatDetector::default();
    let mut snap = [255u8; 64];
    snap[..16].fill(0);
    assert!(!d.detect(&snap).is_beat);
}

#[test]
fn detection_is_deterministic() {
    let d = BeatDetector::default();
    let snap: Vec<u8> = (0..256).map(|i| (255 - i) as u8).collect();
    let a = d.detect(&snap);
    for _ in 0..10 {
        assert_eq!(d.detect(&snap), a);
    }
}

#[test]
fn bass_bins_are_clamped_to_snapshot() {
    let d = BeatDetector::new(BeatDetectorOpts {
        bass_bins: 1000,
        threshold: 10.0,
    });
    assert!(d.detect(&[255, 255, 255]).is_beat);

    let zero = BeatDetector::new(BeatDetectorOpts {
        bass_bins: 0,
        threshold: 10.0,
    });
    assert!(zero.detect(&[255, 0, 0]).is_beat);
    assert_eq!(zero.detect(&[]), BeatReading::default());
}
