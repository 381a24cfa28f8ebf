use super::*;

fn ramp_stereo(frames: usize) -> AudioTrack {
    let mut pcm = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        pcm.push(i as f32);
        pcm.push(-(i as f32));
    }
    AudioTrack::from_pcm(100, 2, pcm).unwrap()
}

#[test]
fn from_pcm_validates_shape() {
    assert!(AudioTrack::from_pcm(0, 2, vec![]).is_err());
    assert!(AudioTrack::from_pcm(48_000, 0, vec![]).is_err());
    assert!(AudioTrack::from_pcm(48_000, 2, vec![0.0; 3]).is_err());
}

#[test]
fn duration_and_frame_lookup() {
    let t = ramp_stereo(250);
    assert_eq!(t.frame_len(), 250);
    assert!((t.duration_secs() - 2.5).abs() < 1e-12);
    assert_eq!(t.frame_at(-1.0), 0);
    assert_eq!(t.frame_at(1.0), 100);
    assert_eq!(t.frame_at(99.0), 250);
    assert_eq!(t.frame_at(f64::NAN), 0);
}

#[test]
fn interleaved_range_is_clamped() {
    let t = ramp_stereo(10);
    assert_eq!(t.interleaved_range(2, 4), &[2.0, -2.0, 3.0, -3.0]);
    assert_eq!(t.interleaved_range(8, 100).len(), 4);
    assert!(t.interleaved_range(50, 60).is_empty());
}

#[test]
fn window_mono_pads_with_silence() {
    let pcm: Vec<f32> = (0..10).flat_map(|i| [i as f32, i as f32]).collect();
    let t = AudioTrack::from_pcm(10, 2, pcm).unwrap();

    let mut w = [9.0f32; 4];
    t.window_mono(0.2, &mut w);
    assert_eq!(w, [0.0, 0.0, 0.0, 1.0]);

    t.window_mono(1.0, &mut w);
    assert_eq!(w, [6.0, 7.0, 8.0, 9.0]);

    t.window_mono(5.0, &mut w);
    assert_eq!(w, [6.0, 7.0, 8.0, 9.0]);
}
