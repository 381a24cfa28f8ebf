use super::*;
use crate::audio::analyser::AnalyserOpts;

fn ones(frames: usize) -> AudioTrack {
    AudioTrack::from_pcm(100, 2, vec![1.0; frames * 2]).unwrap()
}

#[test]
fn mute_and_volume_affect_only_the_speaker() {
    let mut g = AudioGraph::new(ones(100));
    g.set_volume(0.5);
    assert_eq!(g.speaker_samples(0.0, 0.1), vec![0.5; 20]);

    g.set_muted(true);
    assert!(g.speaker_samples(0.0, 0.1).iter().all(|&s| s == 0.0));

    g.enable_capture_tap(0.0);
    assert_eq!(g.pull_capture(0.1), vec![1.0; 20]);
}

#[test]
fn volume_is_clamped() {
    let mut g = AudioGraph::new(ones(10));
    g.set_volume(3.0);
    assert_eq!(g.volume(), 1.0);
    g.set_volume(-1.0);
    assert_eq!(g.volume(), 0.0);
    g.set_volume(f64::NAN);
    assert_eq!(g.volume(), 0.0);
}

#[test]
fn capture_tap_pulls_each_sample_once() {
    let mut g = AudioGraph::new(ones(100));
    assert!(g.pull_capture(0.5).is_empty());

    g.enable_capture_tap(0.2);
    assert_eq!(g.pull_capture(0.5).len(), 60);
    assert!(g.pull_capture(0.5).is_empty());
    assert_eq!(g.pull_capture(2.0).len(), 100);

    g.disable_capture_tap();
    assert!(!g.capture_tap_enabled());
    assert!(g.pull_capture(3.0).is_empty());
}

#[test]
fn analyser_sees_signal_regardless_of_mute() {
    let pcm: Vec<f32> = (0..4800)
        .flat_map(|i| {
            let s = (std::f32::consts::TAU * 8.0 * i as f32 / 512.0).sin();
            [s, s]
        })
        .collect();
    let mut g = AudioGraph::new(AudioTrack::from_pcm(48_000, 2, pcm).unwrap());
    g.set_muted(true);

    let mut a = FrequencyAnalyser::new(AnalyserOpts {
        smoothing: 0.0,
        ..AnalyserOpts::default()
    })
    .unwrap();
    g.feed_analyser(&mut a, 0.05);

    let mut snap = vec![0u8; a.bin_count()];
    a.get_snapshot(&mut snap);
    assert!(snap[8] > 200);
}
