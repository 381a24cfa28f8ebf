use super::*;
use crate::playback::transport::SteppedClock;
use crate::scene::config::ranges;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn small_opts() -> VisualizerOpts {
    VisualizerOpts {
        preview: Canvas::new(64, 36).unwrap(),
        beat: BeatDetectorOpts {
            threshold: 100.0,
            ..BeatDetectorOpts::default()
        },
        ..VisualizerOpts::default()
    }
}

fn noise_track(secs: usize) -> AudioTrack {
    let mut rng = StdRng::seed_from_u64(7);
    let pcm = (0..secs * 8_000 * 2)
        .map(|_| rng.random_range(-1.0f32..1.0))
        .collect();
    AudioTrack::from_pcm(8_000, 2, pcm).unwrap()
}

#[test]
fn tick_without_track_draws_static_layers() {
    let mut v = Visualizer::new(small_opts()).unwrap();
    let report = v.tick().unwrap();
    assert_eq!(report.time_secs, 0.0);
    assert!(!report.beat.is_beat);
    assert_eq!(report.particles, 0);

    let px = v.renderer().pixels();
    let center = (18 * 64 + 32) * 4;
    assert_eq!(&px[center..center + 4], &[0x0a, 0x0a, 0x12, 0xff]);
}

#[test]
fn loud_track_drives_beats_and_particles() {
    let mut v = Visualizer::new(small_opts()).unwrap();
    let clock = SteppedClock::new();
    v.load_track(noise_track(2), Box::new(clock.clone()));
    v.playback_mut().unwrap().play();

    let mut beats = 0;
    for _ in 0..20 {
        clock.advance(1.0 / 30.0);
        let r = v.tick().unwrap();
        if r.beat.is_beat {
            beats += 1;
        }
    }
    assert!(beats > 0);
    assert!(!v.particles().is_empty());
    assert!(v.last_beat().bass_average > 100.0);
}

#[test]
fn hidden_particles_are_cleared() {
    let mut v = Visualizer::new(small_opts()).unwrap();
    let clock = SteppedClock::new();
    v.load_track(noise_track(1), Box::new(clock.clone()));
    v.playback_mut().unwrap().play();
    for _ in 0..5 {
        clock.advance(1.0 / 30.0);
        v.tick().unwrap();
    }
    v.scene().update(|c| c.show_particles = false);
    clock.advance(1.0 / 30.0);
    let r = v.tick().unwrap();
    assert_eq!(r.particles, 0);
}

#[test]
fn seek_clears_particles() {
    let mut v = Visualizer::new(small_opts()).unwrap();
    let clock = SteppedClock::new();
    v.load_track(noise_track(2), Box::new(clock.clone()));
    v.playback_mut().unwrap().play();
    for _ in 0..5 {
        clock.advance(1.0 / 30.0);
        v.tick().unwrap();
    }
    v.seek(1.5);
    assert!(v.particles().is_empty());
    assert_eq!(v.playback().unwrap().current_time(), 1.5);
}

#[test]
fn capture_needs_a_track() {
    let mut v = Visualizer::new(small_opts()).unwrap();
    let err = v
        .start_capture(
            ExportSettings::default(),
            &crate::capture::profile::StaticProbe::all(),
            Box::new(crate::capture::encoder::InMemoryEncoder::new()),
        )
        .unwrap_err();
    assert!(matches!(err, BeatframeError::Validation(_)));
    assert!(matches!(v.cancel_capture(), Err(BeatframeError::NoActiveCapture)));
}

#[test]
fn preview_resize_applies_when_idle() {
    let mut v = Visualizer::new(small_opts()).unwrap();
    let c = Canvas::new(32, 18).unwrap();
    v.set_preview_canvas(c).unwrap();
    assert_eq!(v.renderer().canvas(), c);
    assert_eq!(v.preview_canvas(), c);
}

#[test]
fn load_audio_ignores_non_audio_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();
    let mut v = Visualizer::new(small_opts()).unwrap();
    let loaded = v
        .load_audio(&path, None, None, Box::new(SteppedClock::new()))
        .unwrap();
    assert!(!loaded);
    assert!(v.playback().is_none());
}

#[test]
fn out_of_range_particle_fields_are_clamped_before_spawning() {
    let mut v = Visualizer::new(VisualizerOpts {
        particles: ParticleOpts {
            batch: 50,
            ..ParticleOpts::default()
        },
        ..small_opts()
    })
    .unwrap();
    v.scene().update(|c| {
        c.particle_count = 100_000;
        c.particle_speed = f64::NAN;
        c.smoothing = 5.0;
    });
    let clock = SteppedClock::new();
    v.load_track(noise_track(2), Box::new(clock.clone()));
    v.playback_mut().unwrap().play();

    for _ in 0..40 {
        clock.advance(1.0 / 30.0);
        let r = v.tick().unwrap();
        assert!(r.particles <= ranges::PARTICLE_COUNT.max as usize);
    }
    assert!(!v.particles().is_empty());
    assert!(v.particles().particles().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
}
