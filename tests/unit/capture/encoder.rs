use super::*;
use crate::capture::profile::{EncoderProbe, PROBE_LIST};

fn cfg(w: u32, h: u32) -> EncoderConfig {
    EncoderConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
        video_bitrate: 1_000_000,
        profile: PROBE_LIST[0],
        audio_sample_rate: 48_000,
        audio_channels: 2,
    }
}

#[test]
fn flatten_premul_over_black_keeps_premul_channels() {
    let src = [100u8, 50, 0, 128, 255, 255, 255, 255];
    let mut dst = [0u8; 8];
    flatten_premul_over_bg(&mut dst, &src, [0, 0, 0]);
    assert_eq!(dst, [100, 50, 0, 255, 255, 255, 255, 255]);
}

#[test]
fn flatten_transparent_over_bg_yields_bg() {
    let src = [0u8, 0, 0, 0];
    let mut dst = [0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30]);
    assert_eq!(dst, [10, 20, 30, 255]);
}

#[test]
fn in_memory_encoder_emits_ordered_chunks() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut enc = InMemoryEncoder::new();
    let stats = enc.stats();
    enc.start(&cfg(2, 2), tx).unwrap();
    enc.encode_video(&[0u8; 16]).unwrap();
    enc.encode_audio(&[0.0; 8]).unwrap();
    enc.encode_video(&[0u8; 16]).unwrap();
    enc.stop().unwrap();

    let chunks: Vec<Vec<u8>> = rx.iter().map(|c| c.bytes).collect();
    assert_eq!(
        chunks,
        vec![
            b"HEAD".to_vec(),
            b"V0".to_vec(),
            b"A8".to_vec(),
            b"V1".to_vec(),
            b"TAIL".to_vec()
        ]
    );
    let s = stats.lock().unwrap().clone();
    assert_eq!(s.starts, 1);
    assert_eq!(s.frames, 2);
    assert_eq!(s.audio_samples, 8);
    assert!(s.stopped);
    assert!(!s.aborted);
}

#[test]
fn in_memory_encoder_rejects_wrong_frame_size() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let mut enc = InMemoryEncoder::new();
    enc.start(&cfg(2, 2), tx).unwrap();
    assert!(enc.encode_video(&[0u8; 15]).is_err());
}

#[test]
fn failure_injection() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    assert!(InMemoryEncoder::failing_start().start(&cfg(2, 2), tx.clone()).is_err());

    let mut enc = InMemoryEncoder::failing_after(1);
    enc.start(&cfg(2, 2), tx).unwrap();
    enc.encode_video(&[0u8; 16]).unwrap();
    let err = enc.encode_video(&[0u8; 16]).unwrap_err();
    assert!(err.is_capture());
}

#[test]
fn ffmpeg_encoder_rejects_odd_dimensions() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let mut enc = FfmpegEncoder::new();
    let err = enc.start(&cfg(3, 2), tx).unwrap_err();
    assert!(matches!(err, BeatframeError::Validation(_)));
}

#[test]
fn ffmpeg_encoder_requires_start() {
    let mut enc = FfmpegEncoder::new();
    assert!(enc.encode_video(&[0u8; 16]).is_err());
    assert!(enc.stop().is_err());
    enc.abort();
}

#[test]
fn ffmpeg_encoder_produces_container_bytes() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut enc = FfmpegEncoder::new();
    let mut c = cfg(16, 16);
    c.profile = crate::capture::profile::PROBE_LIST[0];
    let probe = crate::capture::profile::FfmpegProbe::detect();
    if !probe.is_supported(&c.profile) {
        return;
    }
    enc.start(&c, tx).unwrap();
    let frame = vec![255u8; 16 * 16 * 4];
    for _ in 0..5 {
        enc.encode_video(&frame).unwrap();
    }
    enc.encode_audio(&vec![0.0f32; 48_000 / 6 * 2]).unwrap();
    enc.stop().unwrap();
    drop(enc);
    let total: usize = rx.iter().map(|c| c.bytes.len()).sum();
    assert!(total > 0);
}
