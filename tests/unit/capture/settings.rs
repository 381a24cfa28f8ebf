use super::*;

#[test]
fn resolutions_map_to_sizes() {
    assert_eq!(ExportResolution::P720.canvas(), Canvas { width: 1280, height: 720 });
    assert_eq!(ExportResolution::K4.canvas(), Canvas { width: 3840, height: 2160 });
}

#[test]
fn bitrate_scales_with_resolution() {
    let s = |resolution, quality| ExportSettings {
        resolution,
        frame_rate: ExportFrameRate::Fps30,
        quality,
    };
    assert_eq!(s(ExportResolution::P1080, ExportQuality::Low).video_bitrate(), 2_500_000);
    assert_eq!(s(ExportResolution::P720, ExportQuality::High).video_bitrate(), 8_000_000);
    assert_eq!(s(ExportResolution::K2, ExportQuality::Medium).video_bitrate(), 7_500_000);
    assert_eq!(s(ExportResolution::K4, ExportQuality::High).video_bitrate(), 16_000_000);
}

#[test]
fn file_name_is_deterministic() {
    let s = ExportSettings {
        resolution: ExportResolution::P1080,
        frame_rate: ExportFrameRate::Fps60,
        quality: ExportQuality::High,
    };
    assert_eq!(
        s.file_name("Neon  Pulse!", "mp4", 1_700_000_000),
        "neon-pulse-1080p60-1700000000.mp4"
    );
    assert_eq!(s.file_name("***", "webm", 5), "visualizer-1080p60-5.webm");
}

#[test]
fn settings_serialize_with_short_names() {
    let v = serde_json::to_value(ExportSettings::default()).unwrap();
    assert_eq!(
        v,
        serde_json::json!({"resolution": "1080p", "frameRate": "60", "quality": "high"})
    );
}

#[test]
fn clap_value_names() {
    use clap::ValueEnum;
    assert_eq!(
        ExportResolution::from_str("4k", true).unwrap(),
        ExportResolution::K4
    );
    assert_eq!(
        ExportFrameRate::from_str("30", true).unwrap(),
        ExportFrameRate::Fps30
    );
}
