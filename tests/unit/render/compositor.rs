use super::*;
use crate::scene::color::Color;
use crate::scene::config::{SpectrumStyle, ranges};
use std::io::Cursor;

fn small() -> Canvas {
    Canvas::new(192, 108).unwrap()
}

fn plain_cfg() -> SceneConfig {
    SceneConfig {
        background_color: Color::rgb(10, 20, 30),
        vignette: 0.0,
        bloom_strength: 0.0,
        show_text: false,
        show_particles: false,
        ..SceneConfig::default()
    }
}

fn input<'a>(cfg: &'a SceneConfig, snapshot: Option<&'a [u8]>, particles: &'a [Particle]) -> FrameInput<'a> {
    FrameInput {
        config: cfg,
        snapshot,
        beat: BeatReading::default(),
        particles,
        time_secs: 0.0,
    }
}

fn px(r: &FrameRenderer, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * r.canvas().width + x) * 4) as usize;
    let d = r.pixels();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

fn all_background(r: &FrameRenderer, bg: [u8; 4]) -> bool {
    r.pixels().chunks_exact(4).all(|p| p == bg)
}

#[test]
fn disabled_layers_leave_background_only() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let cfg = SceneConfig {
        show_bars: false,
        ..plain_cfg()
    };
    r.render(&input(&cfg, Some(&[255u8; 256]), &[]));
    assert!(all_background(&r, [10, 20, 30, 255]));
}

#[test]
fn missing_snapshot_skips_spectrum() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let cfg = plain_cfg();
    r.render(&input(&cfg, None, &[]));
    assert!(all_background(&r, [10, 20, 30, 255]));
}

#[test]
fn loud_snapshot_draws_spectrum_in_both_modes() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let loud = [255u8; 256];
    for mode in [LayoutMode::Circular, LayoutMode::Linear, LayoutMode::Circular] {
        let cfg = SceneConfig {
            mode,
            ..plain_cfg()
        };
        r.render(&input(&cfg, Some(&loud), &[]));
        assert!(!all_background(&r, [10, 20, 30, 255]), "{mode:?}");
    }
}

#[test]
fn every_style_renders_with_bloom() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let loud = [200u8; 256];
    for style in [SpectrumStyle::Bars, SpectrumStyle::Wave, SpectrumStyle::Curve] {
        let cfg = SceneConfig {
            spectrum_style: style,
            bloom_strength: 20.0,
            ..plain_cfg()
        };
        r.render(&input(&cfg, Some(&loud), &[]));
        assert!(!all_background(&r, [10, 20, 30, 255]), "{style:?}");
    }
}

#[test]
fn extreme_configs_render() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let loud = [255u8; 256];
    let beat = BeatReading {
        is_beat: true,
        bass_average: 255.0,
        intensity: 1.0,
    };
    let min = SceneConfig {
        rotation_speed: ranges::ROTATION_SPEED.min,
        vignette: 0.0,
        spectrum_scale: ranges::SPECTRUM_SCALE.min,
        bar_count: 8,
        bar_width: ranges::BAR_WIDTH.min,
        bar_height_scale: ranges::BAR_HEIGHT_SCALE.min,
        bar_roundness: 0.0,
        sensitivity: ranges::SENSITIVITY.min,
        text_size: ranges::TEXT_SIZE.min,
        center_image_size: ranges::CENTER_IMAGE_SIZE.min,
        ..SceneConfig::default()
    };
    let max = SceneConfig {
        rotation_speed: ranges::ROTATION_SPEED.max,
        vignette: 1.0,
        shake_strength: ranges::SHAKE_STRENGTH.max,
        spectrum_scale: ranges::SPECTRUM_SCALE.max,
        bar_count: 256,
        bar_width: ranges::BAR_WIDTH.max,
        bar_height_scale: ranges::BAR_HEIGHT_SCALE.max,
        bar_roundness: 1.0,
        bloom_strength: ranges::BLOOM_STRENGTH.max,
        sensitivity: ranges::SENSITIVITY.max,
        cinematic_bars: true,
        rainbow_mode: true,
        mirror: true,
        background_image: Some("/no/such/bg.png".to_owned()),
        background_blur: ranges::BACKGROUND_BLUR.max,
        center_image: Some("/no/such/center.png".to_owned()),
        ..SceneConfig::default()
    };
    let wild = SceneConfig {
        bar_count: 100_000,
        vignette: f64::NAN,
        sensitivity: f64::INFINITY,
        bar_width: -4.0,
        ..SceneConfig::default()
    };
    for cfg in [min, max, wild] {
        for mode in [LayoutMode::Circular, LayoutMode::Linear] {
            let cfg = SceneConfig {
                mode,
                ..cfg.clone()
            };
            r.render(&FrameInput {
                beat,
                ..input(&cfg, Some(&loud), &[])
            });
        }
    }
}

#[test]
fn letterbox_rows_are_black() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let cfg = SceneConfig {
        cinematic_bars: true,
        show_bars: false,
        ..plain_cfg()
    };
    r.render(&input(&cfg, None, &[]));
    assert_eq!(px(&r, 5, 0), [0, 0, 0, 255]);
    assert_eq!(px(&r, 5, 107), [0, 0, 0, 255]);
    assert_eq!(px(&r, 5, 54), [10, 20, 30, 255]);
}

#[test]
fn particles_are_drawn_at_scaled_positions() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    let cfg = SceneConfig {
        show_particles: true,
        show_bars: false,
        ..plain_cfg()
    };
    let p = Particle {
        x: 960.0,
        y: 540.0,
        vx: 0.0,
        vy: 0.0,
        radius: 50.0,
        color: Color::rgb(255, 255, 255),
        life: 10,
        max_life: 10,
    };
    r.render(&input(&cfg, None, std::slice::from_ref(&p)));
    assert_eq!(px(&r, 96, 54), [255, 255, 255, 255]);
    assert_eq!(px(&r, 2, 2), [10, 20, 30, 255]);
}

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn background_image_covers_canvas() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    r.images_mut().insert_bytes("bg", &png(16, 16, [0, 255, 0, 255])).unwrap();
    let cfg = SceneConfig {
        background_image: Some("bg".to_owned()),
        show_bars: false,
        ..plain_cfg()
    };
    r.render(&input(&cfg, None, &[]));
    assert_eq!(px(&r, 96, 54), [0, 255, 0, 255]);
    assert_eq!(px(&r, 1, 1), [0, 255, 0, 255]);

    let faded = SceneConfig {
        background_opacity: 0.0,
        ..cfg
    };
    r.render(&input(&faded, None, &[]));
    assert_eq!(px(&r, 96, 54), [10, 20, 30, 255]);
}

#[test]
fn circular_center_image_is_clipped() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    r.images_mut().insert_bytes("logo", &png(8, 8, [255, 0, 0, 255])).unwrap();
    let cfg = SceneConfig {
        center_image: Some("logo".to_owned()),
        center_image_size: 1.0,
        center_image_circular: true,
        show_bars: false,
        ..plain_cfg()
    };
    r.render(&input(&cfg, None, &[]));
    assert_eq!(px(&r, 96, 54), [255, 0, 0, 255]);
    // corner of the 108x108 square, outside the inscribed circle
    assert_eq!(px(&r, 44, 2), [10, 20, 30, 255]);

    let square = SceneConfig {
        center_image_circular: false,
        ..cfg
    };
    r.render(&input(&square, None, &[]));
    assert_eq!(px(&r, 44, 2), [255, 0, 0, 255]);
}

#[test]
fn resize_changes_frame_size() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    r.resize(Canvas::new(64, 36).unwrap()).unwrap();
    let cfg = plain_cfg();
    r.render(&input(&cfg, None, &[]));
    let f = r.frame();
    assert_eq!((f.width, f.height), (64, 36));
    assert_eq!(f.data.len(), 64 * 36 * 4);
}

#[test]
fn replaced_or_removed_background_is_not_drawn_from_cache() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    r.images_mut().insert_bytes("bg", &png(16, 16, [0, 255, 0, 255])).unwrap();
    let cfg = SceneConfig {
        background_image: Some("bg".to_owned()),
        show_bars: false,
        ..plain_cfg()
    };
    r.render(&input(&cfg, None, &[]));
    assert_eq!(px(&r, 96, 54), [0, 255, 0, 255]);

    r.images_mut().insert_bytes("bg", &png(16, 16, [255, 0, 0, 255])).unwrap();
    r.render(&input(&cfg, None, &[]));
    assert_eq!(px(&r, 96, 54), [255, 0, 0, 255]);

    r.images_mut().remove("bg");
    r.render(&input(&cfg, None, &[]));
    assert_eq!(px(&r, 96, 54), [10, 20, 30, 255]);
}

#[test]
fn shake_moves_the_background_image() {
    let mut r = FrameRenderer::new(small(), RendererOpts::default()).unwrap();
    r.images_mut().insert_bytes("bg", &png(16, 16, [0, 255, 0, 255])).unwrap();
    let cfg = SceneConfig {
        background_image: Some("bg".to_owned()),
        show_bars: false,
        cinematic_bars: false,
        shake_strength: ranges::SHAKE_STRENGTH.max,
        ..plain_cfg()
    };
    let snapshot = [255u8; 64];
    let loud = FrameInput {
        beat: BeatReading {
            is_beat: true,
            bass_average: 255.0,
            intensity: 1.0,
        },
        ..input(&cfg, Some(&snapshot), &[])
    };
    let bg = [10, 20, 30, 255];
    let mut exposed = false;
    for _ in 0..10 {
        r.render(&loud);
        exposed |= px(&r, 0, 54) == bg || px(&r, 191, 54) == bg;
    }
    assert!(exposed);

    r.render(&input(&cfg, Some(&snapshot), &[]));
    assert_eq!(px(&r, 0, 54), [0, 255, 0, 255]);
}
