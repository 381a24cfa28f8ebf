//! Beatframe is a real-time audio-reactive visualizer.
//!
//! One [`Visualizer`] owns the whole per-tick pipeline:
//!
//! - Read a frequency snapshot from the [`FrequencyAnalyser`] fed by the playing track
//! - Detect beats ([`BeatDetector`]) and spawn/update particles ([`ParticleSystem`])
//! - Draw the scene described by a [`SceneConfig`] with the CPU [`FrameRenderer`]
//! - While exporting, tap frames and audio into a [`CaptureSession`] backed by a
//!   [`MediaEncoder`] (ffmpeg by default)
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod audio;
pub(crate) mod capture;
pub(crate) mod engine;
pub(crate) mod particles;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Fps, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{BeatframeError, BeatframeResult};

pub use crate::audio::analyser::{AnalyserOpts, FrequencyAnalyser};
pub use crate::audio::beat::{BeatDetector, BeatDetectorOpts, BeatReading};
pub use crate::audio::input::{
    AUDIO_EXTENSIONS, AudioFile, MAX_AUDIO_BYTES, is_audio_type, load_audio_file,
    validate_audio_input,
};
pub use crate::audio::track::{AudioTrack, MIX_SAMPLE_RATE};
pub use crate::capture::encoder::{
    EncodedChunk, EncoderConfig, FfmpegEncoder, InMemoryEncoder, InMemoryStats, MediaEncoder,
    is_ffmpeg_on_path,
};
pub use crate::capture::profile::{
    Container, EncoderProbe, EncoderProfile, FfmpegProbe, PROBE_LIST, StaticProbe, select_profile,
};
pub use crate::capture::session::{
    AudioSpec, CaptureArtifact, CaptureSession, CaptureState, END_POLL_INTERVAL_SECS,
    MAX_PROGRESS_BEFORE_FLUSH,
};
pub use crate::capture::settings::{
    ExportFrameRate, ExportQuality, ExportResolution, ExportSettings, slugify,
};
pub use crate::engine::frame_loop::{FrameLoop, LoopHandle};
pub use crate::engine::visualizer::{TickReport, Visualizer, VisualizerOpts};
pub use crate::particles::system::{Particle, ParticleOpts, ParticleSystem, SpawnParams};
pub use crate::playback::controller::{ContextState, PlaybackController, PlaybackEvent};
pub use crate::playback::graph::AudioGraph;
pub use crate::playback::transport::{SteppedClock, Transport, WallClock};
pub use crate::render::compositor::{FrameInput, FrameRenderer, RendererOpts};
pub use crate::render::cpu::FrameRGBA;
pub use crate::render::image::{ImageStore, PreparedImage, decode_image};
pub use crate::render::text::FontBook;
pub use crate::scene::cell::SceneCell;
pub use crate::scene::color::Color;
pub use crate::scene::config::{
    ColorMode, FieldRange, LayoutMode, SceneConfig, SpectrumStyle, ranges,
};
pub use crate::scene::overlay::{
    ConfigGenerator, PRESET_NAMES, StaticGenerator, apply_overlay, ingest_generated, preset,
};
