use crate::audio::analyser::{AnalyserOpts, FrequencyAnalyser};
use crate::audio::beat::{BeatDetector, BeatDetectorOpts, BeatReading};
use crate::audio::input::load_audio_file;
use crate::audio::track::AudioTrack;
use crate::capture::encoder::MediaEncoder;
use crate::capture::profile::{EncoderProbe, EncoderProfile};
use crate::capture::session::{AudioSpec, CaptureArtifact, CaptureSession};
use crate::capture::settings::ExportSettings;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{BeatframeError, BeatframeResult};
use crate::particles::system::{ParticleOpts, ParticleSystem, SpawnParams};
use crate::playback::controller::{PlaybackController, PlaybackEvent};
use crate::playback::transport::Transport;
use crate::render::compositor::{FrameInput, FrameRenderer, RendererOpts};
use crate::scene::cell::SceneCell;
use crate::scene::overlay::{ConfigGenerator, ingest_generated};
use std::path::Path;
use std::sync::Arc;

/// Tunables for every subsystem a [`Visualizer`] owns.
#[derive(Clone, Debug)]
pub struct VisualizerOpts {
    /// Preview canvas size.
    pub preview: Canvas,
    /// Frequency analysis.
    pub analyser: AnalyserOpts,
    /// Beat detection.
    pub beat: BeatDetectorOpts,
    /// Particle behaviour.
    pub particles: ParticleOpts,
    /// Particle random seed.
    pub particle_seed: u64,
    /// Renderer behaviour.
    pub renderer: RendererOpts,
}

impl Default for VisualizerOpts {
    fn default() -> Self {
        Self {
            preview: Canvas::CANONICAL,
            analyser: AnalyserOpts::default(),
            beat: BeatDetectorOpts::default(),
            particles: ParticleOpts::default(),
            particle_seed: 0xbea7,
            renderer: RendererOpts::default(),
        }
    }
}

/// What one [`Visualizer::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Playback time the frame was drawn for.
    pub time_secs: f64,
    /// Beat reading of this tick.
    pub beat: BeatReading,
    /// Particles spawned this tick.
    pub spawned: usize,
    /// Live particles after the update.
    pub particles: usize,
    /// A frame was fed to the capture session.
    pub captured_frame: bool,
    /// Playback reached the end this tick.
    pub ended: bool,
    /// A capture completed this tick.
    pub capture_completed: bool,
}

#[derive(Clone, Copy, Debug)]
struct PreviewState {
    muted: bool,
}

/// The per-tick pipeline: analysis read, beat, particles, draw, capture tap.
///
/// Owns every subsystem. The scene is shared through [`SceneCell`] so a UI thread can edit it
/// while the loop runs; each tick loads one snapshot.
pub struct Visualizer {
    scene: Arc<SceneCell>,
    analyser: FrequencyAnalyser,
    detector: BeatDetector,
    particles: ParticleSystem,
    renderer: FrameRenderer,
    playback: Option<PlaybackController>,
    capture: CaptureSession,
    snapshot: Vec<u8>,
    preview: Canvas,
    preview_state: Option<PreviewState>,
    last_beat: BeatReading,
}

impl std::fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualizer")
            .field("preview", &self.preview)
            .field("canvas", &self.renderer.canvas())
            .field("playback", &self.playback)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl Visualizer {
    /// Build a visualizer with an empty scene cell holding the default config.
    pub fn new(opts: VisualizerOpts) -> BeatframeResult<Self> {
        Self::with_scene(opts, Arc::new(SceneCell::default()))
    }

    /// Build a visualizer reading `scene`.
    pub fn with_scene(opts: VisualizerOpts, scene: Arc<SceneCell>) -> BeatframeResult<Self> {
        let analyser = FrequencyAnalyser::new(opts.analyser)?;
        let snapshot = vec![0u8; analyser.bin_count()];
        Ok(Self {
            scene,
            analyser,
            detector: BeatDetector::new(opts.beat),
            particles: ParticleSystem::new(opts.particles, opts.particle_seed),
            renderer: FrameRenderer::new(opts.preview, opts.renderer)?,
            playback: None,
            capture: CaptureSession::new(),
            snapshot,
            preview: opts.preview,
            preview_state: None,
            last_beat: BeatReading::default(),
        })
    }

    /// Shared scene handle.
    pub fn scene(&self) -> &Arc<SceneCell> {
        &self.scene
    }

    /// Renderer (canvas pixels, asset stores).
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Mutable renderer, for registering images and fonts.
    pub fn renderer_mut(&mut self) -> &mut FrameRenderer {
        &mut self.renderer
    }

    /// Particle population.
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Capture session.
    pub fn capture(&self) -> &CaptureSession {
        &self.capture
    }

    /// Move the finished export out.
    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.capture.take_artifact()
    }

    /// Playback controller, once a track is loaded.
    pub fn playback(&self) -> Option<&PlaybackController> {
        self.playback.as_ref()
    }

    /// Mutable playback controller.
    pub fn playback_mut(&mut self) -> Option<&mut PlaybackController> {
        self.playback.as_mut()
    }

    /// Beat reading of the last tick.
    pub fn last_beat(&self) -> BeatReading {
        self.last_beat
    }

    /// Preview canvas size.
    pub fn preview_canvas(&self) -> Canvas {
        self.preview
    }

    /// Change the preview size. Applied immediately unless a capture is running.
    pub fn set_preview_canvas(&mut self, canvas: Canvas) -> BeatframeResult<()> {
        if !self.capture.is_active() {
            self.renderer.resize(canvas)?;
        }
        self.preview = canvas;
        Ok(())
    }

    /// Replace the track. Cancels any running capture and forgets analysis history.
    pub fn load_track(&mut self, track: AudioTrack, transport: Box<dyn Transport>) {
        if self.capture.is_active() {
            let _ = self.cancel_capture();
        }
        self.analyser.reset();
        self.particles.clear();
        self.playback = Some(PlaybackController::new(track, transport));
        tracing::debug!("track loaded");
    }

    /// Validate, decode and load an audio file; when `generator` is given, its config is
    /// overlaid onto the defaults and stored in the scene.
    ///
    /// Returns `Ok(false)` when the file is not an audio type.
    #[tracing::instrument(skip(self, generator, transport), fields(path = %path.display()))]
    pub fn load_audio(
        &mut self,
        path: &Path,
        mime_type: Option<&str>,
        generator: Option<&dyn ConfigGenerator>,
        transport: Box<dyn Transport>,
    ) -> BeatframeResult<bool> {
        let Some(file) = load_audio_file(path, mime_type)? else {
            tracing::debug!("not an audio file, ignored");
            return Ok(false);
        };
        let track = AudioTrack::decode(path)?;
        if let Some(generator) = generator {
            let cfg = ingest_generated(generator, &file.bytes, &file.mime_type, &file.file_name);
            self.scene.store(cfg);
        }
        self.load_track(track, transport);
        Ok(true)
    }

    /// Seek playback and drop the particle population.
    pub fn seek(&mut self, secs: f64) {
        if let Some(pb) = self.playback.as_mut() {
            pb.seek(secs);
        }
        self.particles.clear();
    }

    /// Run one frame of the pipeline.
    ///
    /// Rendering never fails. An error is returned only when the capture session failed this
    /// tick; the preview has already been restored by then.
    pub fn tick(&mut self) -> BeatframeResult<TickReport> {
        let cfg = self.scene.load().sanitized();
        self.analyser.set_smoothing(cfg.smoothing as f32);

        let mut time_secs = 0.0;
        if let Some(pb) = self.playback.as_mut() {
            time_secs = pb.current_time();
            let playing = pb.is_playing();
            if let Some(graph) = pb.graph_mut() {
                if playing {
                    graph.feed_analyser(&mut self.analyser, time_secs);
                } else if self.analyser.is_connected() {
                    self.analyser.process(&[]);
                }
            }
        }

        let snapshot = if self.analyser.is_connected() {
            self.analyser.get_snapshot(&mut self.snapshot);
            Some(self.snapshot.as_slice())
        } else {
            None
        };
        let beat = snapshot.map(|s| self.detector.detect(s)).unwrap_or_default();
        self.last_beat = beat;

        let spawned = if cfg.show_particles {
            let params = SpawnParams {
                cap: cfg.particle_count as usize,
                speed: cfg.particle_speed,
                origin: Point::new(
                    f64::from(Canvas::CANONICAL.width) / 2.0,
                    f64::from(Canvas::CANONICAL.height) / 2.0,
                ),
                primary: cfg.primary_color,
                secondary: cfg.secondary_color,
                rainbow: cfg.rainbow_mode,
            };
            self.particles.tick(beat.is_beat, &params)
        } else {
            self.particles.clear();
            0
        };

        self.renderer.render(&FrameInput {
            config: &cfg,
            snapshot,
            beat,
            particles: self.particles.particles(),
            time_secs,
        });

        let mut report = TickReport {
            time_secs,
            beat,
            spawned,
            particles: self.particles.len(),
            ..TickReport::default()
        };

        if self.capture.is_active() {
            report.captured_frame = self.feed_capture(time_secs)?;
        }

        let ended = self
            .playback
            .as_mut()
            .and_then(PlaybackController::poll)
            .is_some_and(|e| e == PlaybackEvent::Ended);
        report.ended = ended;

        if self.capture.is_active() {
            let duration = self.playback.as_ref().map_or(0.0, PlaybackController::duration);
            let poll_hit = self.capture.poll_end(time_secs, duration);
            if ended || poll_hit {
                self.finish_capture(&cfg.preset_name)?;
                report.capture_completed = true;
            }
        }

        Ok(report)
    }

    fn feed_capture(&mut self, time_secs: f64) -> BeatframeResult<bool> {
        let Some(pb) = self.playback.as_mut() else {
            return Ok(false);
        };
        let duration = pb.duration();
        let pcm = pb
            .graph_mut()
            .map(|g| g.pull_capture(time_secs))
            .unwrap_or_default();

        match push_capture(&mut self.capture, self.renderer.pixels(), &pcm, time_secs, duration) {
            Ok(pushed) => Ok(pushed),
            Err(err) => {
                self.restore_preview();
                Err(err)
            }
        }
    }

    /// Start exporting the loaded track from the beginning.
    ///
    /// The renderer switches to the export resolution and the speaker branch is muted until the
    /// session ends. Nothing changes when the session cannot start.
    #[tracing::instrument(skip(self, probe, encoder))]
    pub fn start_capture(
        &mut self,
        settings: ExportSettings,
        probe: &dyn EncoderProbe,
        encoder: Box<dyn MediaEncoder>,
    ) -> BeatframeResult<EncoderProfile> {
        if self.capture.is_active() {
            return Err(BeatframeError::CaptureInProgress);
        }
        let Some(pb) = self.playback.as_ref() else {
            return Err(BeatframeError::validation("no audio loaded"));
        };
        let audio = AudioSpec {
            sample_rate: pb.track().sample_rate(),
            channels: pb.track().channels(),
        };

        let profile = self.capture.start(settings, probe, encoder, audio, 0.0)?;
        if let Err(err) = self.renderer.resize(settings.resolution.canvas()) {
            let _ = self.capture.cancel();
            return Err(err);
        }

        if let Some(pb) = self.playback.as_mut() {
            let muted = pb.is_muted();
            pb.seek(0.0);
            pb.set_muted(true);
            if let Some(g) = pb.graph_mut() {
                g.enable_capture_tap(0.0);
            }
            pb.play();
            self.preview_state = Some(PreviewState { muted });
        }
        self.particles.clear();
        Ok(profile)
    }

    /// Stop early and discard the recording. Playback resumes audibly at the preview size.
    pub fn cancel_capture(&mut self) -> BeatframeResult<()> {
        self.capture.cancel()?;
        self.restore_preview();
        if let Some(pb) = self.playback.as_mut() {
            pb.play();
        }
        Ok(())
    }

    /// Flush the encoder now and keep the artifact.
    pub fn finish_capture(&mut self, preset_name: &str) -> BeatframeResult<()> {
        let res = self.capture.stop(preset_name).map(|_| ());
        self.restore_preview();
        res
    }

    fn restore_preview(&mut self) {
        if let Err(e) = self.renderer.resize(self.preview) {
            tracing::debug!(error = %e, "failed to restore preview canvas");
        }
        if let Some(pb) = self.playback.as_mut() {
            if let Some(g) = pb.graph_mut() {
                g.disable_capture_tap();
            }
            if let Some(state) = self.preview_state.take() {
                pb.set_muted(state.muted);
            }
        }
    }
}

fn push_capture(
    capture: &mut CaptureSession,
    pixels: &[u8],
    pcm: &[f32],
    time_secs: f64,
    duration: f64,
) -> BeatframeResult<bool> {
    if !pcm.is_empty() {
        capture.push_audio(pcm)?;
    }
    let mut pushed = false;
    if capture.wants_frame(time_secs) {
        capture.push_frame(pixels, time_secs)?;
        pushed = true;
    }
    capture.update_progress(time_secs, duration);
    Ok(pushed)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/visualizer.rs"]
mod tests;
