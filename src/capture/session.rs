use crate::capture::encoder::{EncodedChunk, EncoderConfig, MediaEncoder};
use crate::capture::profile::{EncoderProbe, EncoderProfile, select_profile};
use crate::capture::settings::ExportSettings;
use crate::foundation::error::{BeatframeError, BeatframeResult};
use anyhow::Context;
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Playback-clock interval between end-of-audio checks while recording.
pub const END_POLL_INTERVAL_SECS: f64 = 0.1;

/// Highest progress reported before the encoder has flushed.
pub const MAX_PROGRESS_BEFORE_FLUSH: f64 = 99.0;

static NEXT_ARTIFACT_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    /// No session; ready to start.
    #[default]
    Idle,
    /// Frames and audio are being fed to the encoder.
    Recording,
    /// The encoder is flushing.
    Stopping,
    /// An artifact is available.
    Complete,
    /// The last session was cancelled. Only reported through [`CaptureSession::last_outcome`].
    Cancelled,
    /// The encoder failed; see [`CaptureSession::last_error`].
    Failed,
}

/// Sample layout of the audio fed through the capture tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    /// Samples per second.
    pub sample_rate: u32,
    /// Interleaved channels.
    pub channels: u16,
}

/// Finished export held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    /// Process-unique `blob:` reference.
    pub reference: String,
    /// Container MIME type.
    pub mime_type: String,
    /// Suggested file name.
    pub file_name: String,
    /// Container bytes.
    pub bytes: Vec<u8>,
}

impl CaptureArtifact {
    /// Write the artifact as `dir/<file_name>` and return the path.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> BeatframeResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write artifact '{}'", path.display()))?;
        Ok(path)
    }
}

/// One export at a time: encoder ownership, frame pacing, progress and chunk assembly.
///
/// The session does not touch the canvas or the audio graph; the caller resizes the renderer
/// and routes the capture tap based on [`CaptureSession::state`].
///
/// Chunks arrive when the encoder emits them. [`FfmpegEncoder`](crate::FfmpegEncoder) emits only
/// while muxing in `stop`, so [`chunk_count`](Self::chunk_count) and
/// [`byte_len`](Self::byte_len) stay at 0 until then.
pub struct CaptureSession {
    state: CaptureState,
    last_outcome: Option<CaptureState>,
    settings: Option<ExportSettings>,
    profile: Option<EncoderProfile>,
    encoder: Option<Box<dyn MediaEncoder>>,
    chunks_rx: Option<Receiver<EncodedChunk>>,
    chunks: Vec<EncodedChunk>,
    byte_len: u64,
    progress: f64,
    frame_duration: f64,
    next_frame_time: f64,
    frames_pushed: u64,
    last_end_poll: f64,
    artifact: Option<CaptureArtifact>,
    last_error: Option<String>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("chunks", &self.chunks.len())
            .field("byte_len", &self.byte_len)
            .field("frames_pushed", &self.frames_pushed)
            .finish()
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    /// Idle session.
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            last_outcome: None,
            settings: None,
            profile: None,
            encoder: None,
            chunks_rx: None,
            chunks: Vec::new(),
            byte_len: 0,
            progress: 0.0,
            frame_duration: 0.0,
            next_frame_time: 0.0,
            frames_pushed: 0,
            last_end_poll: 0.0,
            artifact: None,
            last_error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// How the most recent session ended, if one has.
    pub fn last_outcome(&self) -> Option<CaptureState> {
        self.last_outcome
    }

    /// `true` while recording or flushing.
    pub fn is_active(&self) -> bool {
        matches!(self.state, CaptureState::Recording | CaptureState::Stopping)
    }

    /// Settings of the current or last session.
    pub fn settings(&self) -> Option<ExportSettings> {
        self.settings
    }

    /// Profile chosen for the current or last session.
    pub fn profile(&self) -> Option<EncoderProfile> {
        self.profile
    }

    /// Progress percentage in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Chunks received so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes received so far.
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Video frames fed to the encoder.
    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Artifact of the last completed session.
    pub fn artifact(&self) -> Option<&CaptureArtifact> {
        self.artifact.as_ref()
    }

    /// Move the artifact out.
    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.artifact.take()
    }

    /// Message of the error that failed the last session.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start recording.
    ///
    /// Fails with [`BeatframeError::CaptureInProgress`] while a session is active and with
    /// [`BeatframeError::UnsupportedFormat`] when `probe` accepts no profile; neither touches
    /// the running session or starts `encoder`. An encoder start failure leaves the session
    /// `Failed`.
    #[tracing::instrument(skip(self, probe, encoder), fields(resolution = ?settings.resolution, fps = settings.frame_rate.as_u32()))]
    pub fn start(
        &mut self,
        settings: ExportSettings,
        probe: &dyn EncoderProbe,
        mut encoder: Box<dyn MediaEncoder>,
        audio: AudioSpec,
        start_secs: f64,
    ) -> BeatframeResult<EncoderProfile> {
        if self.is_active() {
            return Err(BeatframeError::CaptureInProgress);
        }
        let Some(profile) = select_profile(probe) else {
            self.state = CaptureState::Idle;
            return Err(BeatframeError::UnsupportedFormat);
        };

        let canvas = settings.resolution.canvas();
        let fps = settings.frame_rate.fps();
        let cfg = EncoderConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            video_bitrate: settings.video_bitrate(),
            profile,
            audio_sample_rate: audio.sample_rate,
            audio_channels: audio.channels,
        };

        self.chunks.clear();
        self.byte_len = 0;
        self.progress = 0.0;
        self.frames_pushed = 0;
        self.artifact = None;
        self.last_error = None;
        self.settings = Some(settings);
        self.profile = Some(profile);

        let (tx, rx) = crossbeam_channel::unbounded();
        if let Err(err) = encoder.start(&cfg, tx) {
            encoder.abort();
            self.fail_with(&err);
            return Err(err);
        }

        self.encoder = Some(encoder);
        self.chunks_rx = Some(rx);
        self.frame_duration = fps.frame_duration_secs();
        self.next_frame_time = start_secs.max(0.0);
        self.last_end_poll = start_secs.max(0.0);
        self.state = CaptureState::Recording;
        tracing::debug!(mime = profile.mime_type, bitrate = cfg.video_bitrate, "capture recording");
        Ok(profile)
    }

    /// `true` when a frame is due at playback time `now_secs`.
    pub fn wants_frame(&self, now_secs: f64) -> bool {
        self.state == CaptureState::Recording && now_secs >= self.next_frame_time
    }

    /// Feed one premultiplied RGBA8 frame rendered at the export resolution.
    pub fn push_frame(&mut self, rgba8_premul: &[u8], now_secs: f64) -> BeatframeResult<()> {
        if self.state != CaptureState::Recording {
            return Err(BeatframeError::NoActiveCapture);
        }
        let res = match self.encoder.as_mut() {
            Some(enc) => enc.encode_video(rgba8_premul),
            None => Err(BeatframeError::NoActiveCapture),
        };
        if let Err(err) = res {
            self.fail(&err);
            return Err(err);
        }
        self.frames_pushed += 1;
        self.next_frame_time += self.frame_duration;
        if self.next_frame_time <= now_secs {
            tracing::trace!(behind = now_secs - self.next_frame_time, "capture pacing resync");
            self.next_frame_time = now_secs + self.frame_duration;
        }
        self.drain();
        Ok(())
    }

    /// Feed tapped PCM.
    pub fn push_audio(&mut self, interleaved: &[f32]) -> BeatframeResult<()> {
        if self.state != CaptureState::Recording {
            return Err(BeatframeError::NoActiveCapture);
        }
        let res = match self.encoder.as_mut() {
            Some(enc) => enc.encode_audio(interleaved),
            None => Err(BeatframeError::NoActiveCapture),
        };
        if let Err(err) = res {
            self.fail(&err);
            return Err(err);
        }
        Ok(())
    }

    /// Update progress from the playback position. Never decreases and stays below 100
    /// until [`CaptureSession::stop`] flushes.
    pub fn update_progress(&mut self, current_secs: f64, duration_secs: f64) {
        if self.state != CaptureState::Recording || duration_secs.is_nan() || duration_secs <= 0.0 {
            return;
        }
        let pct = (current_secs / duration_secs * 100.0).clamp(0.0, MAX_PROGRESS_BEFORE_FLUSH);
        if pct.is_finite() && pct > self.progress {
            self.progress = pct;
        }
    }

    /// Periodic end-of-audio check, at most once per [`END_POLL_INTERVAL_SECS`] of playback.
    pub fn poll_end(&mut self, current_secs: f64, duration_secs: f64) -> bool {
        if self.state != CaptureState::Recording
            || current_secs - self.last_end_poll < END_POLL_INTERVAL_SECS
        {
            return false;
        }
        self.last_end_poll = current_secs;
        current_secs >= duration_secs
    }

    /// Move delivered chunks into the session buffer.
    pub fn drain(&mut self) {
        let Some(rx) = self.chunks_rx.as_ref() else {
            return;
        };
        for chunk in rx.try_iter() {
            self.byte_len += chunk.bytes.len() as u64;
            self.chunks.push(chunk);
        }
    }

    /// Flush the encoder and assemble the artifact.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self, preset_name: &str) -> BeatframeResult<&CaptureArtifact> {
        if self.state != CaptureState::Recording {
            return Err(BeatframeError::NoActiveCapture);
        }
        self.state = CaptureState::Stopping;
        tracing::debug!("capture stopping");

        let Some(mut encoder) = self.encoder.take() else {
            return Err(BeatframeError::NoActiveCapture);
        };
        if let Err(err) = encoder.stop() {
            encoder.abort();
            self.fail(&err);
            return Err(err);
        }
        drop(encoder);
        self.drain();
        self.chunks_rx = None;

        let (Some(settings), Some(profile)) = (self.settings, self.profile) else {
            return Err(BeatframeError::NoActiveCapture);
        };
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let mut bytes = Vec::with_capacity(usize::try_from(self.byte_len).unwrap_or(0));
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(&chunk.bytes);
        }
        let id = NEXT_ARTIFACT_ID.fetch_add(1, Ordering::Relaxed);
        let artifact = CaptureArtifact {
            reference: format!("blob:beatframe/{id}"),
            mime_type: profile.mime_type.to_owned(),
            file_name: settings.file_name(preset_name, profile.extension, unix_secs),
            bytes,
        };

        self.progress = 100.0;
        self.state = CaptureState::Complete;
        self.last_outcome = Some(CaptureState::Complete);
        tracing::debug!(bytes = artifact.bytes.len(), file = %artifact.file_name, "capture complete");
        Ok(self.artifact.insert(artifact))
    }

    /// Abort the encoder, discard chunks and return to `Idle`.
    pub fn cancel(&mut self) -> BeatframeResult<()> {
        if !self.is_active() {
            return Err(BeatframeError::NoActiveCapture);
        }
        if let Some(mut enc) = self.encoder.take() {
            enc.abort();
        }
        self.discard();
        self.progress = 0.0;
        self.state = CaptureState::Idle;
        self.last_outcome = Some(CaptureState::Cancelled);
        tracing::debug!("capture cancelled");
        Ok(())
    }

    fn fail(&mut self, err: &BeatframeError) {
        if let Some(mut enc) = self.encoder.take() {
            enc.abort();
        }
        self.fail_with(err);
    }

    fn fail_with(&mut self, err: &BeatframeError) {
        self.discard();
        self.state = CaptureState::Failed;
        self.last_outcome = Some(CaptureState::Failed);
        self.last_error = Some(err.to_string());
        tracing::debug!(error = %err, "capture failed");
    }

    fn discard(&mut self) {
        self.chunks_rx = None;
        self.chunks.clear();
        self.byte_len = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/session.rs"]
mod tests;
