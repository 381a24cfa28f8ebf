use crate::capture::profile::EncoderProfile;
use crate::foundation::core::Fps;
use crate::foundation::error::{BeatframeError, BeatframeResult};
use crate::foundation::math::mul_div255_u16;
use crossbeam_channel::Sender;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// One piece of encoded container bytes, delivered in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Container bytes.
    pub bytes: Vec<u8>,
}

/// Parameters fixed for the lifetime of one encode.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Video frame rate.
    pub fps: Fps,
    /// Video bitrate in bits per second.
    pub video_bitrate: u64,
    /// Chosen container/codec profile.
    pub profile: EncoderProfile,
    /// Audio sample rate of `encode_audio` input.
    pub audio_sample_rate: u32,
    /// Audio channel count of `encode_audio` input.
    pub audio_channels: u16,
}

/// Producer of encoded chunks from raw frames and PCM.
///
/// Chunks go to the channel given to [`MediaEncoder::start`]. [`MediaEncoder::stop`] is the
/// flush step: every chunk is sent before it returns and the sender is dropped afterwards.
pub trait MediaEncoder: Send {
    /// Begin an encode.
    fn start(&mut self, cfg: &EncoderConfig, chunks: Sender<EncodedChunk>) -> BeatframeResult<()>;
    /// Feed one premultiplied RGBA8 frame of `width * height * 4` bytes.
    fn encode_video(&mut self, rgba8_premul: &[u8]) -> BeatframeResult<()>;
    /// Feed interleaved f32 PCM.
    fn encode_audio(&mut self, interleaved: &[f32]) -> BeatframeResult<()>;
    /// Flush and finish.
    fn stop(&mut self) -> BeatframeResult<()>;
    /// Discard everything and release resources. Must be safe to call in any state.
    fn abort(&mut self);
}

/// What an [`InMemoryEncoder`] has seen, shared with the test that created it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStats {
    /// `start` calls.
    pub starts: u32,
    /// Frames accepted.
    pub frames: u64,
    /// PCM samples accepted.
    pub audio_samples: u64,
    /// `stop` completed.
    pub stopped: bool,
    /// `abort` called.
    pub aborted: bool,
}

/// Deterministic encoder for tests: one chunk per frame plus a trailer on stop.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    stats: Arc<Mutex<InMemoryStats>>,
    sender: Option<Sender<EncodedChunk>>,
    frame_len: usize,
    fail_on_start: bool,
    fail_after_frames: Option<u64>,
}

impl InMemoryEncoder {
    /// Encoder that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder whose `start` fails.
    pub fn failing_start() -> Self {
        Self {
            fail_on_start: true,
            ..Self::default()
        }
    }

    /// Encoder that errors once `frames` frames were accepted.
    pub fn failing_after(frames: u64) -> Self {
        Self {
            fail_after_frames: Some(frames),
            ..Self::default()
        }
    }

    /// Handle to the shared stats.
    pub fn stats(&self) -> Arc<Mutex<InMemoryStats>> {
        self.stats.clone()
    }

    fn with_stats(&self, f: impl FnOnce(&mut InMemoryStats)) {
        if let Ok(mut s) = self.stats.lock() {
            f(&mut s);
        }
    }

    fn send(&self, bytes: Vec<u8>) -> BeatframeResult<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| BeatframeError::capture("encoder not started"))?;
        sender
            .send(EncodedChunk { bytes })
            .map_err(|_| BeatframeError::capture("chunk receiver dropped"))
    }
}

impl MediaEncoder for InMemoryEncoder {
    fn start(&mut self, cfg: &EncoderConfig, chunks: Sender<EncodedChunk>) -> BeatframeResult<()> {
        if self.fail_on_start {
            return Err(BeatframeError::capture("in-memory encoder refused to start"));
        }
        self.frame_len = cfg.width as usize * cfg.height as usize * 4;
        self.sender = Some(chunks);
        self.with_stats(|s| {
            s.starts += 1;
            s.stopped = false;
            s.aborted = false;
        });
        self.send(b"HEAD".to_vec())
    }

    fn encode_video(&mut self, rgba8_premul: &[u8]) -> BeatframeResult<()> {
        if rgba8_premul.len() != self.frame_len {
            return Err(BeatframeError::capture("frame size mismatch"));
        }
        let mut frames = 0;
        self.with_stats(|s| frames = s.frames);
        if self.fail_after_frames.is_some_and(|n| frames >= n) {
            return Err(BeatframeError::capture("in-memory encoder failed mid-stream"));
        }
        self.send(format!("V{frames}").into_bytes())?;
        self.with_stats(|s| s.frames += 1);
        Ok(())
    }

    fn encode_audio(&mut self, interleaved: &[f32]) -> BeatframeResult<()> {
        if interleaved.is_empty() {
            return Ok(());
        }
        self.send(format!("A{}", interleaved.len()).into_bytes())?;
        self.with_stats(|s| s.audio_samples += interleaved.len() as u64);
        Ok(())
    }

    fn stop(&mut self) -> BeatframeResult<()> {
        self.send(b"TAIL".to_vec())?;
        self.sender = None;
        self.with_stats(|s| s.stopped = true);
        Ok(())
    }

    fn abort(&mut self) {
        self.sender = None;
        self.with_stats(|s| s.aborted = true);
    }
}

/// Encoder driving the system `ffmpeg`.
///
/// Video is encoded from raw RGBA on stdin into an intermediate file while the tapped PCM is
/// spooled to a temporary `f32le` file. `stop` muxes both into the final container, read from
/// ffmpeg's stdout by a reader thread and sent as chunks.
pub struct FfmpegEncoder {
    chunk_size: usize,
    state: Option<FfmpegRun>,
}

struct FfmpegRun {
    cfg: EncoderConfig,
    dir: tempfile::TempDir,
    video_path: PathBuf,
    audio_path: PathBuf,
    video: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    audio: BufWriter<std::fs::File>,
    audio_samples: u64,
    scratch: Vec<u8>,
    chunks: Sender<EncodedChunk>,
}

impl std::fmt::Debug for FfmpegEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegEncoder")
            .field("chunk_size", &self.chunk_size)
            .field("running", &self.state.is_some())
            .finish()
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegEncoder {
    /// Encoder emitting 64 KiB chunks.
    pub fn new() -> Self {
        Self {
            chunk_size: 64 * 1024,
            state: None,
        }
    }
}

impl MediaEncoder for FfmpegEncoder {
    #[tracing::instrument(skip(self, chunks), fields(w = cfg.width, h = cfg.height, codec = cfg.profile.video_encoder))]
    fn start(&mut self, cfg: &EncoderConfig, chunks: Sender<EncodedChunk>) -> BeatframeResult<()> {
        if self.state.is_some() {
            return Err(BeatframeError::CaptureInProgress);
        }
        if cfg.width == 0 || cfg.height == 0 || cfg.width % 2 != 0 || cfg.height % 2 != 0 {
            return Err(BeatframeError::validation(
                "encoder width/height must be non-zero and even (yuv420p)",
            ));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(BeatframeError::validation("fps must be non-zero"));
        }
        if !is_ffmpeg_on_path() {
            return Err(BeatframeError::capture(
                "ffmpeg is required for capture, but was not found on PATH",
            ));
        }

        let dir = tempfile::tempdir()
            .map_err(|e| BeatframeError::capture(format!("failed to create temp dir: {e}")))?;
        let video_path = dir.path().join(format!("video.{}", cfg.profile.extension));
        let audio_path = dir.path().join("audio.f32le");
        let audio = std::fs::File::create(&audio_path)
            .map(BufWriter::new)
            .map_err(|e| BeatframeError::capture(format!("failed to create audio spool: {e}")))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "-s"])
            .arg(format!("{}x{}", cfg.width, cfg.height))
            .args(["-r", &format!("{}/{}", cfg.fps.num, cfg.fps.den)])
            .args(["-i", "pipe:0", "-an", "-c:v", cfg.profile.video_encoder])
            .args(["-b:v", &cfg.video_bitrate.to_string(), "-pix_fmt", "yuv420p"])
            .arg(&video_path);

        let mut video = cmd.spawn().map_err(|e| {
            BeatframeError::capture(format!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"))
        })?;
        let stdin = video
            .stdin
            .take()
            .ok_or_else(|| BeatframeError::capture("failed to open ffmpeg stdin"))?;
        let stderr_drain = video.stderr.take().map(drain_stderr);

        self.state = Some(FfmpegRun {
            cfg: cfg.clone(),
            dir,
            video_path,
            audio_path,
            video,
            stdin: Some(stdin),
            stderr_drain,
            audio,
            audio_samples: 0,
            scratch: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            chunks,
        });
        Ok(())
    }

    fn encode_video(&mut self, rgba8_premul: &[u8]) -> BeatframeResult<()> {
        let run = self
            .state
            .as_mut()
            .ok_or_else(|| BeatframeError::capture("encoder not started"))?;
        if rgba8_premul.len() != run.scratch.len() {
            return Err(BeatframeError::capture("frame size mismatch with width*height*4"));
        }
        flatten_premul_over_bg(&mut run.scratch, rgba8_premul, [0, 0, 0]);
        let stdin = run
            .stdin
            .as_mut()
            .ok_or_else(|| BeatframeError::capture("encoder already finalized"))?;
        stdin
            .write_all(&run.scratch)
            .map_err(|e| BeatframeError::capture(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    fn encode_audio(&mut self, interleaved: &[f32]) -> BeatframeResult<()> {
        let run = self
            .state
            .as_mut()
            .ok_or_else(|| BeatframeError::capture("encoder not started"))?;
        for s in interleaved {
            run.audio
                .write_all(&s.to_le_bytes())
                .map_err(|e| BeatframeError::capture(format!("failed to spool audio: {e}")))?;
        }
        run.audio_samples += interleaved.len() as u64;
        Ok(())
    }

    fn stop(&mut self) -> BeatframeResult<()> {
        let mut run = self
            .state
            .take()
            .ok_or_else(|| BeatframeError::capture("encoder not started"))?;

        drop(run.stdin.take());
        let status = run
            .video
            .wait()
            .map_err(|e| BeatframeError::capture(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = join_drain(run.stderr_drain.take())?;
        if !status.success() {
            return Err(BeatframeError::capture(format!(
                "ffmpeg video encode exited with status {status}: {}",
                stderr.trim()
            )));
        }
        run.audio
            .flush()
            .map_err(|e| BeatframeError::capture(format!("failed to flush audio spool: {e}")))?;

        mux(&run, self.chunk_size)?;
        tracing::debug!(dir = %run.dir.path().display(), "ffmpeg encode finished");
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(mut run) = self.state.take() {
            drop(run.stdin.take());
            let _ = run.video.kill();
            let _ = run.video.wait();
            let _ = join_drain(run.stderr_drain.take());
            tracing::debug!("ffmpeg encode aborted");
        }
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.abort();
    }
}

fn mux(run: &FfmpegRun, chunk_size: usize) -> BeatframeResult<()> {
    let cfg = &run.cfg;
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(&run.video_path);
    if run.audio_samples > 0 {
        cmd.args(["-f", "f32le", "-ar", &cfg.audio_sample_rate.to_string()])
            .args(["-ac", &cfg.audio_channels.to_string(), "-i"])
            .arg(&run.audio_path)
            .args(["-c:a", cfg.profile.audio_encoder, "-b:a", "192k", "-shortest"]);
    } else {
        cmd.arg("-an");
    }
    cmd.args(["-c:v", "copy"]);
    if cfg.profile.muxer == "mp4" {
        // stdout is not seekable
        cmd.args(["-movflags", "frag_keyframe+empty_moov+default_base_moof"]);
    }
    cmd.args(["-f", cfg.profile.muxer, "pipe:1"]);

    let mut child = cmd
        .spawn()
        .map_err(|e| BeatframeError::capture(format!("failed to spawn ffmpeg mux: {e}")))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| BeatframeError::capture("failed to open ffmpeg stdout"))?;
    let stderr_drain = child.stderr.take().map(drain_stderr);

    let sender = run.chunks.clone();
    let reader = std::thread::spawn(move || -> std::io::Result<u64> {
        let mut total = 0u64;
        let mut buf = vec![0u8; chunk_size];
        loop {
            let n = stdout.read(&mut buf)?;
            if n == 0 {
                return Ok(total);
            }
            total += n as u64;
            if sender
                .send(EncodedChunk {
                    bytes: buf[..n].to_vec(),
                })
                .is_err()
            {
                return Ok(total);
            }
        }
    });

    let status = child
        .wait()
        .map_err(|e| BeatframeError::capture(format!("failed to wait for ffmpeg mux: {e}")))?;
    let read = reader
        .join()
        .map_err(|_| BeatframeError::capture("ffmpeg reader thread panicked"))?
        .map_err(|e| BeatframeError::capture(format!("ffmpeg stdout read failed: {e}")))?;
    let stderr = join_drain(stderr_drain)?;
    if !status.success() {
        return Err(BeatframeError::capture(format!(
            "ffmpeg mux exited with status {status}: {}",
            stderr.trim()
        )));
    }
    tracing::debug!(bytes = read, "muxed container");
    Ok(())
}

fn drain_stderr(mut stderr: std::process::ChildStderr) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> BeatframeResult<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| BeatframeError::capture("ffmpeg stderr drain thread panicked"))?
        .map_err(|e| BeatframeError::capture(format!("ffmpeg stderr read failed: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Composite premultiplied RGBA8 over an opaque background color.
pub(crate) fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg: [u8; 3]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let inv = 255u16 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(bg[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/encoder.rs"]
mod tests;
