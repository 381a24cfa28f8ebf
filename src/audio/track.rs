use crate::foundation::error::{BeatframeError, BeatframeResult};
use std::path::Path;
use std::sync::Arc;

/// Sample rate tracks are decoded to.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved f32 PCM for one audio file.
///
/// Samples live behind an `Arc` so the speaker branch, the analyser feed and the capture tap can
/// share one decode.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    sample_rate: u32,
    channels: u16,
    interleaved: Arc<[f32]>,
}

impl AudioTrack {
    /// Wrap already-decoded PCM.
    pub fn from_pcm(sample_rate: u32, channels: u16, interleaved: Vec<f32>) -> BeatframeResult<Self> {
        if sample_rate == 0 {
            return Err(BeatframeError::validation("audio sample_rate must be > 0"));
        }
        if channels == 0 {
            return Err(BeatframeError::validation("audio channels must be > 0"));
        }
        if interleaved.len() % usize::from(channels) != 0 {
            return Err(BeatframeError::validation(
                "interleaved sample count is not a multiple of the channel count",
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
            interleaved: interleaved.into(),
        })
    }

    /// Decode any ffmpeg-readable file to stereo f32 at [`MIX_SAMPLE_RATE`].
    #[tracing::instrument(fields(path = %path.display()))]
    pub fn decode(path: &Path) -> BeatframeResult<Self> {
        let out = std::process::Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args([
                "-vn",
                "-f",
                "f32le",
                "-acodec",
                "pcm_f32le",
                "-ac",
                "2",
                "-ar",
                &MIX_SAMPLE_RATE.to_string(),
                "pipe:1",
            ])
            .output()
            .map_err(|e| BeatframeError::input(format!("failed to run ffmpeg for audio decode: {e}")))?;

        if !out.status.success() {
            let msg = String::from_utf8_lossy(&out.stderr);
            return Err(BeatframeError::input(format!(
                "ffmpeg audio decode failed for '{}': {}",
                path.display(),
                msg.trim()
            )));
        }
        if out.stdout.len() % 4 != 0 {
            return Err(BeatframeError::input(
                "decoded audio byte length is not aligned to f32 samples",
            ));
        }

        let pcm: Vec<f32> = out
            .stdout
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        tracing::debug!(samples = pcm.len(), "decoded audio");
        Self::from_pcm(MIX_SAMPLE_RATE, 2, pcm)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (samples per channel).
    pub fn frame_len(&self) -> usize {
        self.interleaved.len() / usize::from(self.channels)
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_len() as f64 / f64::from(self.sample_rate)
    }

    /// Sample frame index at `secs`, clamped to the track.
    pub fn frame_at(&self, secs: f64) -> usize {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        ((secs * f64::from(self.sample_rate)).floor() as usize).min(self.frame_len())
    }

    /// Interleaved samples for sample frames `[start, end)`, clamped to the track.
    pub fn interleaved_range(&self, start: usize, end: usize) -> &[f32] {
        let ch = usize::from(self.channels);
        let end = end.min(self.frame_len());
        let start = start.min(end);
        &self.interleaved[start * ch..end * ch]
    }

    /// Fill `out` with the mono downmix of the `out.len()` sample frames ending at `secs`.
    ///
    /// Positions before the start or past the end of the track read as silence.
    pub fn window_mono(&self, secs: f64, out: &mut [f32]) {
        let ch = usize::from(self.channels);
        let end = self.frame_at(secs) as isize;
        let start = end - out.len() as isize;
        let inv = 1.0 / f32::from(self.channels);
        for (i, slot) in out.iter_mut().enumerate() {
            let frame = start + i as isize;
            *slot = if frame < 0 || frame as usize >= self.frame_len() {
                0.0
            } else {
                let base = frame as usize * ch;
                self.interleaved[base..base + ch].iter().sum::<f32>() * inv
            };
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
