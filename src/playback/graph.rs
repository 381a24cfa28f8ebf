use crate::audio::analyser::FrequencyAnalyser;
use crate::audio::track::AudioTrack;

/// Fixed audio routing: source -> analyser, source -> gain -> speaker, source -> capture tap.
///
/// The analyser and capture tap read the source before the gain stage, so volume and mute never
/// affect analysis or recorded audio.
#[derive(Debug)]
pub struct AudioGraph {
    track: AudioTrack,
    volume: f64,
    muted: bool,
    capture_cursor: Option<usize>,
    window: Vec<f32>,
}

impl AudioGraph {
    /// Wire a graph for `track`.
    pub fn new(track: AudioTrack) -> Self {
        Self {
            track,
            volume: 1.0,
            muted: false,
            capture_cursor: None,
            window: Vec::new(),
        }
    }

    /// Source track.
    pub fn track(&self) -> &AudioTrack {
        &self.track
    }

    /// Speaker gain before mute, 0..1.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Set speaker gain; clamped to 0..1, non-finite values are ignored.
    pub fn set_volume(&mut self, v: f64) {
        if v.is_finite() {
            self.volume = v.clamp(0.0, 1.0);
        }
    }

    /// Whether the speaker branch is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute or unmute the speaker branch.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Gain actually applied to the speaker branch.
    pub fn speaker_gain(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Speaker-branch samples for `[from_secs, to_secs)` with gain applied.
    pub fn speaker_samples(&self, from_secs: f64, to_secs: f64) -> Vec<f32> {
        let gain = self.speaker_gain() as f32;
        self.track
            .interleaved_range(self.track.frame_at(from_secs), self.track.frame_at(to_secs))
            .iter()
            .map(|s| s * gain)
            .collect()
    }

    /// Feed the analyser the window ending at `secs`.
    pub fn feed_analyser(&mut self, analyser: &mut FrequencyAnalyser, secs: f64) {
        self.window.resize(analyser.fft_size(), 0.0);
        self.track.window_mono(secs, &mut self.window);
        analyser.process(&self.window);
    }

    /// Open the capture tap at `secs`.
    pub fn enable_capture_tap(&mut self, secs: f64) {
        self.capture_cursor = Some(self.track.frame_at(secs));
    }

    /// Close the capture tap.
    pub fn disable_capture_tap(&mut self) {
        self.capture_cursor = None;
    }

    /// Whether the capture tap is open.
    pub fn capture_tap_enabled(&self) -> bool {
        self.capture_cursor.is_some()
    }

    /// Move the capture cursor (seek while recording). No-op when the tap is closed.
    pub fn reposition_capture_tap(&mut self, secs: f64) {
        if self.capture_cursor.is_some() {
            self.capture_cursor = Some(self.track.frame_at(secs));
        }
    }

    /// Source samples since the previous pull, up to `secs`. Empty when the tap is closed.
    pub fn pull_capture(&mut self, secs: f64) -> Vec<f32> {
        let Some(cursor) = self.capture_cursor else {
            return Vec::new();
        };
        let end = self.track.frame_at(secs);
        if end <= cursor {
            return Vec::new();
        }
        self.capture_cursor = Some(end);
        self.track.interleaved_range(cursor, end).to_vec()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/graph.rs"]
mod tests;
