use crate::audio::track::AudioTrack;
use crate::playback::graph::AudioGraph;
use crate::playback::transport::Transport;

/// Lifecycle of the audio processing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// No user interaction has happened yet; the graph does not exist.
    Uninitialized,
    /// Graph wired and running.
    Running,
    /// Suspended by the platform; resumed on the next interaction.
    Suspended,
}

/// Notification produced by [`PlaybackController::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The track reached its end; playback is now paused at the end.
    Ended,
}

/// Play/pause/seek/volume control over one track and a transport clock.
///
/// The audio graph is built lazily on the first interaction. Media time advances with the
/// transport only while playing in a running context.
pub struct PlaybackController {
    transport: Box<dyn Transport>,
    track: AudioTrack,
    graph: Option<AudioGraph>,
    state: ContextState,
    playing: bool,
    anchor_media: f64,
    anchor_clock: f64,
    volume: f64,
    muted: bool,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("playing", &self.playing)
            .field("time", &self.current_time())
            .field("duration", &self.duration())
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    /// Controller for `track`, paused at 0.
    pub fn new(track: AudioTrack, transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            track,
            graph: None,
            state: ContextState::Uninitialized,
            playing: false,
            anchor_media: 0.0,
            anchor_clock: 0.0,
            volume: 1.0,
            muted: false,
        }
    }

    /// Context lifecycle state.
    pub fn context_state(&self) -> ContextState {
        self.state
    }

    /// Audio graph, once initialized.
    pub fn graph(&self) -> Option<&AudioGraph> {
        self.graph.as_ref()
    }

    /// Mutable audio graph, once initialized.
    pub fn graph_mut(&mut self) -> Option<&mut AudioGraph> {
        self.graph.as_mut()
    }

    /// Source track.
    pub fn track(&self) -> &AudioTrack {
        &self.track
    }

    /// Track length in seconds.
    pub fn duration(&self) -> f64 {
        self.track.duration_secs()
    }

    /// Whether playback is requested.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Speaker volume, 0..1.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Whether the speaker is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Current media time in seconds, within `[0, duration]`.
    pub fn current_time(&self) -> f64 {
        let t = if self.playing && self.state == ContextState::Running {
            self.anchor_media + (self.transport.now_secs() - self.anchor_clock)
        } else {
            self.anchor_media
        };
        t.clamp(0.0, self.duration())
    }

    /// Start or continue playback. Restarts from 0 when parked at the end.
    pub fn play(&mut self) {
        self.interact();
        if self.playing {
            return;
        }
        if self.anchor_media >= self.duration() {
            self.anchor_media = 0.0;
        }
        self.anchor_clock = self.transport.now_secs();
        self.playing = true;
        tracing::debug!(at = self.anchor_media, "play");
    }

    /// Pause at the current time.
    pub fn pause(&mut self) {
        self.interact();
        if !self.playing {
            return;
        }
        self.anchor_media = self.current_time();
        self.playing = false;
        tracing::debug!(at = self.anchor_media, "pause");
    }

    /// Jump to `secs`, clamped to `[0, duration]`.
    pub fn seek(&mut self, secs: f64) {
        self.interact();
        let target = if secs.is_finite() { secs } else { 0.0 };
        self.anchor_media = target.clamp(0.0, self.duration());
        self.anchor_clock = self.transport.now_secs();
        if let Some(g) = self.graph.as_mut() {
            g.reposition_capture_tap(self.anchor_media);
        }
        tracing::debug!(at = self.anchor_media, "seek");
    }

    /// Set speaker volume; clamped to 0..1.
    pub fn set_volume(&mut self, v: f64) {
        self.interact();
        if v.is_finite() {
            self.volume = v.clamp(0.0, 1.0);
        }
        if let Some(g) = self.graph.as_mut() {
            g.set_volume(self.volume);
        }
    }

    /// Flip mute. Returns the new mute state.
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    /// Set mute explicitly.
    pub fn set_muted(&mut self, muted: bool) {
        self.interact();
        self.muted = muted;
        if let Some(g) = self.graph.as_mut() {
            g.set_muted(muted);
        }
    }

    /// Platform suspension of the audio context. Media time freezes until the next interaction.
    pub fn suspend(&mut self) {
        if self.state != ContextState::Running {
            return;
        }
        self.anchor_media = self.current_time();
        self.state = ContextState::Suspended;
        tracing::debug!("audio context suspended");
    }

    /// Detect end of stream. Emits [`PlaybackEvent::Ended`] once per run-through.
    pub fn poll(&mut self) -> Option<PlaybackEvent> {
        if !self.playing || self.state != ContextState::Running {
            return None;
        }
        let t = self.current_time();
        if t < self.duration() {
            return None;
        }
        self.anchor_media = self.duration();
        self.playing = false;
        tracing::debug!("playback ended");
        Some(PlaybackEvent::Ended)
    }

    fn interact(&mut self) {
        match self.state {
            ContextState::Uninitialized => {
                let mut graph = AudioGraph::new(self.track.clone());
                graph.set_volume(self.volume);
                graph.set_muted(self.muted);
                self.graph = Some(graph);
                self.state = ContextState::Running;
                self.anchor_clock = self.transport.now_secs();
                tracing::debug!("audio graph initialized");
            }
            ContextState::Suspended => {
                self.state = ContextState::Running;
                self.anchor_clock = self.transport.now_secs();
                tracing::debug!("audio context resumed");
            }
            ContextState::Running => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
