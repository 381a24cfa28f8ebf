/// Beat detector tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatDetectorOpts {
    /// Number of lowest bins averaged as bass energy.
    pub bass_bins: usize,
    /// Average (0..255) above which a tick counts as a beat.
    pub threshold: f32,
}

impl Default for BeatDetectorOpts {
    fn default() -> Self {
        Self {
            bass_bins: 16,
            threshold: 200.0,
        }
    }
}

/// Result of one beat check.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeatReading {
    /// Bass average exceeded the threshold this tick.
    pub is_beat: bool,
    /// Mean of the bass bins, 0..255.
    pub bass_average: f32,
    /// `bass_average / 255`.
    pub intensity: f32,
}

/// Stateless threshold detector over the low end of a frequency snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct BeatDetector {
    opts: BeatDetectorOpts,
}

impl BeatDetector {
    /// Create a detector.
    pub fn new(opts: BeatDetectorOpts) -> Self {
        Self { opts }
    }

    /// Tunables in use.
    pub fn opts(&self) -> BeatDetectorOpts {
        self.opts
    }

    /// Evaluate one snapshot. An empty snapshot never beats.
    pub fn detect(&self, snapshot: &[u8]) -> BeatReading {
        if snapshot.is_empty() {
            return BeatReading::default();
        }
        let n = self.opts.bass_bins.clamp(1, snapshot.len());
        let sum: u32 = snapshot[..n].iter().map(|&b| u32::from(b)).sum();
        let avg = sum as f32 / n as f32;
        BeatReading {
            is_beat: avg > self.opts.threshold,
            bass_average: avg,
            intensity: avg / 255.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/beat.rs"]
mod tests;
