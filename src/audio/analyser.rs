//! Windowed FFT magnitude analysis with temporal smoothing and byte quantization.

use crate::foundation::error::{BeatframeError, BeatframeResult};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Analyser tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyserOpts {
    /// FFT window length, a power of two in `32..=32768`.
    pub fft_size: usize,
    /// Initial smoothing time constant in `[0, 1)`.
    pub smoothing: f32,
    /// Level mapped to byte 0.
    pub min_db: f32,
    /// Level mapped to byte 255.
    pub max_db: f32,
}

impl Default for AnalyserOpts {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

/// Frequency analysis source.
///
/// [`FrequencyAnalyser::process`] consumes one time-domain window and updates the smoothed
/// magnitudes; [`FrequencyAnalyser::get_snapshot`] only reads them. Until the first window
/// arrives the analyser is disconnected and reports silence.
pub struct FrequencyAnalyser {
    opts: AnalyserOpts,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    connected: bool,
}

impl std::fmt::Debug for FrequencyAnalyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrequencyAnalyser")
            .field("opts", &self.opts)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

impl FrequencyAnalyser {
    /// Create an analyser.
    pub fn new(opts: AnalyserOpts) -> BeatframeResult<Self> {
        let n = opts.fft_size;
        if !n.is_power_of_two() || !(32..=32768).contains(&n) {
            return Err(BeatframeError::validation(
                "fft_size must be a power of two in 32..=32768",
            ));
        }
        if !opts.min_db.is_finite() || !opts.max_db.is_finite() || opts.min_db >= opts.max_db {
            return Err(BeatframeError::validation("min_db must be below max_db"));
        }

        let fft = FftPlanner::new().plan_fft_forward(n);
        let scratch_len = fft.get_inplace_scratch_len();
        let window = (0..n)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / n as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        let mut out = Self {
            opts,
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); n],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; n / 2],
            connected: false,
        };
        out.set_smoothing(opts.smoothing);
        Ok(out)
    }

    /// Window length expected by [`FrequencyAnalyser::process`].
    pub fn fft_size(&self) -> usize {
        self.opts.fft_size
    }

    /// Number of bins in a snapshot (`fft_size / 2`).
    pub fn bin_count(&self) -> usize {
        self.opts.fft_size / 2
    }

    /// Current smoothing time constant.
    pub fn smoothing(&self) -> f32 {
        self.opts.smoothing
    }

    /// Retune smoothing without rebuilding. Values outside `[0, 1)` are clamped.
    pub fn set_smoothing(&mut self, tau: f32) {
        self.opts.smoothing = if tau.is_finite() {
            tau.clamp(0.0, 0.999)
        } else {
            0.0
        };
    }

    /// Whether any signal has been processed since construction or the last reset.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Forget history and report silence until the next window.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.connected = false;
    }

    /// Analyse one time-domain window.
    ///
    /// Windows shorter than `fft_size` are zero-padded at the front; longer ones use their last
    /// `fft_size` samples.
    pub fn process(&mut self, samples: &[f32]) {
        let n = self.opts.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { tail[i - pad] };
            let s = if s.is_finite() { s } else { 0.0 };
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.opts.smoothing;
        let inv_n = 1.0 / n as f32;
        for (k, s) in self.smoothed.iter_mut().enumerate() {
            let mag = self.buffer[k].norm() * inv_n;
            let next = tau * *s + (1.0 - tau) * mag;
            *s = if next.is_finite() { next } else { 0.0 };
        }
        self.connected = true;
    }

    /// Fill `out` with the current byte magnitudes, one per bin.
    ///
    /// Fills up to `min(out.len(), bin_count)`; any remaining bytes are zeroed.
    pub fn get_snapshot(&self, out: &mut [u8]) {
        if !self.connected {
            out.fill(0);
            return;
        }
        let range = self.opts.max_db - self.opts.min_db;
        for (i, slot) in out.iter_mut().enumerate() {
            let Some(&s) = self.smoothed.get(i) else {
                *slot = 0;
                continue;
            };
            if s <= 0.0 {
                *slot = 0;
                continue;
            }
            let db = 20.0 * s.log10();
            let scaled = (255.0 * (db - self.opts.min_db) / range).floor();
            *slot = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/analyser.rs"]
mod tests;
