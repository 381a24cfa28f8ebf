use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic clock driving media time.
pub trait Transport: Send {
    /// Seconds since an arbitrary fixed origin. Never decreases.
    fn now_secs(&self) -> f64;
}

/// Real-time clock for interactive preview.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    /// Start a clock at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WallClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock for offline export and tests.
///
/// Clones share the same time so a driver can keep a handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct SteppedClock {
    bits: Arc<AtomicU64>,
}

impl SteppedClock {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `secs` (negative or non-finite steps are ignored).
    pub fn advance(&self, secs: f64) {
        if !secs.is_finite() || secs <= 0.0 {
            return;
        }
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + secs).to_bits())
            });
    }
}

impl Transport for SteppedClock {
    fn now_secs(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/transport.rs"]
mod tests;
