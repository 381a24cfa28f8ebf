use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cloneable cancellation handle for a [`FrameLoop`].
#[derive(Clone, Debug, Default)]
pub struct LoopHandle(Arc<AtomicBool>);

impl LoopHandle {
    /// Ask the loop to stop before its next tick.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`LoopHandle::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs a tick closure at a target cadence on the calling thread.
#[derive(Debug)]
pub struct FrameLoop {
    interval: Option<Duration>,
    handle: LoopHandle,
}

impl FrameLoop {
    /// Loop targeting `fps` ticks per second. Non-positive or non-finite rates run unpaced.
    pub fn new(fps: f64) -> Self {
        let interval = (fps.is_finite() && fps > 0.0).then(|| Duration::from_secs_f64(1.0 / fps));
        Self {
            interval,
            handle: LoopHandle::default(),
        }
    }

    /// Loop that ticks as fast as the closure returns.
    pub fn unpaced() -> Self {
        Self::new(0.0)
    }

    /// Handle that cancels this loop; may be sent to other threads.
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Tick until cancelled or `tick` breaks. Returns the number of ticks run.
    ///
    /// `tick` receives the 0-based tick index. Late ticks are not made up.
    pub fn run<B>(&self, mut tick: impl FnMut(u64) -> ControlFlow<B>) -> (u64, Option<B>) {
        let mut n = 0u64;
        let mut deadline = Instant::now();
        while !self.handle.is_cancelled() {
            let flow = tick(n);
            n += 1;
            if let ControlFlow::Break(b) = flow {
                return (n, Some(b));
            }
            if let Some(interval) = self.interval {
                deadline += interval;
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                } else {
                    deadline = now;
                }
            }
        }
        tracing::debug!(ticks = n, "frame loop cancelled");
        (n, None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/frame_loop.rs"]
mod tests;
