//! Frame phase timing.
//!
//! When enabled, `Gui::frame` times its phases (pre-render, render, browse
//! info) and reports them as `tracing` debug events under the
//! `gigi::frame_timing` target, sampled every `SAMPLE_EVERY` frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Report one frame in this many.
pub const SAMPLE_EVERY: u64 = 60;

static ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable() {
    ENABLED.store(false, Ordering::Relaxed);
}

#[inline]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_sampled(frame: u64) -> bool {
    is_enabled() && frame % SAMPLE_EVERY == 0
}

/// Measures one frame phase from creation to drop.
pub struct PhaseGuard {
    phase: &'static str,
    frame: u64,
    start: Instant,
}

impl PhaseGuard {
    #[inline]
    pub fn new(phase: &'static str, frame: u64) -> Self {
        Self {
            phase,
            frame,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if is_sampled(self.frame) {
            tracing::debug!(
                target: "gigi::frame_timing",
                frame = self.frame,
                phase = self.phase,
                elapsed = ?self.start.elapsed(),
            );
        }
    }
}

/// Time `f` as phase `phase` of `frame`, returning its result.
#[inline]
pub fn measure<T>(phase: &'static str, frame: u64, f: impl FnOnce() -> T) -> T {
    let _guard = PhaseGuard::new(phase, frame);
    f()
}

/// Report a per-frame counter, e.g. the number of windows pre-rendered.
#[inline]
pub fn stat(name: &'static str, frame: u64, value: impl std::fmt::Display) {
    if is_sampled(frame) {
        tracing::debug!(target: "gigi::frame_timing", frame, stat = name, %value);
    }
}
