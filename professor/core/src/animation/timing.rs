//! Frame Timing
//!
//! One monotonic clock drives every animated value in a scene. Hosts pass the
//! wall-clock delta of each rendered frame into [`FrameClock::advance`]; the
//! clock never reads the system time itself, so the whole pipeline stays
//! deterministic under test.
//!
//! Accumulators that used to grow by a fixed amount "per frame" are scaled by
//! [`FrameTick::scale`], which is `dt / reference_frame_secs`. At the reference
//! frame length (0.016s) the scale is exactly 1.0 and the per-frame constants
//! are reproduced bit for bit.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Frame length that per-frame constants are calibrated against
pub const REFERENCE_FRAME_SECS: f32 = 0.016;

/// A single advance of the [`FrameClock`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameTick {
    /// Zero-based index of this tick
    pub index: u64,
    /// Seconds since the clock was created, after this tick
    pub elapsed: f32,
    /// Seconds covered by this tick
    pub dt: f32,
    /// `dt` divided by the reference frame length
    pub scale: f32,
}

impl FrameTick {
    /// Advance a per-frame accumulator step by this tick's scale
    #[must_use]
    pub fn scaled(&self, per_frame: f32) -> f32 {
        per_frame * self.scale
    }
}

/// Monotonic scene clock
#[derive(Clone, Debug)]
pub struct FrameClock {
    elapsed: f32,
    ticks: u64,
    reference_frame_secs: f32,
    last_instant: Option<Instant>,
}

impl FrameClock {
    /// Create a clock calibrated to [`REFERENCE_FRAME_SECS`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_reference(REFERENCE_FRAME_SECS)
    }

    /// Create a clock with a custom reference frame length
    ///
    /// Non-positive or non-finite values fall back to the default.
    #[must_use]
    pub fn with_reference(reference_frame_secs: f32) -> Self {
        let reference_frame_secs = if reference_frame_secs.is_finite() && reference_frame_secs > 0.0 {
            reference_frame_secs
        } else {
            REFERENCE_FRAME_SECS
        };
        Self {
            elapsed: 0.0,
            ticks: 0,
            reference_frame_secs,
            last_instant: None,
        }
    }

    /// Seconds elapsed so far
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of ticks taken so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reference frame length this clock scales against
    #[must_use]
    pub fn reference_frame_secs(&self) -> f32 {
        self.reference_frame_secs
    }

    /// Advance by `dt` seconds
    ///
    /// Negative or non-finite deltas count as zero; time never runs backwards.
    pub fn advance(&mut self, dt: f32) -> FrameTick {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        let tick = FrameTick {
            index: self.ticks,
            elapsed: self.elapsed,
            dt,
            scale: dt / self.reference_frame_secs,
        };
        self.ticks += 1;
        tick
    }

    /// Advance to a host-supplied instant
    ///
    /// The first call only records the instant and yields a zero-length tick.
    pub fn advance_to(&mut self, now: Instant) -> FrameTick {
        let dt = self
            .last_instant
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_instant = Some(now);
        self.advance(dt.as_secs_f32())
    }

    /// Return to time zero, as when a scene is mounted again
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.ticks = 0;
        self.last_instant = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame-rate independent exponential smoothing factor
///
/// `per_frame` is the fraction of the remaining distance covered in one
/// reference frame. At `scale == 1.0` this returns `per_frame`.
#[must_use]
pub fn smoothing_factor(per_frame: f32, scale: f32) -> f32 {
    1.0 - (1.0 - per_frame.clamp(0.0, 1.0)).powf(scale.max(0.0))
}

/// Closed form of a drift that adds `sin(freq·t + phase)·step` every reference frame
///
/// Starts at zero when `t == 0`.
#[must_use]
pub fn sine_drift(step: f32, freq: f32, phase: f32, t: f32) -> f32 {
    let per_sec = step / REFERENCE_FRAME_SECS;
    -(per_sec / freq) * ((freq * t + phase).cos() - phase.cos())
}

/// Closed form of a drift that adds `cos(freq·t + phase)·step` every reference frame
///
/// Starts at zero when `t == 0`.
#[must_use]
pub fn cosine_drift(step: f32, freq: f32, phase: f32, t: f32) -> f32 {
    let per_sec = step / REFERENCE_FRAME_SECS;
    (per_sec / freq) * ((freq * t + phase).sin() - phase.sin())
}
