use std::time::{Duration, Instant};

use crate::config::FrameStep;

/// Measured steps longer than this are clamped, so a stalled host (app in
/// background, debugger pause) does not fast-forward the avatar.
pub const MAX_MEASURED_STEP: f32 = 0.1;

/// Timer for tracking frame timing and elapsed time.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Produces the animation step of each frame according to a [`FrameStep`].
pub struct FrameClock {
    step: FrameStep,
    timer: Timer,
}

impl FrameClock {
    #[must_use]
    pub fn new(step: FrameStep) -> Self {
        Self {
            step,
            timer: Timer::new(),
        }
    }

    /// Seconds to advance this frame.
    pub fn next_dt(&mut self) -> f32 {
        self.timer.tick();
        match self.step {
            FrameStep::Fixed(step) => step,
            FrameStep::Measured => self.timer.dt_seconds().min(MAX_MEASURED_STEP),
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed
    }
}
