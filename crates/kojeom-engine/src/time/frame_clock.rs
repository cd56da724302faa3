use std::time::{Duration, Instant};

/// Upper bound for a single frame delta (1/30 s).
///
/// Keeps animation steps bounded after debugger breaks or window drags.
pub const MAX_FRAME_DELTA: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Sum of all clamped deltas since the clock was created, in seconds.
    pub total: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Snapshot used before the first tick (init callbacks).
    pub fn zero() -> Self {
        Self {
            dt: 0.0,
            total: 0.0,
            now: Instant::now(),
            frame_index: 0,
        }
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to `max_delta` so a stalled frame never feeds a huge
/// step into update code.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    total: f64,
    max_delta: Duration,
}

impl FrameClock {
    /// Creates a clock clamped to [`MAX_FRAME_DELTA`].
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    /// Creates a clock with a custom delta clamp.
    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            total: 0.0,
            max_delta,
        }
    }

    /// Resets the clock baseline.
    ///
    /// Called after initialization so setup time does not count as a frame.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Total clamped time accumulated so far, in seconds.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.advance_to(Instant::now())
    }

    fn advance_to(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).min(self.max_delta);

        self.last = now;
        self.total += dt.as_secs_f64();

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            total: self.total,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
