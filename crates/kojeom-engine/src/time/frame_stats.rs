/// Rolling frame-rate counter.
///
/// Accumulates frames and elapsed time; once a full second has passed the FPS
/// is computed and both accumulators restart.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frame_count: u32,
    elapsed: f32,
    fps: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame of `dt` seconds.
    ///
    /// Returns the new FPS value when a measurement window completes.
    pub fn record(&mut self, dt: f32) -> Option<f32> {
        self.frame_count += 1;
        self.elapsed += dt;

        if self.elapsed < 1.0 {
            return None;
        }

        self.fps = self.frame_count as f32 / self.elapsed;
        self.frame_count = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }

    /// Last completed measurement, 0 until the first second has elapsed.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
