/// Decides how many video frames to advance per display tick.
///
/// Accumulates elapsed time and releases one step per `1 / fps` seconds, so a
/// 30 fps stream on a 60 Hz display advances every other tick.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: f32,
    accumulated: f32,
    max_steps: u32,
}

impl FramePacer {
    /// `fps` values that are not positive and finite fall back to 30.
    pub fn new(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            interval: 1.0 / fps,
            accumulated: 0.0,
            max_steps: 4,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Adds `dt` seconds and returns the number of frames that became due.
    ///
    /// At most a few steps are released per call; the remainder is dropped so
    /// playback catches up instead of fast-forwarding.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulated += dt.max(0.0);

        let mut steps = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            steps += 1;
            if steps == self.max_steps {
                self.accumulated = 0.0;
                break;
            }
        }
        steps
    }
}
