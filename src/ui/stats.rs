use std::collections::VecDeque;

/// Number of frame times kept for the on-screen readout.
const FRAME_HISTORY_LEN: usize = 120;
/// Seconds between FPS log lines.
const LOG_INTERVAL_S: f64 = 5.0;

/// Rolling frame-time stats plus a periodic FPS log line.
pub struct FrameStats {
    history: VecDeque<f64>,
    pub fps: f64,
    frame_count: u64,

    log_timer: f64,
    log_frames: u32,
    log_sum: f64,
    log_min: f64,
    log_max: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_count: 0,
            log_timer: 0.0,
            log_frames: 0,
            log_sum: 0.0,
            log_min: f64::MAX,
            log_max: 0.0,
        }
    }

    /// Record one frame of `dt` seconds.
    pub fn record(&mut self, dt: f64) {
        self.frame_count += 1;
        if self.history.len() == FRAME_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(dt);

        let avg = self.history.iter().sum::<f64>() / self.history.len() as f64;
        self.fps = if avg > 0.0 { 1.0 / avg } else { 0.0 };

        self.log_frames += 1;
        self.log_sum += dt;
        self.log_min = self.log_min.min(dt);
        self.log_max = self.log_max.max(dt);
        self.log_timer += dt;

        if self.log_timer >= LOG_INTERVAL_S {
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                self.log_frames as f64 / self.log_timer,
                self.log_sum / self.log_frames as f64 * 1000.0,
                self.log_min * 1000.0,
                self.log_max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frames = 0;
            self.log_sum = 0.0;
            self.log_min = f64::MAX;
            self.log_max = 0.0;
        }
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
