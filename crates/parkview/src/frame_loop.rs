//! # Frame Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. SYNC      drain finished requests into the store (never waits)   │
//! │ 2. SAMPLE    t = frames_since_sync / N, sample every entity         │
//! │ 3. PRESENT   hand the frame to the RenderSink                       │
//! │ 4. SCHEDULE  every N frames spawn the next step request             │
//! │ 5. PACE      sleep out the rest of the frame budget                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use parkview_shared::TARGET_FPS;
use tracing::{info, warn};

/// Maximum frame time before a slow-frame warning.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Frame pacing options.
#[derive(Clone, Debug)]
pub struct FrameLoopConfig {
    /// Target frames per second.
    pub target_fps: u32,
    /// Warn about frames over [`MAX_FRAME_TIME`].
    pub enable_timing_logs: bool,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            enable_timing_logs: true,
        }
    }
}

impl FrameLoopConfig {
    /// Time budget of one frame.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}

/// Timing of one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Total work time in microseconds (pacing sleep excluded).
    pub total_us: u64,
    /// Event drain and merge time in microseconds.
    pub sync_us: u64,
    /// Sampling and draw list time in microseconds.
    pub sample_us: u64,
    /// Sink time in microseconds.
    pub present_us: u64,
    /// Rosters merged this frame.
    pub merges: u32,
    /// Draw calls handed to the sink.
    pub draws: u32,
}

/// Drives frame numbering, timing and pacing.
pub struct FrameLoop {
    config: FrameLoopConfig,
    frame_count: u64,
    frame_start: Instant,
    stats: FrameStatsAccumulator,
}

impl FrameLoop {
    /// Creates a loop.
    #[must_use]
    pub fn new(config: FrameLoopConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            frame_start: Instant::now(),
            stats: FrameStatsAccumulator::new(),
        }
    }

    /// Marks the start of a frame and returns its number.
    pub fn begin_frame(&mut self) -> u64 {
        self.frame_start = Instant::now();
        self.frame_count
    }

    /// Records a finished frame.
    pub fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats.record(stats, self.config.frame_budget());

        if self.config.enable_timing_logs && stats.total_us > MAX_FRAME_TIME.as_micros() as u64 {
            warn!(
                frame = stats.frame,
                ms = stats.total_us as f64 / 1000.0,
                budget_ms = self.config.frame_budget().as_secs_f64() * 1000.0,
                "frame exceeded budget"
            );
        }
    }

    /// Sleeps until the current frame's budget is used up.
    pub fn pace(&self) {
        let elapsed = self.frame_start.elapsed();
        if let Some(rest) = self.config.frame_budget().checked_sub(elapsed) {
            std::thread::sleep(rest);
        }
    }

    /// Time since [`FrameLoop::begin_frame`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.frame_start.elapsed()
    }

    /// Frames completed.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Accumulated timing.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of sync times.
    pub sync_us_sum: u64,
    /// Sum of sample times.
    pub sample_us_sum: u64,
    /// Sum of present times.
    pub present_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded the budget.
    pub frames_over_budget: u64,
    /// Rosters merged.
    pub merges: u64,
}

impl FrameStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            sync_us_sum: 0,
            sample_us_sum: 0,
            present_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            merges: 0,
        }
    }

    /// Records one frame against `budget`.
    pub fn record(&mut self, stats: FrameStats, budget: Duration) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.sync_us_sum += stats.sync_us;
        self.sample_us_sum += stats.sample_us;
        self.present_us_sum += stats.present_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.merges += u64::from(stats.merges);

        if stats.total_us > budget.as_micros() as u64 {
            self.frames_over_budget += 1;
        }
    }

    /// Average frame work time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Share of frames over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a one-line summary.
    pub fn log_summary(&self) {
        let min_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_us as f64 / 1000.0
        };
        info!(
            frames = self.frames_recorded,
            avg_ms = self.avg_frame_ms(),
            min_ms,
            max_ms = self.max_frame_us as f64 / 1000.0,
            over_budget_pct = self.over_budget_ratio() * 100.0,
            merges = self.merges,
            "frame statistics"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(frame: u64, total_us: u64) -> FrameStats {
        FrameStats {
            frame,
            total_us,
            ..FrameStats::default()
        }
    }

    #[test]
    fn test_frame_budget() {
        let config = FrameLoopConfig::default();
        assert_eq!(config.frame_budget(), Duration::from_nanos(16_666_666));
        let zero = FrameLoopConfig {
            target_fps: 0,
            ..FrameLoopConfig::default()
        };
        assert_eq!(zero.frame_budget(), Duration::from_secs(1));
    }

    #[test]
    fn test_frame_numbering() {
        let mut frames = FrameLoop::new(FrameLoopConfig::default());
        assert_eq!(frames.begin_frame(), 0);
        frames.end_frame(frame(0, 100));
        assert_eq!(frames.begin_frame(), 1);
        assert_eq!(frames.frame_count(), 1);
    }

    #[test]
    fn test_accumulator() {
        let budget = Duration::from_millis(16);
        let mut acc = FrameStatsAccumulator::new();
        assert_eq!(acc.avg_frame_ms(), 0.0);

        acc.record(frame(0, 1_000), budget);
        acc.record(frame(1, 3_000), budget);
        acc.record(frame(2, 20_000), budget);

        assert_eq!(acc.frames_recorded, 3);
        assert_eq!(acc.min_frame_us, 1_000);
        assert_eq!(acc.max_frame_us, 20_000);
        assert_eq!(acc.frames_over_budget, 1);
        assert!((acc.avg_frame_ms() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_pace_fills_budget() {
        let mut frames = FrameLoop::new(FrameLoopConfig {
            target_fps: 100,
            enable_timing_logs: false,
        });
        frames.begin_frame();
        let start = Instant::now();
        frames.pace();
        assert!(start.elapsed() >= Duration::from_millis(9));
    }
}
