use std::time::{Duration, Instant};

use teaplot_core::profiling::profile_function;

/// Frame timing handed to [`App::update`](crate::app::App::update).
///
/// `elapsed` is measured from event-loop start and is the clock that drives
/// frame-paced work such as reveal animations.
#[derive(Debug, Clone)]
pub struct FrameTime {
    /// Time elapsed since the last frame
    pub delta: Duration,
    /// Total time elapsed since app start
    pub elapsed: Duration,
    /// Total number of frames rendered
    pub frame_count: u64,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Elapsed time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces one [`FrameTime`] per tick.
pub(crate) struct TimeTracker {
    start_time: Instant,
    last_frame_time: Instant,
    frame_count: u64,
}

impl TimeTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame_time: now,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        profile_function!();
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        let elapsed = now.duration_since(self.start_time);

        self.last_frame_time = now;
        self.frame_count += 1;

        FrameTime {
            delta,
            elapsed,
            frame_count: self.frame_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let time = FrameTime {
            delta: Duration::from_millis(16),
            elapsed: Duration::from_millis(1500),
            frame_count: 90,
        };
        assert!((time.now_ms() - 1500.0).abs() < 1e-9);
        assert!((time.delta_seconds() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_tracker_counts_frames() {
        let mut tracker = TimeTracker::new();
        let first = tracker.tick();
        let second = tracker.tick();
        assert_eq!(first.frame_count, 1);
        assert_eq!(second.frame_count, 2);
        assert!(second.elapsed >= first.elapsed);
    }
}
