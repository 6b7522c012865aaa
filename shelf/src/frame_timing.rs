//! Frame pacing and timing instrumentation.
//!
//! The display loops redraw continuously; [`FramePacer`] sleeps out the rest
//! of each frame interval and emits per-frame timing breakdowns at `trace`
//! level. Only every 60th frame is reported to avoid flooding the log.

use std::time::{Duration, Instant};

/// Report every Nth frame.
const SAMPLE_EVERY: u64 = 60;

/// Default frame interval, roughly 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    frame_start: Instant,
    frame: u64,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frame_start: Instant::now(),
            frame: 0,
        }
    }

    /// Frames completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Mark the start of a frame.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Measure a block and trace its duration on sampled frames.
    #[inline]
    pub fn measure<T>(&self, label: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        if self.is_sampled() {
            tracing::trace!(frame = self.frame, phase = label, elapsed = ?start.elapsed(), "frame phase");
        }
        result
    }

    /// Sleep out the remainder of the interval and advance the frame counter.
    pub fn finish_frame(&mut self) {
        let elapsed = self.frame_start.elapsed();
        if self.is_sampled() {
            tracing::trace!(frame = self.frame, elapsed = ?elapsed, "frame");
        }
        if let Some(rest) = self.interval.checked_sub(elapsed) {
            if !rest.is_zero() {
                std::thread::sleep(rest);
            }
        }
        self.frame += 1;
    }

    #[inline]
    fn is_sampled(&self) -> bool {
        self.frame % SAMPLE_EVERY == 0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counter_advances() {
        let mut pacer = FramePacer::new(Duration::ZERO);
        for _ in 0..3 {
            pacer.begin_frame();
            pacer.finish_frame();
        }
        assert_eq!(pacer.frame(), 3);
    }

    #[test]
    fn measure_returns_the_block_result() {
        let pacer = FramePacer::new(Duration::ZERO);
        assert_eq!(pacer.measure("layout", || 40 + 2), 42);
    }

    #[test]
    fn finish_frame_waits_out_the_interval() {
        let mut pacer = FramePacer::new(Duration::from_millis(5));
        let start = Instant::now();
        pacer.begin_frame();
        pacer.finish_frame();
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
