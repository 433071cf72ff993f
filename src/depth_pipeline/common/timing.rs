use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Ordered per-stage durations of one frame.
///
/// Stage names are static so recording a frame never allocates once the
/// step list has grown to its steady-state size.
#[derive(Debug, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
    step_map: HashMap<&'static str, Duration>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            step_map: HashMap::new(),
        }
    }

    pub fn add_step(&mut self, name: &'static str, duration: Duration) {
        self.steps.push(StepTiming { name, duration });
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    /// Forgets the recorded steps but keeps their storage.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.step_map.clear();
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    pub fn log_summary(&self) {
        let total = self.total_duration();
        for step in &self.steps {
            let percentage = if total.as_secs_f64() > 0.0 {
                (step.duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            info!(
                "{:<20} {:>10.3}ms ({:>5.1}%)",
                step.name,
                step.duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        info!("{:<20} {:>10.3}ms", "total", total.as_secs_f64() * 1000.0);
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}

/// Averaged frame-rate report produced by [`FrameRateMeter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate {
    pub average_ms: f64,
    pub fps: f64,
}

/// Averages frame durations over fixed windows, ignoring a warm-up period
/// during which caches and the producer thread settle.
#[derive(Debug)]
pub struct FrameRateMeter {
    warmup_frames: u32,
    window: u32,
    seen: u32,
    count: u32,
    accumulated: Duration,
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(100, 1000)
    }
}

impl FrameRateMeter {
    pub fn new(warmup_frames: u32, window: u32) -> Self {
        Self {
            warmup_frames,
            window: window.max(1),
            seen: 0,
            count: 0,
            accumulated: Duration::ZERO,
        }
    }

    /// Records one frame. Returns a report each time a full window closes.
    pub fn record(&mut self, frame_time: Duration) -> Option<FrameRate> {
        if self.seen < self.warmup_frames {
            self.seen += 1;
            return None;
        }

        self.accumulated += frame_time;
        self.count += 1;
        if self.count < self.window {
            return None;
        }

        let average = self.accumulated.as_secs_f64() / f64::from(self.count);
        self.count = 0;
        self.accumulated = Duration::ZERO;

        let rate = FrameRate {
            average_ms: average * 1000.0,
            fps: if average > 0.0 { 1.0 / average } else { 0.0 },
        };
        info!("{:.3} ms, {:.1} fps", rate.average_ms, rate.fps);
        Some(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timings_accumulate_by_name() {
        let mut timings = PipelineTimings::new();
        timings.add_step("decode", Duration::from_millis(2));
        timings.add_step("rasterize", Duration::from_millis(3));
        timings.add_step("decode", Duration::from_millis(1));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step("decode"), Some(Duration::from_millis(3)));
        assert_eq!(timings.total_duration(), Duration::from_millis(6));
        assert_eq!(timings.get_step("missing"), None);

        timings.clear();
        assert!(timings.steps().is_empty());
        assert_eq!(timings.total_duration(), Duration::ZERO);
    }

    #[test]
    fn test_frame_rate_meter_skips_warmup() {
        let mut meter = FrameRateMeter::new(2, 4);
        assert_eq!(meter.record(Duration::from_secs(10)), None);
        assert_eq!(meter.record(Duration::from_secs(10)), None);

        for _ in 0..3 {
            assert_eq!(meter.record(Duration::from_millis(10)), None);
        }
        let rate = meter.record(Duration::from_millis(10)).unwrap();
        assert!((rate.average_ms - 10.0).abs() < 1e-9);
        assert!((rate.fps - 100.0).abs() < 1e-6);

        // next window starts fresh
        assert_eq!(meter.record(Duration::from_millis(20)), None);
    }
}
