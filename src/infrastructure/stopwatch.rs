//! Wall-clock and memory measurement for command reports

use std::time::{Duration, Instant};

/// Measures elapsed time and peak resident memory between `start` and `stop`
#[derive(Debug)]
pub struct Stopwatch {
    started_at: Instant,
    peak_memory_bytes: u64,
}

/// Measurements taken when a [`Stopwatch`] stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopwatchEvent {
    pub duration: Duration,
    /// Highest physical memory observed, 0 when the platform reports none
    pub peak_memory_bytes: u64,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
            peak_memory_bytes: current_memory(),
        }
    }

    /// Record the current memory usage if it is a new peak
    pub fn sample(&mut self) {
        self.peak_memory_bytes = self.peak_memory_bytes.max(current_memory());
    }

    pub fn stop(mut self) -> StopwatchEvent {
        self.sample();

        StopwatchEvent {
            duration: self.started_at.elapsed(),
            peak_memory_bytes: self.peak_memory_bytes,
        }
    }
}

impl StopwatchEvent {
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Peak memory in decimal megabytes
    pub fn memory_mb(&self) -> f64 {
        self.peak_memory_bytes as f64 / 1000.0 / 1000.0
    }
}

fn current_memory() -> u64 {
    memory_stats::memory_stats()
        .map(|s| s.physical_mem as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reports_elapsed_time() {
        let watch = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(5));

        let event = watch.stop();
        assert!(event.duration >= Duration::from_millis(5));
        assert!(event.duration_ms() >= 5.0);
    }

    #[test]
    fn test_peak_never_decreases() {
        let mut watch = Stopwatch::start();
        let initial = watch.peak_memory_bytes;

        watch.sample();
        assert!(watch.peak_memory_bytes >= initial);

        let event = watch.stop();
        assert!(event.peak_memory_bytes >= initial);
    }

    #[test]
    fn test_unit_conversions() {
        let event = StopwatchEvent {
            duration: Duration::from_micros(1_500),
            peak_memory_bytes: 2_500_000,
        };

        assert!((event.duration_ms() - 1.5).abs() < 1e-9);
        assert!((event.memory_mb() - 2.5).abs() < 1e-9);
    }
}
