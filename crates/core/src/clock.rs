//! Elapsed-time tracking between samples

use crate::constants::FIRST_SAMPLE_ELAPSED;
use std::time::Instant;
use sysglance_types::MIN_TIME_SINCE_UPDATE;

/// Monotonic clock owned by a single plugin
///
/// Every plugin keeps its own clock, so plugins never disturb each other's
/// elapsed-time baseline.
#[derive(Debug, Clone, Default)]
pub struct SampleClock {
    last: Option<Instant>,
}

impl SampleClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the last marked sample, strictly positive.
    ///
    /// Before any sample is marked there is no baseline and this reports
    /// one second.
    pub fn elapsed(&self, now: Instant) -> f64 {
        let elapsed = match self.last {
            Some(previous) => now.saturating_duration_since(previous).as_secs_f64(),
            None => FIRST_SAMPLE_ELAPSED,
        };
        elapsed.max(MIN_TIME_SINCE_UPDATE)
    }

    /// Record a successful sample taken at `now`
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_sample_is_one_second() {
        let clock = SampleClock::new();
        assert_eq!(clock.elapsed(Instant::now()), 1.0);
    }

    #[test]
    fn test_elapsed_since_mark() {
        let mut clock = SampleClock::new();
        let start = Instant::now();
        clock.mark(start);
        let elapsed = clock.elapsed(start + Duration::from_millis(2500));
        assert!((elapsed - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_unmarked_sample_keeps_baseline() {
        let mut clock = SampleClock::new();
        let start = Instant::now();
        clock.mark(start);
        assert_eq!(clock.elapsed(start + Duration::from_secs(1)), 1.0);
        assert_eq!(clock.elapsed(start + Duration::from_secs(2)), 2.0);
    }

    #[test]
    fn test_same_instant_never_zero() {
        let mut clock = SampleClock::new();
        let start = Instant::now();
        clock.mark(start);
        assert!(clock.elapsed(start) > 0.0);
    }
}
