//! Refresh loop between two sampling cycles
//!
//! A cycle repaints the current layout until its countdown expires or the
//! user presses the cancel key. Keyboard polling never blocks: the loop
//! sleeps at most one poll slice between checks.

use anyhow::Result;
use log::{trace, warn};
use std::time::{Duration, Instant};

/// Shortest cycle, used when the refresh budget is already spent
pub const MIN_CYCLE_SECS: f64 = 0.1;

/// Decoded meaning of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave the dashboard
    Cancel,
    /// Nothing happened
    None,
    /// Some other input, repaint everything
    Unrecognized,
}

/// Keyboard input, polled without blocking
pub trait KeySource {
    fn has_pending(&mut self) -> bool;

    fn read(&mut self) -> KeyAction;

    /// Put the terminal back in its original mode; failures are logged
    fn restore(&mut self);
}

/// Time as seen by the refresh loop
pub trait CycleClock {
    fn now(&self) -> Instant;

    fn sleep(&mut self, duration: Duration);
}

/// Wall clock and thread sleep
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl CycleClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Deadline of the current cycle
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    deadline: Instant,
}

impl Countdown {
    pub fn new(start: Instant, duration: Duration) -> Self {
        Self {
            deadline: start + duration,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn finished(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Warning for a cycle duration that cannot be honored, `None` when it can
pub fn cadence_fault(duration_secs: f64) -> Option<String> {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        return None;
    }
    Some(format!(
        "Update time higher than refresh time ({:.3}s left), redrawing for {}s",
        duration_secs, MIN_CYCLE_SECS
    ))
}

/// Cycle length to use for a requested duration in seconds
pub fn effective_duration(duration_secs: f64) -> Duration {
    match cadence_fault(duration_secs) {
        None => Duration::from_secs_f64(duration_secs),
        Some(fault) => {
            warn!("{}", fault);
            Duration::from_secs_f64(MIN_CYCLE_SECS)
        }
    }
}

pub struct RefreshScheduler {
    poll_slice: Duration,
}

impl RefreshScheduler {
    pub fn new(poll_slice: Duration) -> Self {
        Self {
            poll_slice: poll_slice.max(Duration::from_millis(1)),
        }
    }

    pub fn poll_slice(&self) -> Duration {
        self.poll_slice
    }

    /// Repaint until the countdown expires or the cancel key is pressed.
    ///
    /// `redraw` runs on every poll slice. Its flag asks the surface to clear
    /// and redraw every cell rather than diff against the previous frame; it
    /// is set on the first paint of the cycle and after unrecognized input.
    /// Returns `true` when the user asked to exit.
    pub fn run_cycle<F>(
        &self,
        duration_secs: f64,
        keys: &mut dyn KeySource,
        clock: &mut dyn CycleClock,
        mut redraw: F,
    ) -> Result<bool>
    where
        F: FnMut(bool) -> Result<()>,
    {
        let countdown = Countdown::new(clock.now(), effective_duration(duration_secs));
        let mut force = true;
        let mut paints = 0u32;

        while !countdown.finished(clock.now()) {
            let action = if keys.has_pending() {
                keys.read()
            } else {
                KeyAction::None
            };
            match action {
                KeyAction::Cancel => {
                    trace!("Cancel key after {} paints", paints);
                    return Ok(true);
                }
                KeyAction::Unrecognized => force = true,
                KeyAction::None => {}
            }

            redraw(force)?;
            force = false;
            paints += 1;

            let remaining = countdown.remaining(clock.now());
            clock.sleep(remaining.min(self.poll_slice));
        }
        trace!("Cycle finished after {} paints", paints);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Clock that only moves when slept on
    struct FakeClock {
        now: Instant,
        slept: Duration,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: Instant::now(),
                slept: Duration::ZERO,
            }
        }
    }

    impl CycleClock for FakeClock {
        fn now(&self) -> Instant {
            self.now
        }

        fn sleep(&mut self, duration: Duration) {
            self.now += duration;
            self.slept += duration;
        }
    }

    /// One scripted answer per poll
    struct ScriptedKeys {
        polls: VecDeque<Option<KeyAction>>,
        restored: bool,
    }

    impl ScriptedKeys {
        fn new(polls: Vec<Option<KeyAction>>) -> Self {
            Self {
                polls: polls.into(),
                restored: false,
            }
        }
    }

    impl KeySource for ScriptedKeys {
        fn has_pending(&mut self) -> bool {
            match self.polls.front() {
                Some(Some(_)) => true,
                Some(None) => {
                    self.polls.pop_front();
                    false
                }
                None => false,
            }
        }

        fn read(&mut self) -> KeyAction {
            self.polls.pop_front().flatten().unwrap_or(KeyAction::None)
        }

        fn restore(&mut self) {
            self.restored = true;
        }
    }

    fn scheduler() -> RefreshScheduler {
        RefreshScheduler::new(Duration::from_millis(100))
    }

    #[test]
    fn test_runs_for_requested_duration() {
        let mut clock = FakeClock::new();
        let mut keys = ScriptedKeys::new(vec![]);
        let mut forced = Vec::new();
        let exit = scheduler()
            .run_cycle(1.0, &mut keys, &mut clock, |force| {
                forced.push(force);
                Ok(())
            })
            .unwrap();
        assert!(!exit);
        assert_eq!(clock.slept, Duration::from_secs(1));
        assert_eq!(forced.len(), 10);
        assert!(forced[0]);
        assert!(forced[1..].iter().all(|f| !f));
    }

    #[test]
    fn test_negative_duration_floors_to_minimum() {
        assert_eq!(effective_duration(-0.5), Duration::from_millis(100));
        assert_eq!(effective_duration(0.0), Duration::from_millis(100));
        assert_eq!(effective_duration(f64::NAN), Duration::from_millis(100));
        let fault = cadence_fault(-0.5).unwrap();
        assert!(fault.contains("higher than refresh time"));
        assert!(fault.contains("-0.500s left"));
        assert!(cadence_fault(f64::INFINITY).is_some());
        assert_eq!(cadence_fault(2.0), None);
        assert_eq!(effective_duration(2.0), Duration::from_secs(2));

        let mut clock = FakeClock::new();
        let mut keys = ScriptedKeys::new(vec![]);
        let mut paints = 0;
        let exit = scheduler()
            .run_cycle(-0.5, &mut keys, &mut clock, |_| {
                paints += 1;
                Ok(())
            })
            .unwrap();
        assert!(!exit);
        assert_eq!(paints, 1);
        assert_eq!(clock.slept, Duration::from_millis(100));
    }

    #[test]
    fn test_cancel_within_one_poll_slice() {
        let mut clock = FakeClock::new();
        let start = clock.now();
        let mut keys = ScriptedKeys::new(vec![None, None, None, Some(KeyAction::Cancel)]);
        let exit = scheduler()
            .run_cycle(2.0, &mut keys, &mut clock, |_| Ok(()))
            .unwrap();
        assert!(exit);
        // The key was pressed during the third slice
        assert!(clock.now() - start <= Duration::from_millis(300));
    }

    #[test]
    fn test_unrecognized_key_forces_repaint() {
        let mut clock = FakeClock::new();
        let mut keys = ScriptedKeys::new(vec![None, Some(KeyAction::Unrecognized)]);
        let mut forced = Vec::new();
        scheduler()
            .run_cycle(0.4, &mut keys, &mut clock, |force| {
                forced.push(force);
                Ok(())
            })
            .unwrap();
        assert_eq!(forced, vec![true, true, false, false]);
        keys.restore();
        assert!(keys.restored);
    }

    #[test]
    fn test_redraw_error_propagates() {
        let mut clock = FakeClock::new();
        let mut keys = ScriptedKeys::new(vec![]);
        let result = scheduler().run_cycle(1.0, &mut keys, &mut clock, |_| {
            Err(anyhow::anyhow!("terminal gone"))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_countdown() {
        let start = Instant::now();
        let countdown = Countdown::new(start, Duration::from_millis(250));
        assert!(!countdown.finished(start));
        assert_eq!(countdown.remaining(start + Duration::from_millis(100)), Duration::from_millis(150));
        assert!(countdown.finished(start + Duration::from_millis(250)));
        assert_eq!(countdown.remaining(start + Duration::from_secs(1)), Duration::ZERO);
    }
}
