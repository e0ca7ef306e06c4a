//! Cumulative counter deltas

/// Delta of a cumulative counter against the previous raw value.
///
/// Without a previous value the delta is 0: a cold history never fails a
/// sample. A counter that went backwards (reset or wrap) becomes the new
/// baseline and also yields 0.
pub fn counter_delta(previous: Option<u64>, current: u64) -> u64 {
    previous.map_or(0, |previous| current.saturating_sub(previous))
}
