//! Short per-field history used for trend arrows

use crate::constants::{TREND_SIGNIFICANT, TREND_WINDOW};
use std::collections::{BTreeMap, VecDeque};

/// Direction of a field over the trend window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
    /// Not enough points collected yet
    Unavailable,
}

impl Trend {
    /// Classify a change across the window
    pub fn from_delta(delta: Option<f64>) -> Self {
        match delta {
            None => Trend::Unavailable,
            Some(d) if !d.is_finite() => Trend::Unavailable,
            Some(d) if d > TREND_SIGNIFICANT => Trend::Up,
            Some(d) if d < -TREND_SIGNIFICANT => Trend::Down,
            Some(_) => Trend::Flat,
        }
    }

    /// Single-column glyph shown next to panel titles
    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
            Trend::Unavailable => " ",
        }
    }
}

/// Bounded FIFO of recent values, one per tracked field
#[derive(Debug, Clone)]
pub struct TrendHistory {
    capacity: usize,
    points: BTreeMap<String, VecDeque<f64>>,
}

impl TrendHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            points: BTreeMap::new(),
        }
    }

    /// Append the newest value, evicting the oldest when full
    pub fn push(&mut self, field: &str, value: f64) {
        let capacity = self.capacity;
        let window = self
            .points
            .entry(field.to_string())
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        if window.len() == capacity {
            window.pop_front();
        }
        window.push_back(value);
    }

    /// Newest minus oldest retained value, once the window is full
    pub fn delta(&self, field: &str) -> Option<f64> {
        let window = self.points.get(field)?;
        if window.len() < self.capacity {
            return None;
        }
        Some(window.back()? - window.front()?)
    }

    pub fn trend(&self, field: &str) -> Trend {
        Trend::from_delta(self.delta(field))
    }

    /// Trend of the sum of two fields
    pub fn combined(&self, a: &str, b: &str) -> Trend {
        match (self.delta(a), self.delta(b)) {
            (Some(da), Some(db)) => Trend::from_delta(Some(da + db)),
            _ => Trend::Unavailable,
        }
    }

    pub fn len(&self, field: &str) -> usize {
        self.points.get(field).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for TrendHistory {
    fn default() -> Self {
        Self::new(TREND_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(field: &str, values: &[f64]) -> TrendHistory {
        let mut history = TrendHistory::default();
        for v in values {
            history.push(field, *v);
        }
        history
    }

    #[test]
    fn test_unavailable_until_window_full() {
        let history = filled("user", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(history.trend("user"), Trend::Unavailable);
        assert_eq!(history.trend("missing"), Trend::Unavailable);
    }

    #[test]
    fn test_trend_directions() {
        assert_eq!(filled("x", &[10.0, 0.0, 0.0, 0.0, 0.0, 20.0]).trend("x"), Trend::Up);
        assert_eq!(filled("x", &[20.0, 50.0, 50.0, 0.0, 0.0, 10.0]).trend("x"), Trend::Down);
        assert_eq!(filled("x", &[10.0, 30.0, 0.0, 0.0, 0.0, 10.5]).trend("x"), Trend::Flat);
    }

    #[test]
    fn test_fifo_eviction() {
        let history = filled("x", &[100.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(history.len("x"), TREND_WINDOW);
        assert_eq!(history.trend("x"), Trend::Flat);
    }

    #[test]
    fn test_combined_trend() {
        let mut history = filled("user", &[0.0, 0.0, 0.0, 0.0, 0.0, 0.8]);
        for v in [0.0, 0.0, 0.0, 0.0, 0.0, 0.8] {
            history.push("system", v);
        }
        assert_eq!(history.trend("user"), Trend::Flat);
        assert_eq!(history.combined("user", "system"), Trend::Up);
        assert_eq!(history.combined("user", "iowait"), Trend::Unavailable);
    }

    #[test]
    fn test_glyphs_are_single_column() {
        for trend in [Trend::Up, Trend::Down, Trend::Flat, Trend::Unavailable] {
            assert_eq!(trend.glyph().chars().count(), 1);
        }
    }
}
