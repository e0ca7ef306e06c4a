//! Boundary to the OS metric source
//!
//! A `MetricSource` hands out either already-normalized percentages or raw
//! cumulative counters. Each method is one atomic read, so fields derived
//! from the same instant never skew against each other. Every field a
//! platform may lack is an `Option`.

use crate::error::SourceError;
use serde::Serialize;

/// CPU time split, in percent of the elapsed interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuTimesPercent {
    pub user: Option<f64>,
    pub system: Option<f64>,
    pub idle: Option<f64>,
    pub nice: Option<f64>,
    pub iowait: Option<f64>,
    pub irq: Option<f64>,
    pub softirq: Option<f64>,
    pub steal: Option<f64>,
    pub guest: Option<f64>,
    pub guest_nice: Option<f64>,
}

impl CpuTimesPercent {
    /// Named view of every field, in a fixed order
    pub fn fields(&self) -> [(&'static str, Option<f64>); 10] {
        [
            ("user", self.user),
            ("system", self.system),
            ("idle", self.idle),
            ("nice", self.nice),
            ("iowait", self.iowait),
            ("irq", self.irq),
            ("softirq", self.softirq),
            ("steal", self.steal),
            ("guest", self.guest),
            ("guest_nice", self.guest_nice),
        ]
    }
}

/// Cumulative event counters since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuCounters {
    pub ctx_switches: Option<u64>,
    pub interrupts: Option<u64>,
    pub soft_interrupts: Option<u64>,
    pub syscalls: Option<u64>,
}

impl CpuCounters {
    pub fn fields(&self) -> [(&'static str, Option<u64>); 4] {
        [
            ("ctx_switches", self.ctx_switches),
            ("interrupts", self.interrupts),
            ("soft_interrupts", self.soft_interrupts),
            ("syscalls", self.syscalls),
        ]
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value)
    }
}

/// Whole-machine CPU reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuSample {
    /// Busy percentage (everything except idle)
    pub total: f64,
    pub times: CpuTimesPercent,
    pub counters: CpuCounters,
}

/// Reading of one logical core
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoreSample {
    pub total: f64,
    pub times: CpuTimesPercent,
}

/// Virtual memory reading, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemorySample {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub active: Option<u64>,
    pub inactive: Option<u64>,
    pub buffers: Option<u64>,
    pub cached: Option<u64>,
    pub wired: Option<u64>,
    pub shared: Option<u64>,
}

impl MemorySample {
    /// Usage percentage computed as (total - available) / total
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.total.saturating_sub(self.available) as f64 * 100.0 / self.total as f64
    }
}

/// Cumulative byte counters of a network interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkCounters {
    pub name: String,
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

/// Source of OS metrics
///
/// Sources that cover only part of the machine leave the other methods at
/// their default, which reports the family as unsupported.
pub trait MetricSource {
    /// Whole-machine CPU percentages plus cumulative counters
    fn cpu(&mut self) -> Result<CpuSample, SourceError> {
        Err(SourceError::Unsupported("cpu"))
    }

    /// Per-core CPU percentages
    fn per_cpu(&mut self) -> Result<Vec<CoreSample>, SourceError> {
        Err(SourceError::Unsupported("per-cpu"))
    }

    fn memory(&mut self) -> Result<MemorySample, SourceError> {
        Err(SourceError::Unsupported("memory"))
    }

    fn networks(&mut self) -> Result<Vec<NetworkCounters>, SourceError> {
        Err(SourceError::Unsupported("network"))
    }

    /// Number of logical cores, at least 1
    fn logical_cores(&mut self) -> usize {
        1
    }
}

/// Type-erased metric source for dynamic dispatch
pub type BoxedMetricSource = Box<dyn MetricSource>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_percent() {
        let sample = MemorySample {
            total: 1000,
            available: 250,
            ..MemorySample::default()
        };
        assert!((sample.percent() - 75.0).abs() < 1e-9);
        assert_eq!(MemorySample::default().percent(), 0.0);
    }

    #[test]
    fn test_counter_lookup_by_name() {
        let counters = CpuCounters {
            ctx_switches: Some(120),
            ..CpuCounters::default()
        };
        assert_eq!(counters.get("ctx_switches"), Some(120));
        assert_eq!(counters.get("syscalls"), None);
        assert_eq!(counters.get("bogus"), None);
    }

    struct Empty;
    impl MetricSource for Empty {}

    #[test]
    fn test_default_methods_report_unsupported() {
        let mut source = Empty;
        assert!(matches!(source.cpu(), Err(SourceError::Unsupported("cpu"))));
        assert!(source.networks().is_err());
        assert_eq!(source.logical_cores(), 1);
    }
}
