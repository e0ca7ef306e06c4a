//! Parsers for the Linux `/proc` files the local source reads

use std::collections::HashMap;
use sysglance_core::{CpuTimesPercent, MemorySample, SourceError};

pub const PROC_STAT: &str = "/proc/stat";
pub const PROC_MEMINFO: &str = "/proc/meminfo";

/// Cumulative CPU time of one `cpu` line, in clock ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuJiffies {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuJiffies {
    fn parse(values: &[u64]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(0);
        Self {
            user: at(0),
            nice: at(1),
            system: at(2),
            idle: at(3),
            iowait: at(4),
            irq: at(5),
            softirq: at(6),
            steal: at(7),
            guest: at(8),
            guest_nice: at(9),
        }
    }

    /// Sum of all times; guest time is already part of user and nice
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Percent split of the interval since `previous` (since boot without one)
    pub fn percent_since(&self, previous: Option<&CpuJiffies>) -> CpuTimesPercent {
        let base = previous.copied().unwrap_or_default();
        let span = self.total().saturating_sub(base.total());
        let pct = |now: u64, before: u64| -> Option<f64> {
            if span == 0 {
                Some(0.0)
            } else {
                Some(now.saturating_sub(before) as f64 * 100.0 / span as f64)
            }
        };
        CpuTimesPercent {
            user: pct(self.user, base.user),
            system: pct(self.system, base.system),
            idle: pct(self.idle, base.idle),
            nice: pct(self.nice, base.nice),
            iowait: pct(self.iowait, base.iowait),
            irq: pct(self.irq, base.irq),
            softirq: pct(self.softirq, base.softirq),
            steal: pct(self.steal, base.steal),
            guest: pct(self.guest, base.guest),
            guest_nice: pct(self.guest_nice, base.guest_nice),
        }
    }
}

/// Busy share of a percent split: everything but idle and iowait
pub fn busy_percent(times: &CpuTimesPercent) -> f64 {
    let idle = times.idle.unwrap_or(0.0) + times.iowait.unwrap_or(0.0);
    (100.0 - idle).clamp(0.0, 100.0)
}

/// Parsed `/proc/stat`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcStat {
    pub cpu: CpuJiffies,
    pub cores: Vec<CpuJiffies>,
    pub ctx_switches: Option<u64>,
    pub interrupts: Option<u64>,
    pub soft_interrupts: Option<u64>,
}

fn numbers<'a>(fields: impl Iterator<Item = &'a str>, line: &str) -> Result<Vec<u64>, SourceError> {
    fields
        .map(|f| {
            f.parse::<u64>().map_err(|_| SourceError::Malformed {
                what: "/proc/stat",
                detail: line.to_string(),
            })
        })
        .collect()
}

pub fn parse_proc_stat(text: &str) -> Result<ProcStat, SourceError> {
    let mut stat = ProcStat::default();
    let mut seen_cpu = false;
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(key) = fields.next() else {
            continue;
        };
        match key {
            "cpu" => {
                stat.cpu = CpuJiffies::parse(&numbers(fields, line)?);
                seen_cpu = true;
            }
            k if k.starts_with("cpu") => {
                stat.cores.push(CpuJiffies::parse(&numbers(fields, line)?));
            }
            "ctxt" => stat.ctx_switches = fields.next().and_then(|v| v.parse().ok()),
            "intr" => stat.interrupts = fields.next().and_then(|v| v.parse().ok()),
            "softirq" => stat.soft_interrupts = fields.next().and_then(|v| v.parse().ok()),
            _ => {}
        }
    }
    if !seen_cpu {
        return Err(SourceError::Malformed {
            what: "/proc/stat",
            detail: "no aggregate cpu line".to_string(),
        });
    }
    Ok(stat)
}

/// Parse `/proc/meminfo` into byte counts
pub fn parse_meminfo(text: &str) -> Result<MemorySample, SourceError> {
    let entries: HashMap<&str, u64> = text
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
            Some((key.trim(), kb * 1024))
        })
        .collect();

    let total = *entries.get("MemTotal").ok_or_else(|| SourceError::Malformed {
        what: "/proc/meminfo",
        detail: "missing MemTotal".to_string(),
    })?;
    let free = entries.get("MemFree").copied().unwrap_or(0);
    let buffers = entries.get("Buffers").copied();
    let cached = entries
        .get("Cached")
        .map(|c| c + entries.get("SReclaimable").copied().unwrap_or(0));
    let available = entries
        .get("MemAvailable")
        .copied()
        .unwrap_or_else(|| free + buffers.unwrap_or(0) + cached.unwrap_or(0));
    let used = total
        .saturating_sub(free)
        .saturating_sub(buffers.unwrap_or(0))
        .saturating_sub(cached.unwrap_or(0));

    Ok(MemorySample {
        total,
        available,
        used,
        free,
        active: entries.get("Active").copied(),
        inactive: entries.get("Inactive").copied(),
        buffers,
        cached,
        wired: None,
        shared: entries.get("Shmem").copied(),
    })
}
