//! Metric source for the machine sysglance runs on
//!
//! On Linux the CPU and memory families come straight from `/proc`, which
//! exposes every time split and counter. Elsewhere sysinfo provides the
//! aggregate figures and the platform-only fields stay `None`.

use crate::procfs::{self, ProcStat};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use sysglance_core::{
    CoreSample, CpuCounters, CpuSample, CpuTimesPercent, MemorySample, MetricSource,
    NetworkCounters, SourceError,
};
use sysinfo::{CpuRefreshKind, Networks, RefreshKind, System};

/// Shared System instance for every local source.
/// The CPU and PERCPU plugins each own a source but refresh one System.
static SHARED_SYSTEM: Lazy<Mutex<System>> = Lazy::new(|| {
    log::info!("Creating shared System sysinfo instance");
    Mutex::new(System::new_with_specifics(
        RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
    ))
});

/// Shared Networks instance for every local source
static SHARED_NETWORKS: Lazy<Mutex<Networks>> = Lazy::new(|| {
    log::info!("Creating shared Networks sysinfo instance");
    Mutex::new(Networks::new_with_refreshed_list())
});

fn read_proc(path: &str) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_string(),
        source,
    })
}

/// Local metric source
///
/// Each instance keeps its own previous `/proc/stat` reading, so the
/// percentages it returns always cover the interval since its own last
/// call.
pub struct LocalSource {
    prev_stat: Option<ProcStat>,
    use_procfs: bool,
}

impl LocalSource {
    pub fn new() -> Self {
        Self {
            prev_stat: None,
            use_procfs: cfg!(target_os = "linux"),
        }
    }

    /// Read `/proc/stat` and return it with the previous reading
    fn proc_stat(&mut self) -> Result<(ProcStat, Option<ProcStat>), SourceError> {
        let stat = procfs::parse_proc_stat(&read_proc(procfs::PROC_STAT)?)?;
        let previous = self.prev_stat.replace(stat.clone());
        Ok((stat, previous))
    }

    fn with_system<T>(f: impl FnOnce(&mut System) -> T) -> T {
        let mut system = SHARED_SYSTEM.lock().unwrap_or_else(|poisoned| {
            log::warn!("System mutex was poisoned, recovering");
            poisoned.into_inner()
        });
        f(&mut system)
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for LocalSource {
    fn cpu(&mut self) -> Result<CpuSample, SourceError> {
        if self.use_procfs {
            let (stat, previous) = self.proc_stat()?;
            let times = stat.cpu.percent_since(previous.as_ref().map(|p| &p.cpu));
            return Ok(CpuSample {
                total: procfs::busy_percent(&times),
                times,
                counters: CpuCounters {
                    ctx_switches: stat.ctx_switches,
                    interrupts: stat.interrupts,
                    soft_interrupts: stat.soft_interrupts,
                    syscalls: None,
                },
            });
        }

        let total = Self::with_system(|system| {
            system.refresh_cpu_all();
            system.global_cpu_usage() as f64
        });
        Ok(CpuSample {
            total,
            times: CpuTimesPercent {
                idle: Some(100.0 - total),
                ..CpuTimesPercent::default()
            },
            counters: CpuCounters::default(),
        })
    }

    fn per_cpu(&mut self) -> Result<Vec<CoreSample>, SourceError> {
        if self.use_procfs {
            let (stat, previous) = self.proc_stat()?;
            let cores = stat
                .cores
                .iter()
                .enumerate()
                .map(|(i, core)| {
                    let before = previous.as_ref().and_then(|p| p.cores.get(i));
                    let times = core.percent_since(before);
                    CoreSample {
                        total: procfs::busy_percent(&times),
                        times,
                    }
                })
                .collect();
            return Ok(cores);
        }

        Ok(Self::with_system(|system| {
            system.refresh_cpu_all();
            system
                .cpus()
                .iter()
                .map(|cpu| {
                    let total = cpu.cpu_usage() as f64;
                    CoreSample {
                        total,
                        times: CpuTimesPercent {
                            idle: Some(100.0 - total),
                            ..CpuTimesPercent::default()
                        },
                    }
                })
                .collect()
        }))
    }

    fn memory(&mut self) -> Result<MemorySample, SourceError> {
        if self.use_procfs {
            return procfs::parse_meminfo(&read_proc(procfs::PROC_MEMINFO)?);
        }

        Ok(Self::with_system(|system| {
            system.refresh_memory();
            MemorySample {
                total: system.total_memory(),
                available: system.available_memory(),
                used: system.used_memory(),
                free: system.free_memory(),
                ..MemorySample::default()
            }
        }))
    }

    fn networks(&mut self) -> Result<Vec<NetworkCounters>, SourceError> {
        let mut networks = SHARED_NETWORKS.lock().unwrap_or_else(|poisoned| {
            log::warn!("Networks mutex was poisoned, recovering");
            poisoned.into_inner()
        });
        networks.refresh();

        let mut counters: Vec<NetworkCounters> = networks
            .iter()
            .map(|(name, data)| NetworkCounters {
                name: name.clone(),
                bytes_recv: data.total_received(),
                bytes_sent: data.total_transmitted(),
            })
            .collect();
        counters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counters)
    }

    fn logical_cores(&mut self) -> usize {
        Self::with_system(|system| system.cpus().len()).max(1)
    }
}
