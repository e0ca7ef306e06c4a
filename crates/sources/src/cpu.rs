//! CPU plugin
//!
//! Aggregate CPU usage with the time split and the per-second event
//! counters. Works on a local metric source or on a remote agent.

use crate::defaults::plugin_config;
use sysglance_core::format::LineBuilder;
use sysglance_core::remote::parse_scalar;
use sysglance_core::{
    auto_unit, counter_delta, CpuCounters, Decorator, DisplayFormatter, DisplayLine,
    FieldMetadata, FieldUnit, FieldValue, FormatContext, FormatError, InputMethod, MetricSource,
    PluginConfig, PluginMetadata, PluginState, RemoteSystem, SampleError, SampledPlugin,
    ScalarSource, Snapshot, TrendHistory, ViewSet,
};

pub const CPU_ID: &str = "cpu";

const SNMP_DEFAULT: [(&str, &str); 3] = [
    ("user", "1.3.6.1.4.1.2021.11.9.0"),
    ("system", "1.3.6.1.4.1.2021.11.10.0"),
    ("idle", "1.3.6.1.4.1.2021.11.11.0"),
];
const SNMP_PERCENT_TABLE: [(&str, &str); 1] = [("percent", "1.3.6.1.2.1.25.3.3.1.2")];
const SNMP_NETAPP: [(&str, &str); 3] = [
    ("system", "1.3.6.1.4.1.789.1.2.1.3.0"),
    ("idle", "1.3.6.1.4.1.789.1.2.1.5.0"),
    ("cpucore", "1.3.6.1.4.1.789.1.2.1.6.0"),
];

/// Fields that feed the event log when they reach WARNING
pub const LOGGED_FIELDS: [&str; 4] = ["user", "system", "iowait", "total"];

/// CPU panel formatter
pub struct CpuFormatter {
    /// The syscall counter is always zero on Linux
    hide_syscalls: bool,
}

impl CpuFormatter {
    pub fn new(hide_syscalls: bool) -> Self {
        Self { hide_syscalls }
    }
}

impl Default for CpuFormatter {
    fn default() -> Self {
        Self::new(cfg!(target_os = "linux"))
    }
}

/// Per-second rate of a counter delta, truncated to an integer
fn per_second(snapshot: &Snapshot, key: &str) -> Option<i64> {
    snapshot.rate(key).map(|r| r.floor() as i64)
}

impl DisplayFormatter for CpuFormatter {
    fn format(
        &self,
        snapshot: &Snapshot,
        views: &ViewSet,
        history: &TrendHistory,
        _ctx: &FormatContext,
    ) -> Result<Vec<DisplayLine>, FormatError> {
        let total = snapshot
            .get_f64("total")
            .ok_or_else(|| FormatError::MissingField("total".to_string()))?;
        // Without a user figure only idle and the core count can be shown
        let idle_tag = !snapshot.contains_key("user");
        let opt = |key: &str| views.is_optional(key);
        let mut b = LineBuilder::new();

        // Header, total, idle, context switches
        b.title("CPU");
        b.text(format!(" {:4}", history.combined("user", "system").glyph()));
        b.value(format!("{:5.1}%", total), views.get("total"));
        if let (Some(idle), false) = (snapshot.get_f64("idle"), idle_tag) {
            b.text_opt(format!("  {:8}", "idle:"), opt("idle"));
            b.text_opt(format!("{:5.1}%", idle), opt("idle"));
        }
        if let Some(rate) = per_second(snapshot, "ctx_switches") {
            b.text_opt(format!("  {:8}", "ctx_sw:"), opt("ctx_switches"));
            b.value(
                format!("{:>5}", auto_unit(rate as f64, Some('K'))),
                views.get("ctx_switches"),
            );
        }

        // user, irq, interrupts
        b.newline();
        if let Some(user) = snapshot.get_f64("user") {
            b.text(format!("{:8}", "user:"));
            b.value(format!("{:5.1}%", user), views.get("user"));
        } else if let Some(idle) = snapshot.get_f64("idle") {
            b.text(format!("{:8}", "idle:"));
            b.text(format!("{:5.1}%", idle));
        }
        if let Some(irq) = snapshot.get_f64("irq") {
            b.text_opt(format!("  {:8}", "irq:"), opt("irq"));
            b.text_opt(format!("{:5.1}%", irq), opt("irq"));
        }
        if let Some(rate) = per_second(snapshot, "interrupts") {
            b.text_opt(format!("  {:8}", "inter:"), opt("interrupts"));
            b.text_opt(format!("{:>5}", rate), opt("interrupts"));
        }

        // system or core count, nice, soft interrupts
        b.newline();
        match snapshot.get_f64("system") {
            Some(system) if !idle_tag => {
                b.text(format!("{:8}", "system:"));
                b.value(format!("{:5.1}%", system), views.get("system"));
            }
            _ => {
                let cores = snapshot.get_i64("cpucore").unwrap_or(0);
                b.text(format!("{:8}", "core:"));
                b.text(format!("{:>6}", cores));
            }
        }
        if let Some(nice) = snapshot.get_f64("nice") {
            b.text_opt(format!("  {:8}", "nice:"), opt("nice"));
            b.text_opt(format!("{:5.1}%", nice), opt("nice"));
        }
        if let Some(rate) = per_second(snapshot, "soft_interrupts") {
            b.text_opt(format!("  {:8}", "sw_int:"), opt("soft_interrupts"));
            b.text_opt(format!("{:>5}", rate), opt("soft_interrupts"));
        }

        // iowait, steal, syscalls
        b.newline();
        if let Some(iowait) = snapshot.get_f64("iowait") {
            b.text_opt(format!("{:8}", "iowait:"), opt("iowait"));
            b.value(format!("{:5.1}%", iowait), views.get("iowait"));
        }
        if let Some(steal) = snapshot.get_f64("steal") {
            b.text_opt(format!("  {:8}", "steal:"), opt("steal"));
            b.value(format!("{:5.1}%", steal), views.get("steal"));
        }
        if !self.hide_syscalls {
            if let Some(rate) = per_second(snapshot, "syscalls") {
                b.text_opt(format!("  {:8}", "syscal:"), opt("syscalls"));
                b.text_opt(format!("{:>5}", rate), opt("syscalls"));
            }
        }

        Ok(b.build())
    }
}

/// CPU plugin
pub struct CpuPlugin {
    metadata: PluginMetadata,
    state: PluginState,
    input: InputMethod,
    /// Raw counters of the previous sample, `None` until the first one
    previous: Option<CpuCounters>,
    cores: usize,
    formatter: CpuFormatter,
}

impl CpuPlugin {
    pub fn new(mut input: InputMethod, config: PluginConfig) -> Self {
        let cores = match &mut input {
            InputMethod::Local(source) => source.logical_cores(),
            InputMethod::Remote(_) => 1,
        };
        Self {
            metadata: PluginMetadata::new(CPU_ID, "CPU", "Aggregate CPU usage and event rates"),
            state: PluginState::new(config),
            input,
            previous: None,
            cores,
            formatter: CpuFormatter::default(),
        }
    }

    /// Plugin with the default thresholds
    pub fn with_defaults(input: InputMethod) -> Self {
        Self::new(input, plugin_config(CPU_ID))
    }

    pub fn with_formatter(mut self, formatter: CpuFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    fn collect_local(
        source: &mut dyn MetricSource,
        previous: &mut Option<CpuCounters>,
    ) -> Result<Snapshot, SampleError> {
        let sample = source.cpu()?;
        let mut snapshot = Snapshot::new();
        snapshot.insert("total", sample.total);
        for (name, value) in sample.times.fields() {
            if let Some(value) = value {
                snapshot.insert(name, value);
            }
        }
        for (name, raw) in sample.counters.fields() {
            if let Some(raw) = raw {
                let before = previous.as_ref().and_then(|p| p.get(name));
                snapshot.insert(name, counter_delta(before, raw));
            }
        }
        *previous = Some(sample.counters);
        snapshot.insert("cpucore", source.logical_cores());
        Ok(snapshot)
    }

    fn collect_remote(source: &mut dyn ScalarSource) -> Result<Snapshot, SampleError> {
        let mut snapshot = Snapshot::new();
        match source.system_kind() {
            RemoteSystem::Windows | RemoteSystem::Esxi => {
                let answers = source.get_bulk(&SNMP_PERCENT_TABLE)?;
                let loads: Vec<f64> = answers
                    .iter()
                    .filter(|(key, _)| key.starts_with("percent"))
                    .filter_map(|(key, _)| parse_scalar(&answers, key))
                    .collect();
                if loads.is_empty() {
                    return Err(SampleError::RemoteUnavailable("percent".to_string()));
                }
                let busy = loads.iter().sum::<f64>() / loads.len() as f64;
                snapshot.insert("total", busy);
                snapshot.insert("idle", 100.0 - busy);
                snapshot.insert("cpucore", loads.len());
            }
            kind => {
                let oids: &[(&str, &str)] = if kind == RemoteSystem::NetApp {
                    &SNMP_NETAPP
                } else {
                    &SNMP_DEFAULT
                };
                let answers = source.get(oids)?;
                for (field, _) in oids {
                    let value = parse_scalar(&answers, field)
                        .ok_or_else(|| SampleError::RemoteUnavailable(field.to_string()))?;
                    if *field == "cpucore" {
                        snapshot.insert(*field, value as i64);
                    } else {
                        snapshot.insert(*field, value);
                    }
                }
                let idle = snapshot.get_f64("idle").unwrap_or(100.0);
                snapshot.insert("total", 100.0 - idle);
            }
        }
        Ok(snapshot)
    }
}

impl SampledPlugin for CpuPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn fields(&self) -> Vec<FieldMetadata> {
        vec![
            FieldMetadata::new("total", "Sum of all CPU percentages except idle", FieldUnit::Percent),
            FieldMetadata::new("user", "Time spent in user space", FieldUnit::Percent),
            FieldMetadata::new("system", "Time spent in kernel space", FieldUnit::Percent),
            FieldMetadata::new("idle", "Time spent doing nothing", FieldUnit::Percent).optional(),
            FieldMetadata::new("nice", "Time spent on niced processes", FieldUnit::Percent)
                .optional(),
            FieldMetadata::new("iowait", "Time spent waiting for I/O", FieldUnit::Percent),
            FieldMetadata::new("irq", "Time spent servicing interrupts", FieldUnit::Percent)
                .optional(),
            FieldMetadata::new("softirq", "Time spent servicing soft interrupts", FieldUnit::Percent),
            FieldMetadata::new("steal", "Time stolen by the hypervisor", FieldUnit::Percent)
                .optional(),
            FieldMetadata::new("guest", "Time spent running guests", FieldUnit::Percent),
            FieldMetadata::new("guest_nice", "Time spent running niced guests", FieldUnit::Percent),
            FieldMetadata::new("ctx_switches", "Context switches", FieldUnit::Number)
                .rate()
                .optional()
                .short_name("ctx_sw")
                .min_symbol('K'),
            FieldMetadata::new("interrupts", "Interrupts", FieldUnit::Number)
                .rate()
                .optional()
                .short_name("inter"),
            FieldMetadata::new("soft_interrupts", "Software interrupts", FieldUnit::Number)
                .rate()
                .optional()
                .short_name("sw_int"),
            FieldMetadata::new("syscalls", "System calls", FieldUnit::Number)
                .rate()
                .optional()
                .short_name("syscal"),
            FieldMetadata::new("cpucore", "Number of logical cores", FieldUnit::Number),
        ]
    }

    fn state(&self) -> &PluginState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PluginState {
        &mut self.state
    }

    fn collect(&mut self, _elapsed: f64) -> Result<Snapshot, SampleError> {
        match &mut self.input {
            InputMethod::Local(source) => Self::collect_local(source.as_mut(), &mut self.previous),
            InputMethod::Remote(source) => {
                let snapshot = Self::collect_remote(source.as_mut())?;
                if let Some(cores) = snapshot.get_i64("cpucore") {
                    self.cores = cores.max(1) as usize;
                }
                Ok(snapshot)
            }
        }
    }

    fn init_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::with_defaults(["total"], FieldValue::Float(0.0));
        snapshot.insert("cpucore", self.cores);
        snapshot
    }

    fn decorate(&self, snapshot: &Snapshot) -> ViewSet {
        let fields = self.fields();
        let mut decorator = Decorator::new(snapshot, &self.state.config, &fields);
        for key in LOGGED_FIELDS {
            decorator = decorator.alert(key);
        }
        decorator = decorator.alert("steal");
        let cores = decorator.value("cpucore").unwrap_or(1.0);
        decorator.alert_scaled("ctx_switches", 100.0 * cores).finish()
    }

    fn formatter(&self) -> &dyn DisplayFormatter {
        &self.formatter
    }

    fn tracked_fields(&self) -> &[&'static str] {
        &["user", "system"]
    }

    fn is_displayed(&self, ctx: &FormatContext) -> bool {
        self.state.config.enabled && !ctx.percpu && !self.snapshot().is_empty()
    }
}
