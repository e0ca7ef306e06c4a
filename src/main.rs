use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use sysglance::config::AppConfig;
use sysglance::core::{
    CrosstermKeys, KeySource, LayoutEngine, LayoutSettings, RefreshScheduler, RenderSurface,
    Stats, SystemClock, TerminalSurface,
};
use sysglance_core::FormatContext;

/// sysglance - A live-refresh terminal system dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "sysglance")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seconds between two refreshes (overrides the config file)
    #[arg(short = 't', long = "refresh", value_name = "SECONDS")]
    refresh: Option<f64>,

    /// Configuration file to load instead of the default one
    #[arg(short = 'C', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Show one row per CPU core instead of the CPU summary
    #[arg(short = '1', long = "percpu")]
    percpu: bool,

    /// Disable a plugin by id (repeatable)
    #[arg(long = "disable", value_name = "PLUGIN")]
    disable: Vec<String>,

    /// Print one JSON snapshot of every plugin and exit
    #[arg(long = "once")]
    once: bool,

    /// Log file used while the dashboard is on screen
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Initialize logger with verbosity based on -d/--debug flag.
/// The dashboard owns the terminal, so records go to a file unless `to_stderr`.
fn init_logging(cli: &Cli, to_stderr: bool) -> Result<()> {
    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if !to_stderr {
        let path = match &cli.log_file {
            Some(path) => path.clone(),
            None => AppConfig::log_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Config file (or defaults) with the command line overrides applied
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }),
    };

    if let Some(refresh) = cli.refresh {
        config.refresh_secs = refresh;
    }
    if cli.percpu {
        config.display.percpu = true;
    }
    for id in &cli.disable {
        config.disable(id);
    }
    Ok(config)
}

fn format_context(config: &AppConfig) -> FormatContext {
    FormatContext {
        max_width: None,
        percpu: config.display.percpu,
        max_processes: config.display.max_processes,
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    init_logging(&cli, cli.once)?;
    warn!("Starting sysglance v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let mut stats = Stats::from_config(&config);

    if cli.once {
        // Counters need two samples to produce deltas
        stats.update();
        std::thread::sleep(Duration::from_secs_f64(config.refresh_secs.clamp(0.1, 10.0)));
        stats.update();
        let json = stats.to_json(&format_context(&config))?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    run(&config, &mut stats)
}

/// Sample, compose and repaint until the user exits
fn run(config: &AppConfig, stats: &mut Stats) -> Result<()> {
    let mut surface = TerminalSurface::stdout()?;
    let mut keys = match CrosstermKeys::new() {
        Ok(keys) => keys,
        Err(e) => {
            surface.restore();
            return Err(e);
        }
    };
    let mut clock = SystemClock;
    let scheduler = RefreshScheduler::new(Duration::from_millis(config.poll_slice_ms));
    let mut engine = LayoutEngine::new(LayoutSettings::from(&config.layout));
    let ctx = format_context(config);
    info!(
        "Refreshing every {}s, polling keys every {:?}",
        config.refresh_secs,
        scheduler.poll_slice()
    );

    let result = loop {
        let started = Instant::now();
        engine.begin_sampling();
        stats.update();
        engine.rebuild(stats.registry(), &ctx);

        // The time spent sampling comes out of this cycle
        let remaining = config.refresh_secs - started.elapsed().as_secs_f64();
        let tree = engine.tree();
        let exit = scheduler.run_cycle(remaining, &mut keys, &mut clock, |force| {
            surface.paint(tree, force)
        });
        match exit {
            Ok(true) => break Ok(()),
            Ok(false) => engine.finish_cycle(),
            Err(e) => break Err(e),
        }
    };

    stats.close();
    keys.restore();
    surface.restore();
    if let Err(e) = &result {
        error!("Dashboard stopped: {:#}", e);
    }
    result
}
