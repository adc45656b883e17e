//! Sentinel CLI - command-line surface for the traffic risk simulator

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr; reports go to stdout

use anyhow::Context;
use clap::{Parser, Subcommand};
use sentinel_core::config::{self, ResolvedConfig};
use sentinel_core::{
    assess, render_json, render_sweep_json, render_sweep_text, render_text, sweep, Recalibrator,
    RequestToken,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Simulated traffic accident risk and deployment planning by time window")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess every zone for one time slot
    Assess {
        /// Time slot id (e.g. t4)
        #[arg(long, conflicts_with = "hour")]
        slot: Option<String>,

        /// Hour of day; must match a configured slot's hour
        #[arg(long)]
        hour: Option<i32>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Assess every time slot
    Sweep {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List configured time slots
    Slots {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List configured zones
    Zones {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Read slot ids from stdin and print each applied assessment
    ///
    /// Selections arriving before the previous one is applied supersede it.
    Watch {
        /// Override the recalibration delay in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Assess { slot, hour, format, config } => {
            let resolved = load_config(config)?;
            let catalog = &resolved.catalog;

            let selected = match (slot, hour) {
                (Some(id), _) => catalog
                    .slot(&id)
                    .with_context(|| format!("unknown time slot: {}", id))?,
                (None, Some(h)) => catalog
                    .slot_for_hour(h)
                    .with_context(|| format!("no time slot starts at hour {}", h))?,
                (None, None) => &resolved.default_slot,
            };

            let assessment = assess(catalog, selected);
            match format {
                OutputFormat::Text => print!("{}", render_text(catalog, &assessment)),
                OutputFormat::Json => println!("{}", render_json(&assessment)),
            }
        }
        Commands::Sweep { format, config } => {
            let resolved = load_config(config)?;
            let assessments = sweep(&resolved.catalog);
            match format {
                OutputFormat::Text => print!("{}", render_sweep_text(&assessments)),
                OutputFormat::Json => println!("{}", render_sweep_json(&assessments)),
            }
        }
        Commands::Slots { config } => {
            let resolved = load_config(config)?;
            for slot in resolved.catalog.time_slots() {
                let marker = if slot.id == resolved.default_slot.id { "*" } else { " " };
                println!("{} {:<6} {:<15} hour={}", marker, slot.id, slot.label, slot.hour);
            }
        }
        Commands::Zones { config } => {
            let resolved = load_config(config)?;
            for zone in resolved.catalog.zones() {
                println!("{:<12} {:<8} {}", zone.id, zone.category.as_str(), zone.name);
            }
        }
        Commands::Watch { delay_ms, format, config } => {
            let resolved = load_config(config)?;
            let delay = delay_ms
                .map(Duration::from_millis)
                .unwrap_or(resolved.recalibration_delay);
            run_watch(resolved, delay, format)?;
        }
    }

    Ok(())
}

/// Initialize stderr logging from RUST_LOG, falling back to the verbosity flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load config from an explicit path or discover it in the working directory
fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<ResolvedConfig> {
    let cwd = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&cwd, config_path.as_deref())?;
    if let Some(ref path) = resolved.config_path {
        tracing::info!("Using config: {}", path.display());
    }
    Ok(resolved)
}

/// Feed stdin selections to a recalibrator
///
/// Each line is a slot id. Selections are made as fast as lines arrive while a
/// printer thread writes every assessment as soon as it is applied. After input
/// ends the final selection is waited for before exiting.
fn run_watch(resolved: ResolvedConfig, delay: Duration, format: OutputFormat) -> anyhow::Result<()> {
    let recalibrator = Recalibrator::new(resolved.catalog, delay)?;
    tracing::debug!(delay_ms = recalibrator.delay().as_millis() as u64, "watching stdin for selections");

    std::thread::scope(|s| {
        let printer = s.spawn(|| print_applied(&recalibrator, format));

        let result = read_selections(&recalibrator);
        if result.is_ok() {
            recalibrator.wait_latest();
        }
        recalibrator.close();

        if printer.join().is_err() {
            tracing::error!("watch printer thread panicked");
        }
        result
    })?;

    tracing::debug!(discarded = recalibrator.discarded(), "watch finished");
    Ok(())
}

fn read_selections(recalibrator: &Recalibrator) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read selection from stdin")?;
        let slot_id = line.trim();
        if slot_id.is_empty() {
            continue;
        }

        match recalibrator.select_id(slot_id) {
            Ok(token) => tracing::debug!(token = token.value(), slot = slot_id, "selected"),
            Err(e) => tracing::warn!("{:#}", e),
        }
    }
    Ok(())
}

/// Print each newly applied assessment until the recalibrator is closed
fn print_applied(recalibrator: &Recalibrator, format: OutputFormat) {
    let mut printed: Option<RequestToken> = None;
    while let Some((token, assessment)) = recalibrator.wait_applied_after(printed) {
        match format {
            OutputFormat::Text => print!("{}", render_text(recalibrator.catalog(), &assessment)),
            OutputFormat::Json => println!("{}", render_json(&assessment)),
        }
        printed = Some(token);
    }
}
