#![warn(missing_docs)]
//! RaySweep CLI Library
//!
//! This module provides the CLI that drives a renderer sweep and reads its
//! results back.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     raysweep_cli::run()
//! }
//! ```
//!
//! ```text
//! raysweep run --binary ./Arches-v2 --output-dir results
//! raysweep report --output-dir results --format csv
//! ```

mod config;
mod executor;
mod planner;
mod runner;

pub use config::*;
pub use executor::{
    MANIFEST_FILE_NAME, SweepEntry, SweepExecutor, SweepManifest, SweepMeta, SweepResults,
    SweepStatus, build_sweep_meta, format_plan_entry, format_sweep_summary, write_manifest,
};
pub use planner::{SweepPlan, build_plan};
pub use runner::*;

use clap::{Parser, Subcommand};
use raysweep_core::ConfigSpace;
use raysweep_report::{MetricExtractor, OutputFormat, collect_report, render_report};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// RaySweep CLI arguments
#[derive(Parser, Debug)]
#[command(name = "raysweep")]
#[command(author, version, about = "RaySweep - benchmark sweep harness for a ray-tracing renderer")]
pub struct Cli {
    /// Optional subcommand (Run, List, Report, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Renderer executable (overrides raysweep.toml)
    #[arg(long, global = true)]
    pub binary: Option<PathBuf>,

    /// Directory for captured logs (overrides raysweep.toml)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Explicit configuration file instead of discovery
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only visit experiments whose name matches this regex
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Report format: human, json, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Report file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Dry run - list planned commands without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Abort the sweep if the renderer binary is missing
    #[arg(long, global = true)]
    pub strict: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sweep (default)
    Run,
    /// List planned experiments and their command lines
    List,
    /// Extract metrics from captured logs without running anything
    Report,
    /// Print a default raysweep.toml
    Init,
}

/// Run the RaySweep CLI with the given arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the RaySweep CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    let filter = if cli.verbose {
        "raysweep=debug,raysweep_cli=debug,raysweep_report=debug"
    } else {
        "raysweep=info,raysweep_cli=info,raysweep_report=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if matches!(cli.command, Some(Commands::Init)) {
        print!("{}", RaySweepConfig::default_toml());
        return Ok(());
    }

    // Load raysweep.toml (CLI flags override)
    let config = match &cli.config {
        Some(path) => RaySweepConfig::load(path)?,
        None => RaySweepConfig::discover().unwrap_or_default(),
    };
    let settings = Settings::resolve(&cli, &config)?;

    match &cli.command {
        Some(Commands::List) => list_experiments(&settings),
        Some(Commands::Report) => report_metrics(&cli, &settings),
        Some(Commands::Run) | None if cli.dry_run => list_experiments(&settings),
        Some(Commands::Run) | None => run_sweep(&cli, &settings),
        Some(Commands::Init) => Ok(()),
    }
}

/// Effective settings after layering raysweep.toml and CLI flags
struct Settings {
    space: ConfigSpace,
    filter: Option<Regex>,
    binary: PathBuf,
    output_dir: PathBuf,
    policy: MissingBinaryPolicy,
    format: OutputFormat,
    write_manifest: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &RaySweepConfig) -> anyhow::Result<Self> {
        let space = config.sweep.to_space();
        space.validate()?;

        let filter = cli
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid --filter pattern: {}", e))?;

        let format_str = cli.format.as_deref().unwrap_or(&config.output.format);
        let format: OutputFormat = format_str.parse().map_err(|e: String| anyhow::anyhow!(e))?;

        let policy = if cli.strict {
            MissingBinaryPolicy::Abort
        } else {
            config.renderer.on_missing_binary
        };

        Ok(Self {
            space,
            filter,
            binary: cli
                .binary
                .clone()
                .unwrap_or_else(|| config.renderer.binary.clone()),
            output_dir: cli
                .output_dir
                .clone()
                .unwrap_or_else(|| config.output.directory.clone()),
            policy,
            format,
            write_manifest: config.output.write_manifest,
        })
    }

    fn runner(&self) -> Runner {
        Runner::new(&self.binary, &self.output_dir, self.policy)
    }

    fn plan(&self) -> SweepPlan<'_> {
        build_plan(&self.space, self.filter.clone())
    }
}

fn list_experiments(settings: &Settings) -> anyhow::Result<()> {
    println!("RaySweep Plan:");

    let runner = settings.runner();
    let plan = settings.plan();
    let mut total = 0;
    for config in plan.iter() {
        match runner.prepare(&config) {
            Ok((name, command)) => print!("{}", format_plan_entry(name.as_str(), Some(&command))),
            Err(e) => print!("{}", format_plan_entry(&format!("<invalid: {}>", e), None)),
        }
        total += 1;
    }

    let skipped = settings.space.len_unfiltered() - settings.space.iter().count();
    println!(
        "{} experiments planned ({} excluded by rules).",
        total, skipped
    );
    if !runner.binary_exists() {
        eprintln!(
            "Warning: renderer binary not found: {}",
            settings.binary.display()
        );
    }

    Ok(())
}

fn run_sweep(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let plan = settings.plan();
    if plan.is_empty() {
        println!("No experiments selected.");
        return Ok(());
    }

    println!(
        "Running {} experiments sequentially, logs in {}...\n",
        plan.len(),
        settings.output_dir.display()
    );

    let meta = build_sweep_meta(&settings.binary);
    let executor = SweepExecutor::new(settings.runner(), !cli.verbose);
    let results = executor.execute(&plan)?;

    if settings.write_manifest {
        let path = write_manifest(&settings.output_dir, meta, &results)?;
        tracing::debug!(path = %path.display(), "wrote sweep manifest");
    }

    print!("{}", format_sweep_summary(&results, &settings.output_dir));

    if results.has_failures() {
        eprintln!("\nSome experiments could not be run; see the *_err.txt files");
        std::process::exit(1);
    }

    Ok(())
}

fn report_metrics(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let extractor = MetricExtractor::default();
    let mut report = collect_report(&settings.space, &settings.output_dir, &extractor)?;

    if let Some(re) = &settings.filter {
        report.retain(|e| re.is_match(e.name.as_str()));
    }

    let output = render_report(&report, settings.format)?;

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}
