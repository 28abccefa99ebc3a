//! phasetree CLI - Schedule and weight validation for project plans
//!
//! Command-line interface for checking plan files and reporting their
//! schedule status.

mod config;
mod diagnostics;
mod status;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use phasetree_check::Checker;
use phasetree_core::{dates, ProjectPlan};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_config, Config};
use crate::diagnostics::{
    collect_diagnostics, DiagnosticConfig, DiagnosticEmitter, ExitCode, JsonEmitter,
    TerminalEmitter,
};
use crate::status::StatusReport;

#[derive(Parser)]
#[command(name = "phasetree")]
#[command(author, version, about = "Schedule and weight validation for project plans", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: phasetree.toml in the current directory or a parent)
    #[arg(long, env = "PHASETREE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plan file
    Check {
        /// Plan file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Report milestone and activity schedule status
    Status {
        /// Plan file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Status date (default: today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn read_plan(file: &Path) -> Result<ProjectPlan> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let plan: ProjectPlan = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid plan", file.display()))?;
    info!(
        file = %file.display(),
        phases = plan.phases.len(),
        "loaded plan"
    );
    Ok(plan)
}

fn cmd_check(file: &Path, format: OutputFormat, quiet: bool, config: &Config) -> Result<ExitCode> {
    let plan = read_plan(file)?;
    let report = Checker::with_config(config.validation.clone()).validate_plan(&plan);
    let stdout = io::stdout();
    let mut emitter: Box<dyn DiagnosticEmitter> = match format {
        OutputFormat::Text => Box::new(TerminalEmitter::new(
            stdout.lock(),
            file,
            DiagnosticConfig { quiet },
        )),
        OutputFormat::Json => Box::new(JsonEmitter::new(stdout.lock(), file)),
    };
    for diagnostic in collect_diagnostics(&plan, &report) {
        emitter.emit(diagnostic);
    }
    emitter.finish()?;
    Ok(emitter.exit_code())
}

fn cmd_status(
    file: &Path,
    as_of: Option<NaiveDate>,
    format: OutputFormat,
    config: &Config,
) -> Result<ExitCode> {
    let plan = read_plan(file)?;
    let today = as_of.unwrap_or_else(|| dates::as_of(&chrono::Local::now()));
    let report = StatusReport::build(&plan, today, &config.delay);

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => report.write_text(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(ExitCode::Success)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let config = load_config(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Check {
            file,
            format,
            quiet,
        } => cmd_check(&file, format, quiet, &config),
        Commands::Status {
            file,
            as_of,
            format,
        } => cmd_status(&file, as_of, format, &config),
    }
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::ExitCode::from(2)
        }
    }
}
