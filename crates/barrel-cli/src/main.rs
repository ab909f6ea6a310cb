//! CLI entry point for barrelgen.
//!
//! Generates barrel modules for a TypeScript/JavaScript source tree,
//! resolving export name collisions between files and subdirectories.
//!
//! # Usage
//!
//! ```bash
//! barrelgen generate <ROOT> [OPTIONS]
//!
//! # Preview the barrels without touching any file
//! barrelgen generate ./src --dry-run
//!
//! # Only process two top-level categories, with a priority table
//! barrelgen generate ./src --category api --category models --config barrelgen.json
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::process::ExitCode;

use barrel_core::Config;
use barrel_gen::{PassController, RunReport};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Barrel export generator with cross-module conflict resolution.
#[derive(Parser)]
#[command(name = "barrelgen", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate barrels for a source tree.
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Root directory of the source tree.
    root: Utf8PathBuf,

    /// Analyze and print the plan without writing barrels or healing files.
    #[arg(long)]
    dry_run: bool,

    /// Top-level category directory to process (repeatable).
    #[arg(short, long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// JSON configuration file.
    #[arg(long, env = "BARRELGEN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Where to write the JSON run report.
    #[arg(long, default_value = "barrel-report.json")]
    report: Utf8PathBuf,

    /// Upper bound on analysis/fix passes.
    #[arg(long, value_name = "N")]
    max_passes: Option<usize>,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the config file (if any) and CLI overrides.
///
/// # Errors
///
/// Returns an error if the root is not a directory, the config file cannot
/// be read, or the merged configuration is invalid.
fn build_config(args: &GenerateArgs) -> color_eyre::Result<Config> {
    if !args.root.is_dir() {
        return Err(eyre!("Root is not a directory: {}", args.root));
    }

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load config {path}"))?,
        None => Config::default(),
    };

    config.generate.root_path.clone_from(&args.root);
    if !args.categories.is_empty() {
        config.generate.categories.clone_from(&args.categories);
    }
    if let Some(max_passes) = args.max_passes {
        config.heal.max_passes = max_passes;
    }

    config.validate().wrap_err("Invalid configuration")?;
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the generator, writes the report and prints the summary.
///
/// # Errors
///
/// Returns an error if the tree cannot be scanned or the report cannot be
/// written. Per-directory failures are reported through the exit code.
fn run_generate(args: &GenerateArgs) -> color_eyre::Result<ExitCode> {
    let config = build_config(args)?;
    info!(root = %config.generate.root_path, dry_run = args.dry_run, "Generating barrels");

    let report = PassController::new(&config, args.dry_run)
        .run()
        .wrap_err("Generation failed")?;

    report
        .write_to(&args.report)
        .wrap_err_with(|| format!("Failed to write report {}", args.report))?;
    info!(path = %args.report, "Report written");

    if report.dry_run {
        print_plan(&report)?;
    }
    print_summary(&report)?;

    if report.has_errors() {
        print_errors(&report)?;
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints each planned barrel.
fn print_plan(report: &RunReport) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    for (directory, barrel) in &report.plan {
        writeln!(handle)?;
        writeln!(handle, "── {directory}")?;
        write!(handle, "{barrel}")?;
    }
    Ok(())
}

/// Prints counts, conflicts and warnings.
fn print_summary(report: &RunReport) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    writeln!(handle, "Barrel Generation Summary")?;
    writeln!(handle, "=========================")?;
    writeln!(handle)?;
    writeln!(handle, "Files analyzed:       {}", report.files_analyzed)?;
    writeln!(handle, "Unique export names:  {}", report.unique_export_names)?;
    writeln!(handle, "Conflicts resolved:   {}", report.conflicts.len())?;
    let written = if report.dry_run { "Barrels to write:" } else { "Barrels written:" };
    writeln!(handle, "{written:<22}{}", report.barrels_written)?;
    writeln!(handle, "Barrels unchanged:    {}", report.barrels_unchanged)?;
    writeln!(handle, "Barrels removed:      {}", report.barrels_removed)?;
    writeln!(handle, "Files healed:         {}", report.healed.len())?;
    writeln!(
        handle,
        "Passes:               {}{}",
        report.passes,
        if report.converged { "" } else { " (not converged)" }
    )?;

    if !report.conflicts.is_empty() {
        writeln!(handle)?;
        writeln!(handle, "Conflicts ({}):", report.conflicts.len())?;
        for conflict in &report.conflicts {
            writeln!(
                handle,
                "  {} in {} -> {}",
                conflict.name,
                conflict.directory,
                conflict.strategy.label()
            )?;
            for outcome in &conflict.contributors {
                match &outcome.alias {
                    Some(alias) => writeln!(
                        handle,
                        "    {} ({} as {alias})",
                        outcome.contributor.path,
                        outcome.strategy.label()
                    )?,
                    None => writeln!(
                        handle,
                        "    {} ({})",
                        outcome.contributor.path,
                        outcome.strategy.label()
                    )?,
                }
            }
        }
    }

    if !report.warnings.is_empty() {
        writeln!(handle)?;
        writeln!(handle, "Warnings ({}):", report.warnings.len())?;
        for warning in &report.warnings {
            writeln!(handle, "  {warning}")?;
        }
    }
    Ok(())
}

/// Lists the directories and files that failed.
fn print_errors(report: &RunReport) -> std::io::Result<()> {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();

    writeln!(handle)?;
    writeln!(handle, "Errors ({}):", report.errors.len())?;
    for error in &report.errors {
        writeln!(handle, "  [{}] {}", error.kind, error.message)?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to the command
    match &cli.command {
        Commands::Generate(args) => run_generate(args),
    }
}
