//! Vesper package manager CLI
//!
//! `vesper init` bootstraps a project, `vesper install` resolves and
//! places the manifest's dependencies, `vesper update` moves every
//! dependency to the latest published version. The process exits 0 only
//! when every dependency succeeded.

mod output;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use vesper_pm::commands::{init_project, install_dependencies, update_dependencies, PmContext};
use vesper_pm::RunSummary;

use output::{resolve_color_choice, ConsoleReporter};

#[derive(Parser)]
#[command(name = "vesper")]
#[command(about = "Vesper package manager", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Vesper project
    Init {
        /// Project name
        name: String,
    },

    /// Install dependencies from vesper.json
    Install,

    /// Update dependencies to their latest versions
    Update,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut reporter = ConsoleReporter::new(resolve_color_choice());

    let result = match cli.command {
        Commands::Init { name } => run_init(&name),
        Commands::Install => run_install(&mut reporter),
        Commands::Update => run_update(&mut reporter),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_init(name: &str) -> anyhow::Result<ExitCode> {
    let cwd = env::current_dir().context("cannot determine current directory")?;
    let manifest_path = init_project(&cwd, name)?;
    println!("created {}", manifest_path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_install(reporter: &mut ConsoleReporter) -> anyhow::Result<ExitCode> {
    let cwd = env::current_dir().context("cannot determine current directory")?;
    let ctx = PmContext::from_env();
    let summary = install_dependencies(&ctx, &cwd, reporter)?;
    reporter.summary(&summary);
    Ok(exit_for(&summary))
}

fn run_update(reporter: &mut ConsoleReporter) -> anyhow::Result<ExitCode> {
    let cwd = env::current_dir().context("cannot determine current directory")?;
    let ctx = PmContext::from_env();
    let summary = update_dependencies(&ctx, &cwd, reporter)?;
    reporter.summary(&summary);
    Ok(exit_for(&summary))
}

fn exit_for(summary: &RunSummary) -> ExitCode {
    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
