mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::allocation::AllocationArgs;
use commands::calculate::CalculateArgs;
use commands::scenario::ScenarioArgs;
use commands::sensitivity::SensitivityArgs;

/// Fund distribution waterfall calculations
#[derive(Parser)]
#[command(
    name = "fwf",
    version,
    about = "Fund distribution waterfall calculations",
    long_about = "A CLI for splitting fund exit proceeds between LPs and the GP with decimal \
                  precision. Supports European, American and blended waterfalls, clawback \
                  and lookback analysis, exit-value sensitivity sweeps and a local scenario store."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// TOML configuration file (sensitivity constants, scenario store path)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log engine detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the waterfall for a scenario JSON document
    Calculate(CalculateArgs),
    /// Sweep the exit value and report how the split responds
    Sensitivity(SensitivityArgs),
    /// Check an LP allocation's gross / withholding / net figures
    ValidateAllocation(AllocationArgs),
    /// Manage scenarios in a local JSON store
    Scenario(ScenarioArgs),
    /// List the built-in scenario templates
    Templates,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> =
        config::load(cli.config.as_deref()).and_then(|cfg| match cli.command {
            Commands::Calculate(args) => commands::calculate::run_calculate(args),
            Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args, &cfg),
            Commands::ValidateAllocation(args) => commands::allocation::run_validate(args),
            Commands::Scenario(args) => commands::scenario::run_scenario(args, &cfg),
            Commands::Templates => commands::scenario::run_templates(),
            Commands::Version => Ok(serde_json::json!({
                "name": "fwf",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
