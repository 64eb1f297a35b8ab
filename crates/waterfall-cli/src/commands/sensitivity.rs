use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use waterfall_core::sensitivity::{run_sensitivity as sweep, SensitivityMetric, SensitivityRequest};
use waterfall_core::types::with_metadata;
use waterfall_core::waterfall::{scenario_warnings, CalculationOptions, WaterfallScenario};

use super::{read_document, BasisArg};
use crate::config::CliConfig;

/// Arguments for an exit-value sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a scenario JSON document (its exit value is the base case)
    #[arg(long)]
    pub input: Option<String>,

    /// Lowest exit value as a multiple of the base (e.g. 0.5)
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Highest exit value as a multiple of the base (e.g. 3)
    #[arg(long)]
    pub max: Option<Decimal>,

    /// Number of intervals; one of the configured step options
    #[arg(long)]
    pub steps: Option<u32>,

    /// Report a single metric curve instead of full data points
    #[arg(long, value_enum)]
    pub metric: Option<MetricArg>,

    #[arg(long, value_enum, default_value_t = BasisArg::Commitment)]
    pub basis: BasisArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    GpCarry,
    GpTotalReturn,
    LpTotalReturn,
    LpAverageMultiple,
    GpCarryPercentage,
    TotalReturned,
    ClawbackDue,
    CarryAtRisk,
}

impl From<MetricArg> for SensitivityMetric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::GpCarry => SensitivityMetric::GpCarry,
            MetricArg::GpTotalReturn => SensitivityMetric::GpTotalReturn,
            MetricArg::LpTotalReturn => SensitivityMetric::LpTotalReturn,
            MetricArg::LpAverageMultiple => SensitivityMetric::LpAverageMultiple,
            MetricArg::GpCarryPercentage => SensitivityMetric::GpCarryPercentage,
            MetricArg::TotalReturned => SensitivityMetric::TotalReturned,
            MetricArg::ClawbackDue => SensitivityMetric::ClawbackDue,
            MetricArg::CarryAtRisk => SensitivityMetric::CarryAtRisk,
        }
    }
}

pub fn run_sensitivity(
    args: SensitivityArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario: WaterfallScenario = read_document(args.input.as_deref(), "sensitivity")?;
    let request = SensitivityRequest {
        min_multiplier: args.min,
        max_multiplier: args.max,
        steps: args.steps,
    };
    let options: CalculationOptions = args.basis.into();

    let start = Instant::now();
    let warnings = scenario_warnings(&scenario);
    let analysis = sweep(&scenario, &request, &config.sensitivity, &options)?;
    let elapsed = start.elapsed().as_micros() as u64;

    let assumptions = serde_json::json!({
        "scenario": scenario.name,
        "request": request,
        "config": config.sensitivity,
        "suggestedStep": config.sensitivity.suggested_step(scenario.exit_value)?,
    });
    let methodology = "Exit-value sweep re-running the full waterfall at each point";

    let output = match args.metric {
        Some(metric) => {
            let metric: SensitivityMetric = metric.into();
            let rows: Vec<Value> = analysis
                .curve(metric)
                .into_iter()
                .map(|(exit_value, value)| {
                    serde_json::json!({ "exitValue": exit_value, "value": value })
                })
                .collect();
            serde_json::to_value(with_metadata(
                methodology,
                &assumptions,
                warnings,
                elapsed,
                serde_json::json!({
                    "metric": metric,
                    "carryThresholdExitValue": analysis.carry_threshold_exit_value,
                    "dataPoints": rows,
                }),
            ))?
        }
        None => serde_json::to_value(with_metadata(
            methodology,
            &assumptions,
            warnings,
            elapsed,
            analysis,
        ))?,
    };
    Ok(output)
}
