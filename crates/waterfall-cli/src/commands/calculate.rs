use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use waterfall_core::enhancements::calculate_enhanced;
use waterfall_core::types::with_metadata;
use waterfall_core::waterfall::{
    scenario_warnings, CalculationOptions, WaterfallResults, WaterfallScenario,
};
use waterfall_core::EngineResult;

use super::{read_document, BasisArg};

/// Arguments for a single waterfall calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to a scenario JSON document
    #[arg(long)]
    pub input: Option<String>,

    /// Override the scenario's exit value
    #[arg(long)]
    pub exit_value: Option<Decimal>,

    /// Measure LP pro-rata shares by commitment or capital called
    #[arg(long, value_enum, default_value_t = BasisArg::Commitment)]
    pub basis: BasisArg,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut scenario: WaterfallScenario = read_document(args.input.as_deref(), "calculate")?;
    if let Some(exit_value) = args.exit_value {
        scenario.exit_value = exit_value;
    }
    let options: CalculationOptions = args.basis.into();
    calculation_envelope(&scenario, &options, || calculate_enhanced(&scenario, &options))
}

/// Run `calculate` and wrap its results with warnings and metadata.
pub(crate) fn calculation_envelope<F>(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
    calculate: F,
) -> Result<Value, Box<dyn std::error::Error>>
where
    F: FnOnce() -> EngineResult<WaterfallResults>,
{
    let start = Instant::now();
    let warnings = scenario_warnings(scenario);
    let results = calculate()?;

    let output = with_metadata(
        &format!("{} distribution waterfall", capitalise(scenario.model.as_str())),
        &serde_json::json!({
            "scenario": scenario.name,
            "exitValue": scenario.exit_value,
            "totalInvested": scenario.total_invested,
            "investedBasis": options.invested_basis,
            "tiers": scenario.tiers.len(),
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        results,
    );
    Ok(serde_json::to_value(output)?)
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
