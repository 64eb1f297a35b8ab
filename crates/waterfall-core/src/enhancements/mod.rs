//! Post-processing of a computed waterfall: clawback exposure and lookback
//! carry-at-risk. Both are pure functions of the scenario's provisions and
//! the base results.

pub mod clawback;
pub mod lookback;

pub use clawback::calculate_clawback;
pub use lookback::calculate_lookback;

use crate::waterfall::{calculate_waterfall, CalculationOptions, WaterfallResults, WaterfallScenario};
use crate::EngineResult;

/// Attach the enabled provisions' analyses to `results`.
pub fn apply_enhancements(
    scenario: &WaterfallScenario,
    mut results: WaterfallResults,
) -> EngineResult<WaterfallResults> {
    results.clawback = match &scenario.clawback_provision {
        Some(p) => calculate_clawback(p, &results)?,
        None => None,
    };
    results.lookback = match &scenario.lookback_provision {
        Some(p) => calculate_lookback(p, &results)?,
        None => None,
    };
    Ok(results)
}

/// Dispatch by model and attach enhancements: the full calculation pipeline.
pub fn calculate_enhanced(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
) -> EngineResult<WaterfallResults> {
    let base = calculate_waterfall(scenario, options)?;
    apply_enhancements(scenario, base)
}
