use tracing::debug;

use super::aggregate::summarize;
use super::allocator::allocate_tiers;
use super::model::*;
use super::results::WaterfallResults;
use crate::EngineResult;

/// Calculate a deal-by-deal (American) distribution waterfall.
///
/// Scenarios carry a single exit value rather than a list of realisation
/// events, so each "deal" is the whole exit and the tier semantics match
/// the European calculation. Kept as its own entry point so per-event
/// proceeds can be modelled here without changing callers.
pub fn calculate_american(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
) -> EngineResult<WaterfallResults> {
    debug!(scenario = %scenario.id, exit_value = %scenario.exit_value, "american waterfall");
    let outcome = allocate_tiers(scenario, options)?;
    summarize(WaterfallModel::American, scenario, options, outcome)
}
