use tracing::debug;

use super::aggregate::summarize;
use super::allocator::allocate_tiers;
use super::model::*;
use super::results::WaterfallResults;
use crate::EngineResult;

/// Calculate a whole-fund (European) distribution waterfall.
///
/// Every tier is cleared once against the full exit value: capital and the
/// preferred return are repaid fund-wide before the GP participates.
pub fn calculate_european(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
) -> EngineResult<WaterfallResults> {
    debug!(scenario = %scenario.id, exit_value = %scenario.exit_value, "european waterfall");
    let outcome = allocate_tiers(scenario, options)?;
    summarize(WaterfallModel::European, scenario, options, outcome)
}
