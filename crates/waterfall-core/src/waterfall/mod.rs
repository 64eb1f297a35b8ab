pub mod aggregate;
pub mod allocator;
pub mod american;
pub mod blended;
pub mod diagnostics;
pub mod european;
pub mod model;
pub mod results;
pub mod timeline;

pub use allocator::{allocate_tiers, AllocationOutcome};
pub use american::calculate_american;
pub use blended::{blend_results, calculate_blended};
pub use diagnostics::scenario_warnings;
pub use european::calculate_european;
pub use model::*;
pub use results::*;
pub use timeline::build_tier_timeline;

use crate::EngineResult;

/// Route a scenario to the calculator for its legal structure.
pub fn calculate_waterfall(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
) -> EngineResult<WaterfallResults> {
    match scenario.model {
        WaterfallModel::European => calculate_european(scenario, options),
        WaterfallModel::American => calculate_american(scenario, options),
        WaterfallModel::Blended => calculate_blended(scenario, options),
    }
}
