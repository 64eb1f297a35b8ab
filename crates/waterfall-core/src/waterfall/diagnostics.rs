use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use tracing::warn;

use super::model::*;
use crate::types::*;

/// Slack allowed when checking that percentages add up to 100.
const PERCENT_TOLERANCE: Decimal = dec!(0.5);

/// Advisory checks on inputs the engine leaves to the caller.
///
/// Nothing here stops a calculation; each finding is logged at `warn` and
/// returned so front ends can show it next to the results.
pub fn scenario_warnings(scenario: &WaterfallScenario) -> Vec<String> {
    let mut warnings = Vec::new();

    if scenario.tiers.is_empty() {
        warnings.push("Scenario has no tiers; nothing will be distributed".to_string());
    }

    for investor_type in [InvestorType::Lp, InvestorType::Gp] {
        let classes: Vec<&InvestorClass> = scenario.classes_of(investor_type).collect();
        if classes.is_empty() {
            continue;
        }
        let label = match investor_type {
            InvestorType::Lp => "LP",
            InvestorType::Gp => "GP",
        };
        match checked_sum(classes.iter().map(|c| c.ownership_percentage), "ownership") {
            Ok(total) if (total - ONE_HUNDRED).abs() > PERCENT_TOLERANCE => warnings.push(format!(
                "{label} ownership percentages sum to {total}, expected 100"
            )),
            Ok(_) => {}
            Err(_) => warnings.push(format!("{label} ownership percentages are too large to total")),
        }
    }

    let mut seen = HashSet::new();
    for tier in &scenario.tiers {
        if !seen.insert(tier.order) {
            warnings.push(format!(
                "Tier order {} is used more than once; input sequence decides",
                tier.order
            ));
        }
    }

    if scenario.model == WaterfallModel::Blended {
        if let Some(config) = &scenario.blended_config {
            match config.european_weight.checked_add(config.american_weight) {
                Some(total) if total == ONE_HUNDRED => {}
                Some(total) => warnings.push(format!(
                    "Blended weights sum to {total}, not 100; results are not renormalised"
                )),
                None => warnings.push("Blended weights are too large to total".into()),
            }
        }
    }

    if scenario.exit_value < scenario.total_invested {
        warnings.push("Exit value is below total invested; capital is not fully returned".into());
    }

    for w in &warnings {
        warn!(scenario = %scenario.id, "{w}");
    }
    warnings
}
