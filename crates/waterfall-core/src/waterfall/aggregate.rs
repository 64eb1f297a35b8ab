use rust_decimal::Decimal;

use super::allocator::{share_of, AllocationOutcome};
use super::model::*;
use super::results::*;
use super::timeline::build_tier_timeline;
use crate::types::*;
use crate::EngineResult;

/// Roll an allocation outcome up into the uniform result shape.
pub(crate) fn summarize(
    model: WaterfallModel,
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
    outcome: AllocationOutcome,
) -> EngineResult<WaterfallResults> {
    let tiers = outcome.tiers;

    let total_returned: Money = tiers.iter().map(|t| t.total_amount).sum();
    let gp_total_return: Money = tiers.iter().map(|t| t.gp_amount).sum();
    let lp_total_return: Money = tiers.iter().map(|t| t.lp_amount).sum();

    // GP receives only through profit tiers, so carry is everything it got
    // outside return of capital and the preferred return.
    let gp_carry: Money = tiers
        .iter()
        .filter(|t| !matches!(t.tier_type, TierType::Roc | TierType::PreferredReturn))
        .map(|t| t.gp_amount)
        .sum();

    let profit = total_returned - scenario.total_invested;
    let gp_carry_percentage = if profit > Decimal::ZERO {
        share_of(gp_carry, profit)?
    } else {
        Decimal::ZERO
    };

    let lp_average_multiple = if scenario.total_invested.is_zero() {
        Decimal::ZERO
    } else {
        checked_div(lp_total_return, scenario.total_invested, "LP average multiple")?
    };

    let investor_results = investor_results(scenario, options, &tiers, total_returned)?;
    let tier_timeline = build_tier_timeline(&tiers);

    Ok(WaterfallResults {
        model,
        total_exit_value: scenario.exit_value,
        total_invested: scenario.total_invested,
        total_returned,
        undistributed: outcome.undistributed,
        gp_carry,
        gp_carry_percentage,
        gp_management_fees: scenario.management_fees,
        gp_total_return,
        lp_total_return,
        lp_average_multiple,
        investor_results,
        tier_breakdown: tiers,
        tier_timeline,
        clawback: None,
        lookback: None,
        blended_breakdown: None,
    })
}

fn investor_results(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
    tiers: &[TierBreakdown],
    total_returned: Money,
) -> EngineResult<Vec<InvestorClassResult>> {
    let mut classes: Vec<&InvestorClass> = scenario.investor_classes.iter().collect();
    classes.sort_by_key(|c| c.order);

    classes
        .into_iter()
        .map(|class| {
            let mut row = InvestorClassResult {
                investor_class_id: class.id.clone(),
                investor_class_name: class.name.clone(),
                investor_type: class.investor_type,
                invested: class.invested(options.invested_basis),
                return_of_capital: Decimal::ZERO,
                preferred_return: Decimal::ZERO,
                catch_up: Decimal::ZERO,
                carried_interest: Decimal::ZERO,
                other: Decimal::ZERO,
                total_distribution: Decimal::ZERO,
                profit: Decimal::ZERO,
                multiple: Decimal::ZERO,
                percentage_of_total: Decimal::ZERO,
            };

            for tier in tiers {
                let received: Money = tier
                    .allocations
                    .iter()
                    .filter(|a| a.investor_class_id == class.id)
                    .map(|a| a.amount)
                    .sum();
                match tier.tier_type {
                    TierType::Roc => row.return_of_capital += received,
                    TierType::PreferredReturn => row.preferred_return += received,
                    TierType::CatchUp => row.catch_up += received,
                    TierType::Carry => row.carried_interest += received,
                    TierType::Custom => row.other += received,
                }
                row.total_distribution += received;
            }

            row.profit = row.total_distribution - row.return_of_capital;
            if !row.invested.is_zero() {
                row.multiple = checked_div(row.total_distribution, row.invested, "investor multiple")?;
            }
            row.percentage_of_total = share_of(row.total_distribution, total_returned)?;
            Ok(row)
        })
        .collect()
}
