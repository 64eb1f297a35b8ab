use rust_decimal::Decimal;

use crate::types::*;
use crate::EngineResult;
use crate::waterfall::{ClawbackAnalysis, ClawbackProvision, ClawbackStatus, WaterfallResults};

/// Measure the GP's clawback exposure against a computed waterfall.
///
/// LPs are owed `total_invested × (1 + hurdle)`; any shortfall against what
/// was returned is repayable at `clawback_rate`, never more than the carry
/// actually paid. Returns `None` when the provision is disabled.
pub fn calculate_clawback(
    provision: &ClawbackProvision,
    results: &WaterfallResults,
) -> EngineResult<Option<ClawbackAnalysis>> {
    if !provision.enabled {
        return Ok(None);
    }

    let required_return = checked_mul(
        results.total_invested,
        Decimal::ONE + pct(provision.hurdle_rate),
        "clawback required return",
    )?;
    let shortfall = checked_sub(required_return, results.total_returned, "clawback shortfall")?
        .max(Decimal::ZERO);
    let total_carry_paid = results.gp_carry;
    let clawback_due = checked_mul(shortfall, pct(provision.clawback_rate), "clawback due")?
        .min(total_carry_paid)
        .max(Decimal::ZERO);

    let status = if clawback_due > Decimal::ZERO {
        ClawbackStatus::Triggered
    } else if shortfall > Decimal::ZERO {
        ClawbackStatus::AtRisk
    } else {
        ClawbackStatus::Clear
    };

    let annualized_exposure = if provision.distribution_life_years > Decimal::ZERO {
        checked_div(clawback_due, provision.distribution_life_years, "clawback exposure")?
    } else {
        Decimal::ZERO
    };

    Ok(Some(ClawbackAnalysis {
        status,
        required_return,
        total_returned: results.total_returned,
        shortfall,
        total_carry_paid,
        clawback_due,
        net_carry_after_clawback: total_carry_paid - clawback_due,
        annualized_exposure,
    }))
}
