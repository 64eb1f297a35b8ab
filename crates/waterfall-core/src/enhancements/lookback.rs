use rust_decimal::Decimal;

use crate::types::*;
use crate::EngineResult;
use crate::waterfall::{LookbackAnalysis, LookbackProvision, LookbackStatus, WaterfallResults};

/// Carry placed at risk by losses carried forward from earlier periods.
///
/// Returns `None` when the provision is disabled.
pub fn calculate_lookback(
    provision: &LookbackProvision,
    results: &WaterfallResults,
) -> EngineResult<Option<LookbackAnalysis>> {
    if !provision.enabled {
        return Ok(None);
    }

    let losses_to_recover = provision.loss_carry_forward.max(Decimal::ZERO);
    let total_carry_paid = results.gp_carry;
    let carry_at_risk = checked_mul(losses_to_recover, pct(provision.carry_at_risk_rate), "carry at risk")?
        .min(total_carry_paid)
        .max(Decimal::ZERO);

    let status = if carry_at_risk > Decimal::ZERO {
        LookbackStatus::AtRisk
    } else if losses_to_recover.is_zero() {
        LookbackStatus::Cleared
    } else {
        LookbackStatus::Monitor
    };

    let annual_recovery_required = if provision.lookback_years > Decimal::ZERO {
        checked_div(losses_to_recover, provision.lookback_years, "annual recovery")?
    } else {
        Decimal::ZERO
    };

    Ok(Some(LookbackAnalysis {
        status,
        lookback_years: provision.lookback_years,
        losses_to_recover,
        total_carry_paid,
        carry_at_risk,
        carry_released: total_carry_paid - carry_at_risk,
        annual_recovery_required,
    }))
}
