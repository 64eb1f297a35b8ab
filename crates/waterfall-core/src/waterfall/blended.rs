use rust_decimal::Decimal;
use tracing::debug;

use super::american::calculate_american;
use super::european::calculate_european;
use super::model::*;
use super::results::*;
use super::timeline::build_tier_timeline;
use crate::error::WaterfallError;
use crate::types::*;
use crate::EngineResult;

/// Linear blend of two results with fractional weights.
#[derive(Debug, Clone, Copy)]
struct Mix {
    european: Decimal,
    american: Decimal,
}

impl Mix {
    fn of(&self, european: Decimal, american: Decimal) -> EngineResult<Decimal> {
        checked_add(
            checked_mul(european, self.european, "blended weighting")?,
            checked_mul(american, self.american, "blended weighting")?,
            "blended weighting",
        )
    }

    fn prefers_european(&self) -> bool {
        self.european >= self.american
    }
}

/// Calculate a hybrid waterfall by interpolating European and American runs.
///
/// Both calculations run on the same scenario; every numeric output field is
/// weighted by `europeanWeight / 100` and `americanWeight / 100`. Weights are
/// used as given, without renormalisation.
pub fn calculate_blended(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
) -> EngineResult<WaterfallResults> {
    let config = scenario
        .blended_config
        .as_ref()
        .ok_or_else(|| WaterfallError::InvalidInput {
            field: "blended_config".into(),
            reason: "Blended model requires europeanWeight and americanWeight".into(),
        })?;

    debug!(
        scenario = %scenario.id,
        european_weight = %config.european_weight,
        american_weight = %config.american_weight,
        "blended waterfall"
    );

    let european = calculate_european(scenario, options)?;
    let american = calculate_american(scenario, options)?;
    blend_results(&european, &american, config)
}

/// Interpolate two results field by field.
pub fn blend_results(
    european: &WaterfallResults,
    american: &WaterfallResults,
    config: &BlendedConfig,
) -> EngineResult<WaterfallResults> {
    let mix = Mix {
        european: pct(config.european_weight),
        american: pct(config.american_weight),
    };

    let tier_breakdown = blend_tiers(&european.tier_breakdown, &american.tier_breakdown, mix)?;
    let tier_timeline = build_tier_timeline(&tier_breakdown);
    let field = |f: fn(&WaterfallResults) -> Decimal| mix.of(f(european), f(american));

    Ok(WaterfallResults {
        model: WaterfallModel::Blended,
        total_exit_value: field(|r| r.total_exit_value)?,
        total_invested: field(|r| r.total_invested)?,
        total_returned: field(|r| r.total_returned)?,
        undistributed: field(|r| r.undistributed)?,
        gp_carry: field(|r| r.gp_carry)?,
        gp_carry_percentage: field(|r| r.gp_carry_percentage)?,
        gp_management_fees: field(|r| r.gp_management_fees)?,
        gp_total_return: field(|r| r.gp_total_return)?,
        lp_total_return: field(|r| r.lp_total_return)?,
        lp_average_multiple: field(|r| r.lp_average_multiple)?,
        investor_results: blend_investors(&european.investor_results, &american.investor_results, mix)?,
        tier_breakdown,
        tier_timeline,
        clawback: None,
        lookback: None,
        blended_breakdown: Some(BlendedBreakdown {
            european_weight: config.european_weight,
            american_weight: config.american_weight,
            european_gp_carry: european.gp_carry,
            american_gp_carry: american.gp_carry,
            european_lp_total_return: european.lp_total_return,
            american_lp_total_return: american.lp_total_return,
        }),
    })
}

fn blend_tiers(
    european: &[TierBreakdown],
    american: &[TierBreakdown],
    mix: Mix,
) -> EngineResult<Vec<TierBreakdown>> {
    let mut blended: Vec<TierBreakdown> = Vec::with_capacity(european.len().max(american.len()));

    for eu in european {
        let am = american.iter().find(|t| t.tier_id == eu.tier_id);
        let template = match am {
            Some(am) if !mix.prefers_european() => am,
            _ => eu,
        };
        blended.push(blend_tier(template, Some(eu), am, mix)?);
    }
    for am in american {
        if !european.iter().any(|t| t.tier_id == am.tier_id) {
            blended.push(blend_tier(am, None, Some(am), mix)?);
        }
    }

    // Cumulative amounts are rebuilt from the blended totals so they stay
    // monotone even when the two runs populate different tiers.
    let mut cumulative = Decimal::ZERO;
    for tier in blended.iter_mut() {
        cumulative = checked_add(cumulative, tier.total_amount, "blended cumulative amount")?;
        tier.cumulative_amount = cumulative;
    }
    Ok(blended)
}

fn blend_tier(
    template: &TierBreakdown,
    eu: Option<&TierBreakdown>,
    am: Option<&TierBreakdown>,
    mix: Mix,
) -> EngineResult<TierBreakdown> {
    let field = |f: fn(&TierBreakdown) -> Decimal| {
        mix.of(eu.map_or(Decimal::ZERO, f), am.map_or(Decimal::ZERO, f))
    };

    let total_amount = field(|t| t.total_amount)?;
    let empty: Vec<TierAllocation> = Vec::new();
    let allocations = blend_allocations(
        eu.map_or(&empty, |t| &t.allocations),
        am.map_or(&empty, |t| &t.allocations),
        mix,
    )?;

    Ok(TierBreakdown {
        tier_id: template.tier_id.clone(),
        tier_name: template.tier_name.clone(),
        tier_type: template.tier_type,
        gp_amount: field(|t| t.gp_amount)?,
        lp_amount: field(|t| t.lp_amount)?,
        total_amount,
        cumulative_amount: field(|t| t.cumulative_amount)?,
        percentage_of_exit: field(|t| t.percentage_of_exit)?,
        fully_satisfied: template.fully_satisfied,
        allocations,
    })
}

fn blend_allocations(
    european: &[TierAllocation],
    american: &[TierAllocation],
    mix: Mix,
) -> EngineResult<Vec<TierAllocation>> {
    let mut ids: Vec<&TierAllocation> = european.iter().collect();
    for a in american {
        if !european.iter().any(|e| e.investor_class_id == a.investor_class_id) {
            ids.push(a);
        }
    }

    ids.into_iter()
        .map(|template| {
            let find = |list: &[TierAllocation], f: fn(&TierAllocation) -> Decimal| {
                list.iter()
                    .find(|a| a.investor_class_id == template.investor_class_id)
                    .map_or(Decimal::ZERO, f)
            };
            Ok(TierAllocation {
                investor_class_id: template.investor_class_id.clone(),
                investor_class_name: template.investor_class_name.clone(),
                investor_type: template.investor_type,
                amount: mix.of(find(european, |a| a.amount), find(american, |a| a.amount))?,
                percentage_of_tier: mix.of(
                    find(european, |a| a.percentage_of_tier),
                    find(american, |a| a.percentage_of_tier),
                )?,
            })
        })
        .collect()
}

fn blend_investors(
    european: &[InvestorClassResult],
    american: &[InvestorClassResult],
    mix: Mix,
) -> EngineResult<Vec<InvestorClassResult>> {
    european
        .iter()
        .map(|eu| {
            let am = american
                .iter()
                .find(|a| a.investor_class_id == eu.investor_class_id)
                .unwrap_or(eu);
            let field = |f: fn(&InvestorClassResult) -> Decimal| mix.of(f(eu), f(am));
            Ok(InvestorClassResult {
                investor_class_id: eu.investor_class_id.clone(),
                investor_class_name: eu.investor_class_name.clone(),
                investor_type: eu.investor_type,
                invested: field(|r| r.invested)?,
                return_of_capital: field(|r| r.return_of_capital)?,
                preferred_return: field(|r| r.preferred_return)?,
                catch_up: field(|r| r.catch_up)?,
                carried_interest: field(|r| r.carried_interest)?,
                other: field(|r| r.other)?,
                total_distribution: field(|r| r.total_distribution)?,
                profit: field(|r| r.profit)?,
                multiple: field(|r| r.multiple)?,
                percentage_of_total: field(|r| r.percentage_of_total)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scenario(european_weight: Decimal, american_weight: Decimal) -> WaterfallScenario {
        let mut s = WaterfallScenario::new("Blend", WaterfallModel::Blended, dec!(150), dec!(100));
        s.tiers = vec![
            WaterfallTier::new("roc", "ROC", TierType::Roc, 1),
            WaterfallTier::new("pref", "Pref", TierType::PreferredReturn, 2).with_hurdle(dec!(8)),
            WaterfallTier::new("catchup", "Catch-Up", TierType::CatchUp, 3).with_split(dec!(20), None),
            WaterfallTier::new("carry", "Carry", TierType::Carry, 4).with_split(dec!(20), None),
        ];
        s.blended_config = Some(BlendedConfig {
            european_weight,
            american_weight,
        });
        s
    }

    #[test]
    fn test_blended_records_weights() {
        let s = scenario(dec!(60), dec!(40));
        let out = calculate_blended(&s, &CalculationOptions::default()).unwrap();
        let b = out.blended_breakdown.unwrap();
        assert_eq!(b.european_weight, dec!(60));
        assert_eq!(b.american_weight, dec!(40));
        assert_eq!(out.model, WaterfallModel::Blended);
    }

    #[test]
    fn test_blended_missing_config() {
        let mut s = scenario(dec!(50), dec!(50));
        s.blended_config = None;
        match calculate_blended(&s, &CalculationOptions::default()) {
            Err(WaterfallError::InvalidInput { field, .. }) => assert_eq!(field, "blended_config"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_weights_not_renormalised() {
        // 50 + 30 = 80: every amount shrinks to 80% of the common value
        let s = scenario(dec!(50), dec!(30));
        let out = calculate_blended(&s, &CalculationOptions::default()).unwrap();
        assert_eq!(out.gp_carry, dec!(10) * dec!(0.8));
        assert_eq!(out.total_returned, dec!(150) * dec!(0.8));
    }

    #[test]
    fn test_blend_of_differing_results() {
        let s = scenario(dec!(70), dec!(30));
        let options = CalculationOptions::default();
        let eu = calculate_european(&s, &options).unwrap();
        let mut am = eu.clone();
        am.gp_carry = dec!(20);
        am.lp_total_return = dec!(130);
        let out = blend_results(&eu, &am, s.blended_config.as_ref().unwrap()).unwrap();
        assert_eq!(out.gp_carry, dec!(10) * dec!(0.7) + dec!(20) * dec!(0.3));
        assert_eq!(out.lp_total_return, dec!(140) * dec!(0.7) + dec!(130) * dec!(0.3));
    }

    #[test]
    fn test_oversized_weight_is_overflow_error() {
        let mut s = scenario(Decimal::MAX, Decimal::ZERO);
        s.exit_value = dec!(15000);
        s.total_invested = dec!(10000);
        match calculate_blended(&s, &CalculationOptions::default()) {
            Err(WaterfallError::Overflow { context }) => assert_eq!(context, "blended weighting"),
            other => panic!("Expected Overflow, got: {other:?}"),
        }
    }
}
