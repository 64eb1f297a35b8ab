use rust_decimal::Decimal;
use tracing::debug;

use super::model::*;
use super::results::{TierAllocation, TierBreakdown};
use crate::error::WaterfallError;
use crate::types::*;
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Tiers that received proceeds, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub tiers: Vec<TierBreakdown>,
    /// Proceeds left in the pool after the last tier
    pub undistributed: Money,
}

/// What a single tier takes out of the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TierClaim {
    to_gp: Money,
    to_lp: Money,
    satisfied: bool,
}

impl TierClaim {
    fn lp_only(amount: Money, target: Money) -> Self {
        TierClaim {
            to_gp: Decimal::ZERO,
            to_lp: amount,
            satisfied: amount >= target,
        }
    }

    /// Share `base` between the sides. A full 100% split hands the LP side
    /// the exact complement so rounding never takes more than `base`.
    fn split(base: Money, gp_share: Percent, lp_share: Percent, satisfied: bool) -> Self {
        let to_gp = base * pct(gp_share);
        let to_lp = if gp_share + lp_share == ONE_HUNDRED {
            base - to_gp
        } else {
            base * pct(lp_share)
        };
        TierClaim {
            to_gp,
            to_lp,
            satisfied,
        }
    }

    fn total(&self) -> Money {
        self.to_gp + self.to_lp
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Run the exit proceeds of `scenario` through its tiers.
///
/// Tiers are processed in ascending `order` (stable). Each tier claims
/// what its type allows out of the remaining pool; the claim is split
/// between the GP and LP sides and then pro-rata across the investor
/// classes of each side. Tiers that receive nothing are omitted, but
/// their parameters are still validated so that a misconfigured tier
/// fails regardless of the exit value.
pub fn allocate_tiers(
    scenario: &WaterfallScenario,
    options: &CalculationOptions,
) -> EngineResult<AllocationOutcome> {
    validate_scenario(scenario)?;

    let invested = scenario.total_invested;
    let lp_shares = lp_weights(scenario, options.invested_basis)?;
    let gp_shares = gp_weights(scenario)?;

    let mut remaining = scenario.exit_value;
    let mut cumulative = Decimal::ZERO;
    let mut tiers: Vec<TierBreakdown> = Vec::new();

    // Running totals needed by the catch-up target
    let mut preferred_paid = Decimal::ZERO;
    let mut catch_up_paid = Decimal::ZERO;

    for tier in scenario.ordered_tiers() {
        let claim = match tier.tier_type {
            TierType::Roc => {
                let amount = remaining.min(invested);
                TierClaim::lp_only(amount, invested)
            }
            TierType::PreferredReturn => {
                let hurdle = tier.hurdle_rate.ok_or_else(|| {
                    WaterfallError::tier(&tier.id, "preferred-return tier requires hurdleRate")
                })?;
                if hurdle < Decimal::ZERO {
                    return Err(WaterfallError::tier(&tier.id, "hurdleRate cannot be negative"));
                }
                let target = checked_mul(invested, pct(hurdle), "preferred return target")?;
                let amount = remaining.min(target);
                preferred_paid += amount;
                TierClaim::lp_only(amount, target)
            }
            TierType::CatchUp => {
                let gp_share = required_gp_share(tier)?;
                // GP catches up to gp/(100-gp) of the preferred paid so far.
                // A 100% catch-up has no finite target and takes everything.
                let target = if gp_share >= ONE_HUNDRED {
                    remaining
                } else {
                    let ratio = checked_div(gp_share, ONE_HUNDRED - gp_share, "catch-up ratio")?;
                    let owed = checked_mul(ratio, preferred_paid, "catch-up target")?;
                    (owed - catch_up_paid).max(Decimal::ZERO)
                };
                let amount = remaining.min(target).max(Decimal::ZERO);
                catch_up_paid += amount;
                TierClaim {
                    to_gp: amount,
                    to_lp: Decimal::ZERO,
                    satisfied: amount >= target,
                }
            }
            TierType::Carry => {
                let gp_share = required_gp_share(tier)?;
                let lp_share = tier.lp_percentage.unwrap_or(ONE_HUNDRED - gp_share);
                check_split(tier, gp_share, lp_share)?;
                TierClaim::split(remaining.max(Decimal::ZERO), gp_share, lp_share, true)
            }
            TierType::Custom => {
                let (gp_share, lp_share) = match (tier.gp_carry_percentage, tier.lp_percentage) {
                    (Some(gp), Some(lp)) => (gp, lp),
                    (Some(gp), None) => (gp, ONE_HUNDRED - gp),
                    (None, Some(lp)) => (ONE_HUNDRED - lp, lp),
                    (None, None) => {
                        return Err(WaterfallError::tier(
                            &tier.id,
                            "custom tier requires gpCarryPercentage or lpPercentage",
                        ))
                    }
                };
                check_split(tier, gp_share, lp_share)?;
                let cap = match tier.hurdle_rate {
                    Some(h) if h < Decimal::ZERO => {
                        return Err(WaterfallError::tier(&tier.id, "hurdleRate cannot be negative"))
                    }
                    Some(h) => Some(checked_mul(invested, pct(h), "custom tier cap")?),
                    None => None,
                };
                let available = remaining.max(Decimal::ZERO);
                let base = cap.map_or(available, |c| available.min(c));
                TierClaim::split(base, gp_share, lp_share, cap.map_or(true, |c| base >= c))
            }
        };

        let total = claim.total();
        if total <= Decimal::ZERO {
            debug!(tier = %tier.id, "tier skipped: nothing left to claim");
            continue;
        }

        remaining -= total;
        cumulative += total;

        debug!(
            tier = %tier.id,
            tier_type = tier.tier_type.label(),
            amount = %total,
            remaining = %remaining,
            "tier allocated"
        );

        let mut allocations = split_pro_rata(claim.to_lp, &lp_shares, total)?;
        allocations.extend(split_pro_rata(claim.to_gp, &gp_shares, total)?);

        tiers.push(TierBreakdown {
            tier_id: tier.id.clone(),
            tier_name: tier.name.clone(),
            tier_type: tier.tier_type,
            gp_amount: claim.to_gp,
            lp_amount: claim.to_lp,
            total_amount: total,
            cumulative_amount: cumulative,
            percentage_of_exit: share_of(total, scenario.exit_value)?,
            fully_satisfied: claim.satisfied,
            allocations,
        });
    }

    Ok(AllocationOutcome {
        tiers,
        undistributed: remaining,
    })
}

fn validate_scenario(scenario: &WaterfallScenario) -> EngineResult<()> {
    if scenario.exit_value < Decimal::ZERO {
        return Err(WaterfallError::InvalidInput {
            field: "exit_value".into(),
            reason: "Exit value cannot be negative".into(),
        });
    }
    if scenario.total_invested < Decimal::ZERO {
        return Err(WaterfallError::InvalidInput {
            field: "total_invested".into(),
            reason: "Total invested cannot be negative".into(),
        });
    }
    for class in &scenario.investor_classes {
        if class.commitment < Decimal::ZERO
            || class.capital_called < Decimal::ZERO
            || class.ownership_percentage < Decimal::ZERO
        {
            return Err(WaterfallError::InvalidInput {
                field: format!("investor_class:{}", class.id),
                reason: "Commitment, capital called and ownership cannot be negative".into(),
            });
        }
    }
    Ok(())
}

fn required_gp_share(tier: &WaterfallTier) -> EngineResult<Percent> {
    let gp_share = tier.gp_carry_percentage.ok_or_else(|| {
        WaterfallError::tier(
            &tier.id,
            format!("{} tier requires gpCarryPercentage", tier.tier_type.label()),
        )
    })?;
    if gp_share < Decimal::ZERO || gp_share > ONE_HUNDRED {
        return Err(WaterfallError::tier(
            &tier.id,
            "gpCarryPercentage must be between 0 and 100",
        ));
    }
    Ok(gp_share)
}

fn check_split(tier: &WaterfallTier, gp_share: Percent, lp_share: Percent) -> EngineResult<()> {
    if gp_share < Decimal::ZERO || lp_share < Decimal::ZERO {
        return Err(WaterfallError::tier(&tier.id, "split percentages cannot be negative"));
    }
    if gp_share + lp_share > ONE_HUNDRED {
        return Err(WaterfallError::tier(
            &tier.id,
            format!("GP {gp_share}% + LP {lp_share}% exceeds 100%"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pro-rata helpers
// ---------------------------------------------------------------------------

/// Normalised LP weights: invested basis, then ownership, then equal.
fn lp_weights(scenario: &WaterfallScenario, basis: InvestedBasis) -> EngineResult<Weights<'_>> {
    let lps: Vec<&InvestorClass> = scenario.classes_of(InvestorType::Lp).collect();
    if let Some(weights) = normalise(&lps, |c| c.invested(basis))? {
        return Ok(weights);
    }
    Ok(normalise(&lps, |c| c.ownership_percentage)?.unwrap_or_else(|| equal_weights(&lps)))
}

/// Normalised GP weights: ownership, then equal.
fn gp_weights(scenario: &WaterfallScenario) -> EngineResult<Weights<'_>> {
    let gps: Vec<&InvestorClass> = scenario.classes_of(InvestorType::Gp).collect();
    Ok(normalise(&gps, |c| c.ownership_percentage)?.unwrap_or_else(|| equal_weights(&gps)))
}

type Weights<'a> = Vec<(&'a InvestorClass, Decimal)>;

fn normalise<'a, F>(classes: &[&'a InvestorClass], measure: F) -> EngineResult<Option<Weights<'a>>>
where
    F: Fn(&InvestorClass) -> Decimal,
{
    let total = checked_sum(classes.iter().map(|c| measure(c)), "pro-rata basis")?;
    if total <= Decimal::ZERO {
        return Ok(None);
    }
    Ok(Some(classes.iter().map(|c| (*c, measure(c) / total)).collect()))
}

fn equal_weights<'a>(classes: &[&'a InvestorClass]) -> Weights<'a> {
    if classes.is_empty() {
        return Vec::new();
    }
    let share = Decimal::ONE / Decimal::from(classes.len() as u64);
    classes.iter().map(|c| (*c, share)).collect()
}

/// Split `amount` by weight. The last class absorbs the rounding residue so
/// the parts always sum to `amount` exactly.
fn split_pro_rata(
    amount: Money,
    weights: &[(&InvestorClass, Decimal)],
    tier_total: Money,
) -> EngineResult<Vec<TierAllocation>> {
    if amount.is_zero() || weights.is_empty() {
        return Ok(Vec::new());
    }

    let mut allocations = Vec::with_capacity(weights.len());
    let mut assigned = Decimal::ZERO;
    let last = weights.len() - 1;

    for (i, (class, weight)) in weights.iter().enumerate() {
        let share = if i == last {
            amount - assigned
        } else {
            amount * *weight
        };
        assigned += share;
        if share.is_zero() {
            continue;
        }
        allocations.push(TierAllocation {
            investor_class_id: class.id.clone(),
            investor_class_name: class.name.clone(),
            investor_type: class.investor_type,
            amount: share,
            percentage_of_tier: share_of(share, tier_total)?,
        });
    }

    Ok(allocations)
}

/// `part` as a 0–100 share of `whole`, zero when `whole` is zero.
pub(crate) fn share_of(part: Money, whole: Money) -> EngineResult<Percent> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = checked_div(part, whole, "percentage share")?;
    checked_mul(ratio, ONE_HUNDRED, "percentage share")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lp(id: &str, commitment: Money, called: Money, ownership: Percent) -> InvestorClass {
        InvestorClass {
            id: id.into(),
            name: id.to_uppercase(),
            investor_type: InvestorType::Lp,
            ownership_percentage: ownership,
            commitment,
            capital_called: called,
            capital_returned: Decimal::ZERO,
            order: 0,
        }
    }

    fn gp(id: &str, ownership: Percent) -> InvestorClass {
        InvestorClass {
            id: id.into(),
            name: id.to_uppercase(),
            investor_type: InvestorType::Gp,
            ownership_percentage: ownership,
            commitment: Decimal::ZERO,
            capital_called: Decimal::ZERO,
            capital_returned: Decimal::ZERO,
            order: 0,
        }
    }

    /// ROC, 8% preferred, 20% catch-up, 80/20 carry
    fn standard(exit: Money, invested: Money) -> WaterfallScenario {
        let mut s = WaterfallScenario::new("Fund", WaterfallModel::European, exit, invested);
        s.investor_classes = vec![
            lp("lp-a", dec!(60), dec!(30), dec!(60)),
            lp("lp-b", dec!(40), dec!(30), dec!(40)),
            gp("gp", dec!(100)),
        ];
        s.tiers = vec![
            WaterfallTier::new("roc", "Return of Capital", TierType::Roc, 1),
            WaterfallTier::new("pref", "Preferred Return", TierType::PreferredReturn, 2)
                .with_hurdle(dec!(8)),
            WaterfallTier::new("catchup", "GP Catch-Up", TierType::CatchUp, 3)
                .with_split(dec!(20), None),
            WaterfallTier::new("carry", "Carried Interest", TierType::Carry, 4)
                .with_split(dec!(20), Some(dec!(80))),
        ];
        s
    }

    #[test]
    fn test_standard_allocation() {
        let s = standard(dec!(150), dec!(100));
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();

        assert_eq!(out.tiers.len(), 4);
        assert_eq!(out.tiers[0].lp_amount, dec!(100));
        assert_eq!(out.tiers[1].lp_amount, dec!(8));
        // 20/80 * 8 = 2 to GP
        assert_eq!(out.tiers[2].gp_amount, dec!(2));
        assert_eq!(out.tiers[2].lp_amount, Decimal::ZERO);
        // 40 left: 8 GP / 32 LP
        assert_eq!(out.tiers[3].gp_amount, dec!(8));
        assert_eq!(out.tiers[3].lp_amount, dec!(32));
        assert_eq!(out.tiers[3].cumulative_amount, dec!(150));
        assert_eq!(out.undistributed, Decimal::ZERO);
    }

    #[test]
    fn test_roc_pro_rata_by_commitment() {
        let s = standard(dec!(50), dec!(100));
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();

        assert_eq!(out.tiers.len(), 1);
        let roc = &out.tiers[0];
        assert_eq!(roc.total_amount, dec!(50));
        assert!(!roc.fully_satisfied);
        assert_eq!(roc.allocations.len(), 2);
        assert_eq!(roc.allocations[0].amount, dec!(30));
        assert_eq!(roc.allocations[1].amount, dec!(20));
        assert_eq!(roc.allocations[0].percentage_of_tier, dec!(60));
    }

    #[test]
    fn test_roc_pro_rata_by_capital_called() {
        let s = standard(dec!(50), dec!(100));
        let options = CalculationOptions {
            invested_basis: InvestedBasis::CapitalCalled,
        };
        let out = allocate_tiers(&s, &options).unwrap();
        // Equal capital called => equal split
        assert_eq!(out.tiers[0].allocations[0].amount, dec!(25));
        assert_eq!(out.tiers[0].allocations[1].amount, dec!(25));
    }

    #[test]
    fn test_zero_basis_falls_back_to_ownership() {
        let mut s = standard(dec!(10), dec!(100));
        for c in s.investor_classes.iter_mut() {
            c.capital_called = Decimal::ZERO;
        }
        let options = CalculationOptions {
            invested_basis: InvestedBasis::CapitalCalled,
        };
        let out = allocate_tiers(&s, &options).unwrap();
        assert_eq!(out.tiers[0].allocations[0].amount, dec!(6));
        assert_eq!(out.tiers[0].allocations[1].amount, dec!(4));
    }

    #[test]
    fn test_split_sums_exactly_with_thirds() {
        let mut s = WaterfallScenario::new("x", WaterfallModel::European, dec!(100), dec!(100));
        s.investor_classes = vec![
            lp("a", dec!(1), dec!(0), dec!(0)),
            lp("b", dec!(1), dec!(0), dec!(0)),
            lp("c", dec!(1), dec!(0), dec!(0)),
        ];
        s.tiers = vec![WaterfallTier::new("roc", "ROC", TierType::Roc, 1)];
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        let sum: Money = out.tiers[0].allocations.iter().map(|a| a.amount).sum();
        assert_eq!(sum, dec!(100));
    }

    #[test]
    fn test_zero_tiers_are_skipped() {
        let s = standard(dec!(105), dec!(100));
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        // ROC full, preferred partial, nothing for catch-up or carry
        assert_eq!(out.tiers.len(), 2);
        assert_eq!(out.tiers[1].total_amount, dec!(5));
        assert!(!out.tiers[1].fully_satisfied);
    }

    #[test]
    fn test_partial_catch_up() {
        let s = standard(dec!(109), dec!(100));
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        assert_eq!(out.tiers.len(), 3);
        assert_eq!(out.tiers[2].gp_amount, dec!(1));
        assert!(!out.tiers[2].fully_satisfied);
    }

    #[test]
    fn test_full_catch_up_takes_everything() {
        let mut s = standard(dec!(150), dec!(100));
        s.tiers[2].gp_carry_percentage = Some(dec!(100));
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        // Catch-up swallows the 42 left after ROC and preferred; carry gets nothing
        assert_eq!(out.tiers.len(), 3);
        assert_eq!(out.tiers[2].gp_amount, dec!(42));
        assert_eq!(out.undistributed, Decimal::ZERO);
    }

    #[test]
    fn test_split_under_100_leaves_residue() {
        let mut s = standard(dec!(150), dec!(100));
        s.tiers[3].lp_percentage = Some(dec!(70));
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        // 40 in carry pool, 90% distributed
        assert_eq!(out.tiers[3].total_amount, dec!(36));
        assert_eq!(out.undistributed, dec!(4));
    }

    #[test]
    fn test_custom_tier_capped_by_hurdle() {
        let mut s = standard(dec!(150), dec!(100));
        s.tiers.insert(
            2,
            WaterfallTier {
                id: "band".into(),
                name: "8-12% band".into(),
                tier_type: TierType::Custom,
                order: 2,
                hurdle_rate: Some(dec!(4)),
                gp_carry_percentage: Some(dec!(10)),
                lp_percentage: None,
                description: None,
            },
        );
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        let band = out.tiers.iter().find(|t| t.tier_id == "band").unwrap();
        assert_eq!(band.total_amount, dec!(4));
        assert_eq!(band.gp_amount, dec!(0.4));
        assert_eq!(band.lp_amount, dec!(3.6));
        assert!(band.fully_satisfied);
    }

    #[test]
    fn test_missing_hurdle_is_error_even_when_unreached() {
        let mut s = standard(dec!(10), dec!(100));
        s.tiers[1].hurdle_rate = None;
        match allocate_tiers(&s, &CalculationOptions::default()) {
            Err(WaterfallError::InvalidTierConfiguration { tier_id, .. }) => {
                assert_eq!(tier_id, "pref")
            }
            other => panic!("Expected InvalidTierConfiguration, got: {other:?}"),
        }
    }

    #[test]
    fn test_missing_carry_percentage_is_error() {
        let mut s = standard(dec!(150), dec!(100));
        s.tiers[3].gp_carry_percentage = None;
        assert!(matches!(
            allocate_tiers(&s, &CalculationOptions::default()),
            Err(WaterfallError::InvalidTierConfiguration { .. })
        ));
    }

    #[test]
    fn test_split_over_100_is_error() {
        let mut s = standard(dec!(150), dec!(100));
        s.tiers[3].lp_percentage = Some(dec!(90));
        assert!(allocate_tiers(&s, &CalculationOptions::default()).is_err());
    }

    #[test]
    fn test_negative_exit_value_rejected() {
        let s = standard(dec!(-1), dec!(100));
        match allocate_tiers(&s, &CalculationOptions::default()) {
            Err(WaterfallError::InvalidInput { field, .. }) => assert_eq!(field, "exit_value"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_huge_hurdle_is_overflow_error() {
        let mut s = standard(dec!(150), dec!(1000000000));
        s.tiers[1].hurdle_rate = Some(Decimal::from_i128_with_scale(10i128.pow(27), 0));
        match allocate_tiers(&s, &CalculationOptions::default()) {
            Err(WaterfallError::Overflow { context }) => assert_eq!(context, "preferred return target"),
            other => panic!("Expected Overflow, got: {other:?}"),
        }
    }

    #[test]
    fn test_near_total_catch_up_is_overflow_error() {
        // 100 - g leaves a ratio near 1e28; times 8 of preferred cannot fit
        let mut s = standard(dec!(150), dec!(100));
        s.tiers[2].gp_carry_percentage = Some(dec!(99.99999999999999999999999999));
        match allocate_tiers(&s, &CalculationOptions::default()) {
            Err(WaterfallError::Overflow { context }) => assert!(context.starts_with("catch-up")),
            other => panic!("Expected Overflow, got: {other:?}"),
        }
    }

    #[test]
    fn test_commitments_too_large_to_total_is_error() {
        let mut s = standard(dec!(150), dec!(100));
        s.investor_classes[0].commitment = Decimal::MAX;
        s.investor_classes[1].commitment = Decimal::MAX;
        assert!(matches!(
            allocate_tiers(&s, &CalculationOptions::default()),
            Err(WaterfallError::Overflow { .. })
        ));
    }

    #[test]
    fn test_no_classes_still_reports_sides() {
        let mut s = standard(dec!(150), dec!(100));
        s.investor_classes.clear();
        let out = allocate_tiers(&s, &CalculationOptions::default()).unwrap();
        assert_eq!(out.tiers[3].gp_amount, dec!(8));
        assert!(out.tiers[3].allocations.is_empty());
    }
}
