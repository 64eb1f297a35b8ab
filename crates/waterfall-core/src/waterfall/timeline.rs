use super::results::{TierBreakdown, TierMilestone};

/// One milestone per populated tier, in the order the tiers cleared.
///
/// `exit_value_reached` is the cumulative proceeds distributed when the
/// tier finished, i.e. the exit value at which the next tier starts
/// receiving money.
pub fn build_tier_timeline(tiers: &[TierBreakdown]) -> Vec<TierMilestone> {
    tiers
        .iter()
        .filter(|t| !t.total_amount.is_zero())
        .enumerate()
        .map(|(i, t)| TierMilestone {
            sequence: i + 1,
            tier_id: t.tier_id.clone(),
            tier_name: t.tier_name.clone(),
            tier_type: t.tier_type,
            exit_value_reached: t.cumulative_amount,
            fully_satisfied: t.fully_satisfied,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waterfall::model::TierType;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn breakdown(id: &str, tier_type: TierType, total: Decimal, cumulative: Decimal) -> TierBreakdown {
        TierBreakdown {
            tier_id: id.into(),
            tier_name: id.into(),
            tier_type,
            gp_amount: Decimal::ZERO,
            lp_amount: total,
            total_amount: total,
            cumulative_amount: cumulative,
            percentage_of_exit: Decimal::ZERO,
            fully_satisfied: true,
            allocations: Vec::new(),
        }
    }

    #[test]
    fn test_timeline_sequence_and_thresholds() {
        let tiers = vec![
            breakdown("roc", TierType::Roc, dec!(100), dec!(100)),
            breakdown("pref", TierType::PreferredReturn, dec!(8), dec!(108)),
        ];
        let timeline = build_tier_timeline(&tiers);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].sequence, 1);
        assert_eq!(timeline[1].sequence, 2);
        assert_eq!(timeline[1].exit_value_reached, dec!(108));
    }

    #[test]
    fn test_timeline_ignores_empty_tiers() {
        let tiers = vec![
            breakdown("roc", TierType::Roc, dec!(100), dec!(100)),
            breakdown("empty", TierType::CatchUp, dec!(0), dec!(100)),
            breakdown("carry", TierType::Carry, dec!(5), dec!(105)),
        ];
        let ids: Vec<String> = build_tier_timeline(&tiers).into_iter().map(|m| m.tier_id).collect();
        assert_eq!(ids, vec!["roc".to_string(), "carry".to_string()]);
    }
}
