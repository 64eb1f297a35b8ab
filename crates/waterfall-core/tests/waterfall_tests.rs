use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use waterfall_core::allocation::{allocation_issues, LpAllocation};
use waterfall_core::enhancements::calculate_enhanced;
use waterfall_core::waterfall::*;
use waterfall_core::WaterfallError;

// ===========================================================================
// Fixtures
// ===========================================================================

fn fund(model: WaterfallModel) -> WaterfallScenario {
    let mut s = WaterfallScenario::new("Fund III", model, dec!(150_000_000), dec!(100_000_000));
    s.id = "fund-iii".into();
    s.investor_classes = vec![
        InvestorClass {
            id: "lp-a".into(),
            name: "Pension".into(),
            investor_type: InvestorType::Lp,
            ownership_percentage: dec!(60),
            commitment: dec!(60_000_000),
            capital_called: dec!(60_000_000),
            capital_returned: Decimal::ZERO,
            order: 1,
        },
        InvestorClass {
            id: "lp-b".into(),
            name: "Endowment".into(),
            investor_type: InvestorType::Lp,
            ownership_percentage: dec!(40),
            commitment: dec!(40_000_000),
            capital_called: dec!(40_000_000),
            capital_returned: Decimal::ZERO,
            order: 2,
        },
        InvestorClass {
            id: "gp".into(),
            name: "Manager".into(),
            investor_type: InvestorType::Gp,
            ownership_percentage: dec!(100),
            commitment: Decimal::ZERO,
            capital_called: Decimal::ZERO,
            capital_returned: Decimal::ZERO,
            order: 3,
        },
    ];
    s.tiers = vec![
        WaterfallTier::new("roc", "Return of Capital", TierType::Roc, 1),
        WaterfallTier::new("pref", "Preferred Return", TierType::PreferredReturn, 2).with_hurdle(dec!(8)),
        WaterfallTier::new("catch-up", "Catch-Up", TierType::CatchUp, 3).with_split(dec!(20), None),
        WaterfallTier::new("carry", "Carry", TierType::Carry, 4).with_split(dec!(20), Some(dec!(80))),
    ];
    s
}

fn opts() -> CalculationOptions {
    CalculationOptions::default()
}

/// Every field except the model tag and the blended section.
fn assert_same_distribution(a: &WaterfallResults, b: &WaterfallResults) {
    assert_eq!(a.total_returned, b.total_returned);
    assert_eq!(a.gp_carry, b.gp_carry);
    assert_eq!(a.gp_carry_percentage, b.gp_carry_percentage);
    assert_eq!(a.gp_total_return, b.gp_total_return);
    assert_eq!(a.lp_total_return, b.lp_total_return);
    assert_eq!(a.lp_average_multiple, b.lp_average_multiple);
    assert_eq!(a.investor_results, b.investor_results);
    assert_eq!(a.tier_breakdown, b.tier_breakdown);
    assert_eq!(a.tier_timeline, b.tier_timeline);
}

// ===========================================================================
// End-to-end
// ===========================================================================

#[test]
fn test_european_fund_split() {
    let r = calculate_waterfall(&fund(WaterfallModel::European), &opts()).unwrap();

    // ROC 100M, pref 8M, catch-up 2M to GP, then 40M split 8M / 32M
    assert_eq!(r.total_returned, dec!(150_000_000));
    assert_eq!(r.gp_carry, dec!(10_000_000));
    assert_eq!(r.lp_total_return, dec!(140_000_000));
    assert_eq!(r.gp_total_return + r.lp_total_return, r.total_returned);
    assert_eq!(r.gp_carry_percentage, dec!(20));
    assert_eq!(r.lp_average_multiple, dec!(1.4));
    assert_eq!(r.tier_breakdown.len(), 4);
    assert_eq!(r.tier_timeline.len(), 4);

    let catch_up = r.tier("catch-up").unwrap();
    assert_eq!(catch_up.gp_amount, dec!(2_000_000));
    assert_eq!(catch_up.lp_amount, Decimal::ZERO);

    // LP classes split 60/40 on commitment
    assert_eq!(r.investor("lp-a").unwrap().total_distribution, dec!(84_000_000));
    assert_eq!(r.investor("lp-b").unwrap().total_distribution, dec!(56_000_000));
    assert_eq!(r.investor("gp").unwrap().carried_interest, dec!(8_000_000));
    assert_eq!(r.investor("gp").unwrap().catch_up, dec!(2_000_000));
}

#[test]
fn test_below_hurdle_pays_no_carry() {
    let s = fund(WaterfallModel::European).at_exit_value(dec!(105_000_000));
    let r = calculate_waterfall(&s, &opts()).unwrap();
    assert_eq!(r.gp_carry, Decimal::ZERO);
    assert_eq!(r.lp_total_return, dec!(105_000_000));
    // ROC complete, pref partial, nothing further
    assert_eq!(r.tier_breakdown.len(), 2);
    assert!(!r.tier("pref").unwrap().fully_satisfied);
}

#[test]
fn test_clawback_clear_when_hurdle_met() {
    let mut s = fund(WaterfallModel::European);
    s.clawback_provision = Some(ClawbackProvision {
        enabled: true,
        hurdle_rate: dec!(8),
        clawback_rate: dec!(100),
        distribution_life_years: dec!(4),
    });
    let cb = calculate_enhanced(&s, &opts()).unwrap().clawback.unwrap();
    assert_eq!(cb.status, ClawbackStatus::Clear);
    assert_eq!(cb.total_carry_paid, dec!(10_000_000));
    assert_eq!(cb.clawback_due, Decimal::ZERO);
}

#[test]
fn test_lookback_puts_half_of_losses_at_risk() {
    let mut s = fund(WaterfallModel::European);
    s.lookback_provision = Some(LookbackProvision {
        enabled: true,
        lookback_years: dec!(3),
        loss_carry_forward: dec!(10_000_000),
        carry_at_risk_rate: dec!(50),
    });
    let lb = calculate_enhanced(&s, &opts()).unwrap().lookback.unwrap();
    assert_eq!(lb.status, LookbackStatus::AtRisk);
    assert_eq!(lb.carry_at_risk, dec!(5_000_000));
}

#[test]
fn test_blended_seventy_thirty() {
    let european = calculate_waterfall(&fund(WaterfallModel::European), &opts()).unwrap();
    let american = calculate_waterfall(&fund(WaterfallModel::American), &opts()).unwrap();

    let mut s = fund(WaterfallModel::Blended);
    s.blended_config = Some(BlendedConfig {
        european_weight: dec!(70),
        american_weight: dec!(30),
    });
    let blended = calculate_waterfall(&s, &opts()).unwrap();

    let expected = european.gp_carry * dec!(0.7) + american.gp_carry * dec!(0.3);
    assert!((blended.gp_carry - expected).abs() < dec!(0.01));
    let breakdown = blended.blended_breakdown.unwrap();
    assert_eq!(breakdown.european_weight, dec!(70));
    assert_eq!(breakdown.american_weight, dec!(30));
}

#[test]
fn test_dispatch_reports_blended_weights() {
    let mut s = fund(WaterfallModel::Blended);
    s.blended_config = Some(BlendedConfig {
        european_weight: dec!(60),
        american_weight: dec!(40),
    });
    let r = calculate_waterfall(&s, &opts()).unwrap();
    assert_eq!(r.model, WaterfallModel::Blended);
    assert_eq!(r.blended_breakdown.unwrap().american_weight, dec!(40));
}

#[test]
fn test_blended_extremes_match_pure_models() {
    let european = calculate_waterfall(&fund(WaterfallModel::European), &opts()).unwrap();
    let american = calculate_waterfall(&fund(WaterfallModel::American), &opts()).unwrap();

    let mut s = fund(WaterfallModel::Blended);
    s.blended_config = Some(BlendedConfig {
        european_weight: dec!(100),
        american_weight: Decimal::ZERO,
    });
    assert_same_distribution(&calculate_waterfall(&s, &opts()).unwrap(), &european);

    s.blended_config = Some(BlendedConfig {
        european_weight: Decimal::ZERO,
        american_weight: dec!(100),
    });
    assert_same_distribution(&calculate_waterfall(&s, &opts()).unwrap(), &american);
}

#[test]
fn test_calculation_is_idempotent() {
    let mut s = fund(WaterfallModel::European);
    s.lookback_provision = Some(LookbackProvision {
        enabled: true,
        lookback_years: dec!(3),
        loss_carry_forward: dec!(10_000_000),
        carry_at_risk_rate: dec!(50),
    });
    let first = calculate_enhanced(&s, &opts()).unwrap();
    let second = calculate_enhanced(&s, &opts()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_results_json_shape() {
    let r = calculate_waterfall(&fund(WaterfallModel::European), &opts()).unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["model"], "european");
    assert!(json.get("gpCarry").is_some());
    assert!(json.get("tierBreakdown").is_some());
    assert!(json.get("clawback").is_none());
    assert_eq!(json["tierBreakdown"][2]["tierType"], "catch-up");
}

#[test]
fn test_scenario_document_round_trips_through_dispatch() {
    let json = r#"{
        "id": "s1",
        "name": "From JSON",
        "model": "american",
        "exitValue": "150000000",
        "totalInvested": "100000000",
        "tiers": [
            {"id": "roc", "name": "ROC", "tierType": "roc", "order": 1},
            {"id": "carry", "name": "Carry", "tierType": "carry", "order": 2,
             "gpCarryPercentage": "20"}
        ]
    }"#;
    let s: WaterfallScenario = serde_json::from_str(json).unwrap();
    let r = calculate_waterfall(&s, &opts()).unwrap();
    assert_eq!(r.model, WaterfallModel::American);
    assert_eq!(r.gp_carry, dec!(10_000_000));
}

#[test]
fn test_unknown_model_is_rejected() {
    let json = r#"{"name": "x", "model": "asian", "exitValue": "1", "totalInvested": "1"}"#;
    let err = serde_json::from_str::<WaterfallScenario>(json).unwrap_err();
    assert!(err.to_string().contains("asian"));
}

#[test]
fn test_missing_hurdle_fails_calculation() {
    let mut s = fund(WaterfallModel::European);
    s.tiers[1].hurdle_rate = None;
    match calculate_waterfall(&s, &opts()) {
        Err(WaterfallError::InvalidTierConfiguration { tier_id, .. }) => assert_eq!(tier_id, "pref"),
        other => panic!("Expected InvalidTierConfiguration, got: {other:?}"),
    }
}

// ===========================================================================
// Allocation validation
// ===========================================================================

#[test]
fn test_allocation_fixtures() {
    let mut a = LpAllocation {
        investor_id: "lp-a".into(),
        gross_amount: dec!(100),
        tax_withholding_amount: dec!(20),
        tax_withholding_rate: dec!(20),
        net_amount: dec!(80),
    };
    assert!(allocation_issues(&a).is_empty());

    a.net_amount = dec!(90);
    let issues = allocation_issues(&a);
    assert!(!issues.is_empty());
    assert!(issues.iter().any(|i| i.contains("does not equal gross")));
}
