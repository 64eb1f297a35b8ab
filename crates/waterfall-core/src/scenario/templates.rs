use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::waterfall::*;

pub const STANDARD_EUROPEAN: &str = "standard-european";
pub const AMERICAN_DEAL_BY_DEAL: &str = "american-deal-by-deal";

fn investor_classes() -> Vec<InvestorClass> {
    vec![
        InvestorClass {
            id: "lp-main".into(),
            name: "Limited Partners".into(),
            investor_type: InvestorType::Lp,
            ownership_percentage: dec!(100),
            commitment: dec!(99000000),
            capital_called: dec!(99000000),
            capital_returned: Decimal::ZERO,
            order: 1,
        },
        InvestorClass {
            id: "gp".into(),
            name: "General Partner".into(),
            investor_type: InvestorType::Gp,
            ownership_percentage: dec!(100),
            commitment: dec!(1000000),
            capital_called: dec!(1000000),
            capital_returned: Decimal::ZERO,
            order: 2,
        },
    ]
}

fn template(id: &str, name: &str, model: WaterfallModel, description: &str) -> WaterfallScenario {
    let mut s = WaterfallScenario::new(name, model, dec!(150000000), dec!(100000000));
    s.id = id.to_string();
    s.description = Some(description.to_string());
    s.management_fees = dec!(2000000);
    s.investor_classes = investor_classes();
    s.is_template = true;
    s.created_by = "system".to_string();
    s.tags = vec!["template".to_string()];
    s
}

/// Whole-fund 8% preferred, full GP catch-up, 80/20 carry.
pub fn standard_european() -> WaterfallScenario {
    let mut s = template(
        STANDARD_EUROPEAN,
        "Standard European Waterfall",
        WaterfallModel::European,
        "Return of capital, 8% preferred return, 100% GP catch-up to 20%, then 80/20",
    );
    s.tiers = vec![
        WaterfallTier::new("roc", "Return of Capital", TierType::Roc, 1),
        WaterfallTier::new("pref", "Preferred Return", TierType::PreferredReturn, 2)
            .with_hurdle(dec!(8)),
        WaterfallTier::new("catch-up", "GP Catch-Up", TierType::CatchUp, 3)
            .with_split(dec!(20), None),
        WaterfallTier::new("carry", "Carried Interest", TierType::Carry, 4)
            .with_split(dec!(20), Some(dec!(80))),
    ];
    s
}

/// Carry on each deal after capital, backed by a full clawback.
pub fn american_deal_by_deal() -> WaterfallScenario {
    let mut s = template(
        AMERICAN_DEAL_BY_DEAL,
        "American Deal-by-Deal",
        WaterfallModel::American,
        "Return of capital then 80/20 carry, with an 8% clawback over four years",
    );
    s.tiers = vec![
        WaterfallTier::new("roc", "Return of Capital", TierType::Roc, 1),
        WaterfallTier::new("carry", "Carried Interest", TierType::Carry, 2)
            .with_split(dec!(20), Some(dec!(80))),
    ];
    s.clawback_provision = Some(ClawbackProvision {
        enabled: true,
        hurdle_rate: dec!(8),
        clawback_rate: dec!(100),
        distribution_life_years: dec!(4),
    });
    s
}

pub fn builtin_templates() -> Vec<WaterfallScenario> {
    vec![standard_european(), american_deal_by_deal()]
}

pub fn find_template(id: &str) -> Option<WaterfallScenario> {
    builtin_templates().into_iter().find(|t| t.id == id)
}
