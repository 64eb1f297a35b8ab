use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WaterfallError;
use crate::types::*;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Legal structure of the distribution waterfall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WaterfallModel {
    /// Whole-fund waterfall: all tiers cleared once across total proceeds
    #[default]
    European,
    /// Deal-by-deal waterfall
    American,
    /// Weighted interpolation of European and American results
    Blended,
}

impl WaterfallModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterfallModel::European => "european",
            WaterfallModel::American => "american",
            WaterfallModel::Blended => "blended",
        }
    }
}

impl fmt::Display for WaterfallModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaterfallModel {
    type Err = WaterfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "european" => Ok(WaterfallModel::European),
            "american" => Ok(WaterfallModel::American),
            "blended" | "hybrid" => Ok(WaterfallModel::Blended),
            _ => Err(WaterfallError::UnsupportedModel(s.to_string())),
        }
    }
}

impl TryFrom<String> for WaterfallModel {
    type Error = WaterfallError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WaterfallModel> for String {
    fn from(model: WaterfallModel) -> Self {
        model.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestorType {
    Lp,
    Gp,
}

/// Distribution mechanics for a waterfall tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TierType {
    /// Return of invested capital to LPs
    Roc,
    /// Simple hurdle on invested capital, paid to LPs
    PreferredReturn,
    /// GP catch-up to its target carry share of preferred profit
    CatchUp,
    /// Carried interest split of everything that remains
    Carry,
    /// Free-form split band, optionally capped by a hurdle
    Custom,
}

impl TierType {
    pub fn label(&self) -> &'static str {
        match self {
            TierType::Roc => "roc",
            TierType::PreferredReturn => "preferred-return",
            TierType::CatchUp => "catch-up",
            TierType::Carry => "carry",
            TierType::Custom => "custom",
        }
    }
}

/// Which capital figure measures an LP's pro-rata share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestedBasis {
    #[default]
    Commitment,
    CapitalCalled,
}

// ---------------------------------------------------------------------------
// Scenario building blocks
// ---------------------------------------------------------------------------

/// A pool of capital participating in the waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorClass {
    pub id: String,
    pub name: String,
    pub investor_type: InvestorType,
    /// Ownership within its investor type (0–100)
    pub ownership_percentage: Percent,
    pub commitment: Money,
    #[serde(default)]
    pub capital_called: Money,
    #[serde(default)]
    pub capital_returned: Money,
    #[serde(default)]
    pub order: u32,
}

impl InvestorClass {
    pub fn invested(&self, basis: InvestedBasis) -> Money {
        match basis {
            InvestedBasis::Commitment => self.commitment,
            InvestedBasis::CapitalCalled => self.capital_called,
        }
    }
}

/// A single ordered distribution rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallTier {
    pub id: String,
    pub name: String,
    pub tier_type: TierType,
    pub order: u32,
    /// Hurdle (0–100) for preferred-return tiers; cap for custom tiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hurdle_rate: Option<Percent>,
    /// GP share (0–100) for catch-up, carry and custom tiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gp_carry_percentage: Option<Percent>,
    /// LP share (0–100); defaults to `100 - gp_carry_percentage`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lp_percentage: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WaterfallTier {
    pub fn new(id: &str, name: &str, tier_type: TierType, order: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tier_type,
            order,
            hurdle_rate: None,
            gp_carry_percentage: None,
            lp_percentage: None,
            description: None,
        }
    }

    pub fn with_hurdle(mut self, hurdle_rate: Percent) -> Self {
        self.hurdle_rate = Some(hurdle_rate);
        self
    }

    pub fn with_split(mut self, gp: Percent, lp: Option<Percent>) -> Self {
        self.gp_carry_percentage = Some(gp);
        self.lp_percentage = lp;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClawbackProvision {
    pub enabled: bool,
    /// Return LPs must reach on invested capital (0–100)
    pub hurdle_rate: Percent,
    /// Share of the shortfall the GP must repay (0–100)
    pub clawback_rate: Percent,
    #[serde(default)]
    pub distribution_life_years: Years,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbackProvision {
    pub enabled: bool,
    #[serde(default)]
    pub lookback_years: Years,
    pub loss_carry_forward: Money,
    /// Share of unrecovered losses that places carry at risk (0–100)
    pub carry_at_risk_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedConfig {
    pub european_weight: Percent,
    pub american_weight: Percent,
}

// ---------------------------------------------------------------------------
// Aggregate root
// ---------------------------------------------------------------------------

/// A named, versioned waterfall scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallScenario {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub model: WaterfallModel,
    pub exit_value: Money,
    pub total_invested: Money,
    #[serde(default)]
    pub management_fees: Money,
    #[serde(default)]
    pub investor_classes: Vec<InvestorClass>,
    #[serde(default)]
    pub tiers: Vec<WaterfallTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clawback_provision: Option<ClawbackProvision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookback_provision: Option<LookbackProvision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blended_config: Option<BlendedConfig>,
    #[serde(default = "initial_version")]
    pub version: u32,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn initial_version() -> u32 {
    1
}

impl WaterfallScenario {
    /// A bare scenario with no classes, tiers or provisions.
    pub fn new(name: &str, model: WaterfallModel, exit_value: Money, total_invested: Money) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            description: None,
            model,
            exit_value,
            total_invested,
            management_fees: Decimal::ZERO,
            investor_classes: Vec::new(),
            tiers: Vec::new(),
            clawback_provision: None,
            lookback_provision: None,
            blended_config: None,
            version: 1,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            created_by: String::new(),
            is_favorite: false,
            is_template: false,
            tags: Vec::new(),
        }
    }

    /// Same scenario at a different exit value.
    pub fn at_exit_value(&self, exit_value: Money) -> Self {
        let mut next = self.clone();
        next.exit_value = exit_value;
        next
    }

    /// Tiers in processing order. The sort is stable, so equal `order`
    /// values keep their input sequence.
    pub fn ordered_tiers(&self) -> Vec<&WaterfallTier> {
        let mut tiers: Vec<&WaterfallTier> = self.tiers.iter().collect();
        tiers.sort_by_key(|t| t.order);
        tiers
    }

    pub fn classes_of(&self, investor_type: InvestorType) -> impl Iterator<Item = &InvestorClass> {
        self.investor_classes
            .iter()
            .filter(move |c| c.investor_type == investor_type)
    }
}

/// Knobs that change how a calculation measures capital.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOptions {
    #[serde(default)]
    pub invested_basis: InvestedBasis,
}
