use serde::{Deserialize, Serialize};

use super::model::{InvestorType, TierType, WaterfallModel};
use crate::types::*;

/// Full waterfall distribution result. Derived only; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallResults {
    pub model: WaterfallModel,
    pub total_exit_value: Money,
    pub total_invested: Money,
    /// Proceeds actually distributed by the tiers
    pub total_returned: Money,
    /// Proceeds left in the pool after the last tier
    pub undistributed: Money,
    /// GP profit share (catch-up plus carry)
    pub gp_carry: Money,
    /// GP carry as a share of distributed profit (0–100)
    pub gp_carry_percentage: Percent,
    /// Fees reported alongside the waterfall; not drawn from proceeds
    pub gp_management_fees: Money,
    pub gp_total_return: Money,
    pub lp_total_return: Money,
    pub lp_average_multiple: Multiple,
    pub investor_results: Vec<InvestorClassResult>,
    pub tier_breakdown: Vec<TierBreakdown>,
    pub tier_timeline: Vec<TierMilestone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clawback: Option<ClawbackAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookback: Option<LookbackAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blended_breakdown: Option<BlendedBreakdown>,
}

/// Distributions received by one investor class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorClassResult {
    pub investor_class_id: String,
    pub investor_class_name: String,
    pub investor_type: InvestorType,
    pub invested: Money,
    pub return_of_capital: Money,
    pub preferred_return: Money,
    pub catch_up: Money,
    pub carried_interest: Money,
    /// Custom-tier receipts
    pub other: Money,
    pub total_distribution: Money,
    pub profit: Money,
    pub multiple: Multiple,
    /// Share of total distributed proceeds (0–100)
    pub percentage_of_total: Percent,
}

/// Per-tier monetary split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub tier_id: String,
    pub tier_name: String,
    pub tier_type: TierType,
    pub gp_amount: Money,
    pub lp_amount: Money,
    pub total_amount: Money,
    /// Distributed through this tier inclusive
    pub cumulative_amount: Money,
    /// Share of the total exit value (0–100)
    pub percentage_of_exit: Percent,
    /// Whether the tier received its full claim
    pub fully_satisfied: bool,
    pub allocations: Vec<TierAllocation>,
}

/// Per-tier, per-class monetary split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierAllocation {
    pub investor_class_id: String,
    pub investor_class_name: String,
    pub investor_type: InvestorType,
    pub amount: Money,
    /// Share of the tier total (0–100)
    pub percentage_of_tier: Percent,
}

/// The point in the proceeds at which a tier cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierMilestone {
    /// 1-based position among populated tiers
    pub sequence: usize,
    pub tier_id: String,
    pub tier_name: String,
    pub tier_type: TierType,
    /// Cumulative exit proceeds consumed when this tier cleared
    pub exit_value_reached: Money,
    /// Whether the tier received its full claim
    pub fully_satisfied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClawbackStatus {
    Triggered,
    AtRisk,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClawbackAnalysis {
    pub status: ClawbackStatus,
    pub required_return: Money,
    pub total_returned: Money,
    pub shortfall: Money,
    pub total_carry_paid: Money,
    pub clawback_due: Money,
    pub net_carry_after_clawback: Money,
    /// Clawback due spread over the distribution life
    pub annualized_exposure: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookbackStatus {
    AtRisk,
    Cleared,
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbackAnalysis {
    pub status: LookbackStatus,
    pub lookback_years: Years,
    pub losses_to_recover: Money,
    pub total_carry_paid: Money,
    pub carry_at_risk: Money,
    pub carry_released: Money,
    /// Losses to recover per year of the lookback window
    pub annual_recovery_required: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedBreakdown {
    pub european_weight: Percent,
    pub american_weight: Percent,
    pub european_gp_carry: Money,
    pub american_gp_carry: Money,
    pub european_lp_total_return: Money,
    pub american_lp_total_return: Money,
}

impl WaterfallResults {
    pub fn tier(&self, tier_id: &str) -> Option<&TierBreakdown> {
        self.tier_breakdown.iter().find(|t| t.tier_id == tier_id)
    }

    pub fn investor(&self, investor_class_id: &str) -> Option<&InvestorClassResult> {
        self.investor_results
            .iter()
            .find(|r| r.investor_class_id == investor_class_id)
    }
}
