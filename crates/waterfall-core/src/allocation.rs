use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Reconciliation slack between net and gross less withholding.
const RECONCILIATION_TOLERANCE: Money = Decimal::ONE;

/// One LP's distribution after tax withholding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpAllocation {
    pub investor_id: String,
    pub gross_amount: Money,
    pub tax_withholding_amount: Money,
    /// Withholding rate on a 0-100 scale
    pub tax_withholding_rate: Percent,
    pub net_amount: Money,
}

/// Human-readable problems with an allocation. Empty means it reconciles.
///
/// Advisory only: the caller decides whether to block on them.
pub fn allocation_issues(allocation: &LpAllocation) -> Vec<String> {
    let mut issues = Vec::new();

    if allocation.gross_amount < Decimal::ZERO {
        issues.push("Gross amount cannot be negative".to_string());
    }
    if allocation.tax_withholding_amount < Decimal::ZERO {
        issues.push("Tax withholding amount cannot be negative".to_string());
    }
    if allocation.net_amount < Decimal::ZERO {
        issues.push("Net amount cannot be negative".to_string());
    }
    if allocation.net_amount > allocation.gross_amount {
        issues.push("Net amount cannot exceed gross amount".to_string());
    }
    if allocation.tax_withholding_rate < Decimal::ZERO
        || allocation.tax_withholding_rate > ONE_HUNDRED
    {
        issues.push("Tax withholding rate must be between 0% and 100%".to_string());
    }

    let expected_net = allocation
        .gross_amount
        .checked_sub(allocation.tax_withholding_amount);
    let gap = expected_net.and_then(|e| allocation.net_amount.checked_sub(e));
    match (expected_net, gap) {
        (Some(expected_net), Some(gap)) if gap.abs() > RECONCILIATION_TOLERANCE => {
            issues.push(format!(
                "Net amount {} does not equal gross {} less withholding {} (expected {})",
                allocation.net_amount,
                allocation.gross_amount,
                allocation.tax_withholding_amount,
                expected_net
            ))
        }
        (Some(_), Some(_)) => {}
        _ => issues.push("Amounts are too large to reconcile".to_string()),
    }

    issues
}
