use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use waterfall_core::allocation::{allocation_issues, LpAllocation};

use super::read_document;

/// Arguments for LP allocation validation
#[derive(Args)]
pub struct AllocationArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Investor the allocation belongs to
    #[arg(long)]
    pub investor_id: Option<String>,

    #[arg(long)]
    pub gross: Option<Decimal>,

    #[arg(long)]
    pub withholding: Option<Decimal>,

    /// Withholding rate, 0-100
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub net: Option<Decimal>,
}

pub fn run_validate(args: AllocationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let allocation: LpAllocation = if args.gross.is_some() || args.net.is_some() {
        LpAllocation {
            investor_id: args.investor_id.unwrap_or_default(),
            gross_amount: args.gross.ok_or("--gross is required (or provide --input)")?,
            tax_withholding_amount: args.withholding.unwrap_or_default(),
            tax_withholding_rate: args.rate.unwrap_or_default(),
            net_amount: args.net.ok_or("--net is required (or provide --input)")?,
        }
    } else {
        read_document(args.input.as_deref(), "validate-allocation")?
    };

    let issues = allocation_issues(&allocation);
    Ok(serde_json::json!({
        "result": {
            "investorId": allocation.investor_id,
            "valid": issues.is_empty(),
            "issues": issues,
        }
    }))
}
