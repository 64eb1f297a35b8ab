use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WaterfallError;
use crate::EngineResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percent-style inputs on a 0–100 scale (8 = 8%), as scenario documents
/// carry them. Divide by `ONE_HUNDRED` before using as a multiplier.
pub type Percent = Decimal;

/// Multiples (e.g., 1.4x distributed / invested)
pub type Multiple = Decimal;

/// Years or year counts
pub type Years = Decimal;

pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Convert a 0–100 percent into a decimal fraction.
pub fn pct(value: Percent) -> Decimal {
    value / ONE_HUNDRED
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------
// Decimal operators panic on overflow. Anything fed by caller-supplied
// amounts or rates goes through these instead.

pub(crate) fn checked_mul(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| WaterfallError::overflow(context))
}

pub(crate) fn checked_div(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_div(b).ok_or_else(|| WaterfallError::overflow(context))
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| WaterfallError::overflow(context))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| WaterfallError::overflow(context))
}

pub(crate) fn checked_sum<I>(values: I, context: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, v, context))
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
