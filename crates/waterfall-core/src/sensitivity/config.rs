use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::WaterfallError;
use crate::types::*;
use crate::EngineResult;

/// Range and step constants for exit-value sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensitivityConfig {
    /// Lowest multiplier of the base exit value a sweep may start at
    pub min_range_multiplier: Decimal,
    pub default_min_multiplier: Decimal,
    pub default_max_multiplier: Decimal,
    /// Highest multiplier of the base exit value a sweep may reach
    pub max_range_multiplier: Decimal,
    /// Smallest distance between sweep start and end
    pub min_range_span: Money,
    /// Smallest distance between two sweep points
    pub min_step: Money,
    /// Suggested slider increment as a fraction of the base exit value
    pub step_multiplier: Decimal,
    pub default_steps: u32,
    pub step_options: Vec<u32>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            min_range_multiplier: dec!(0.1),
            default_min_multiplier: dec!(0.5),
            default_max_multiplier: dec!(3),
            max_range_multiplier: dec!(10),
            min_range_span: dec!(1000000),
            min_step: dec!(10000),
            step_multiplier: dec!(0.05),
            default_steps: 20,
            step_options: vec![10, 20, 50, 100],
        }
    }
}

impl SensitivityConfig {
    /// Reject configurations that cannot produce a sweep.
    pub fn validate(&self) -> EngineResult<()> {
        if self.min_range_multiplier < Decimal::ZERO {
            return Err(invalid("min_range_multiplier", "cannot be negative"));
        }
        if self.max_range_multiplier < self.min_range_multiplier {
            return Err(invalid(
                "max_range_multiplier",
                "must be at least min_range_multiplier",
            ));
        }
        if self.min_range_span < Decimal::ZERO || self.min_step < Decimal::ZERO {
            return Err(invalid("min_range_span", "span and step floors cannot be negative"));
        }
        if self.step_options.is_empty() || self.step_options.contains(&0) {
            return Err(invalid("step_options", "must list at least one positive step count"));
        }
        if !self.step_options.contains(&self.default_steps) {
            return Err(invalid("default_steps", "must be one of step_options"));
        }
        Ok(())
    }

    /// Slider increment for a base exit value, never below `min_step`.
    pub fn suggested_step(&self, base_exit_value: Money) -> EngineResult<Money> {
        Ok(checked_mul(base_exit_value, self.step_multiplier, "suggested step")?.max(self.min_step))
    }
}

fn invalid(field: &str, reason: &str) -> WaterfallError {
    WaterfallError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
