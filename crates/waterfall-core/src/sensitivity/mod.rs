pub mod config;

pub use config::SensitivityConfig;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::enhancements::calculate_enhanced;
use crate::error::WaterfallError;
use crate::types::*;
use crate::waterfall::{CalculationOptions, WaterfallModel, WaterfallResults, WaterfallScenario};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Sweep parameters; anything left out comes from `SensitivityConfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensitivityRequest {
    pub min_multiplier: Option<Decimal>,
    pub max_multiplier: Option<Decimal>,
    pub steps: Option<u32>,
}

/// Output metric that can be read off a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensitivityMetric {
    GpCarry,
    GpTotalReturn,
    LpTotalReturn,
    LpAverageMultiple,
    GpCarryPercentage,
    TotalReturned,
    ClawbackDue,
    CarryAtRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityDataPoint {
    pub exit_value: Money,
    /// Exit value relative to the base scenario
    pub multiplier: Decimal,
    pub total_returned: Money,
    pub gp_carry: Money,
    pub gp_carry_percentage: Percent,
    pub gp_total_return: Money,
    pub lp_total_return: Money,
    pub lp_average_multiple: Multiple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clawback_due: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_at_risk: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysis {
    pub model: WaterfallModel,
    pub base_exit_value: Money,
    pub min_exit_value: Money,
    pub max_exit_value: Money,
    pub step_size: Money,
    pub steps: u32,
    pub data_points: Vec<SensitivityDataPoint>,
    /// Index of the point closest to the base exit value
    pub base_case_index: usize,
    /// First swept exit value at which the GP earns carry
    pub carry_threshold_exit_value: Option<Money>,
}

impl SensitivityDataPoint {
    fn from_results(base_exit_value: Money, results: &WaterfallResults) -> EngineResult<Self> {
        let multiplier = if base_exit_value.is_zero() {
            Decimal::ZERO
        } else {
            checked_div(results.total_exit_value, base_exit_value, "sweep multiplier")?
        };
        Ok(Self {
            exit_value: results.total_exit_value,
            multiplier,
            total_returned: results.total_returned,
            gp_carry: results.gp_carry,
            gp_carry_percentage: results.gp_carry_percentage,
            gp_total_return: results.gp_total_return,
            lp_total_return: results.lp_total_return,
            lp_average_multiple: results.lp_average_multiple,
            clawback_due: results.clawback.as_ref().map(|c| c.clawback_due),
            carry_at_risk: results.lookback.as_ref().map(|l| l.carry_at_risk),
        })
    }

    pub fn metric(&self, metric: SensitivityMetric) -> Decimal {
        match metric {
            SensitivityMetric::GpCarry => self.gp_carry,
            SensitivityMetric::GpTotalReturn => self.gp_total_return,
            SensitivityMetric::LpTotalReturn => self.lp_total_return,
            SensitivityMetric::LpAverageMultiple => self.lp_average_multiple,
            SensitivityMetric::GpCarryPercentage => self.gp_carry_percentage,
            SensitivityMetric::TotalReturned => self.total_returned,
            SensitivityMetric::ClawbackDue => self.clawback_due.unwrap_or_default(),
            SensitivityMetric::CarryAtRisk => self.carry_at_risk.unwrap_or_default(),
        }
    }
}

impl SensitivityAnalysis {
    /// (exit value, metric value) pairs in sweep order.
    pub fn curve(&self, metric: SensitivityMetric) -> Vec<(Money, Decimal)> {
        self.data_points
            .iter()
            .map(|p| (p.exit_value, p.metric(metric)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Sweep generation
// ---------------------------------------------------------------------------

/// Evenly spaced exit values for a sweep, plus the step between them.
///
/// Multipliers are clamped into the configured range, the span is widened
/// to `min_range_span` and the step to `min_step`; widening moves the end
/// of the range, never the start.
pub fn generate_exit_values(
    base_exit_value: Money,
    request: &SensitivityRequest,
    config: &SensitivityConfig,
) -> EngineResult<(Vec<Money>, Money)> {
    config.validate()?;

    if base_exit_value < Decimal::ZERO {
        return Err(WaterfallError::InvalidInput {
            field: "exit_value".into(),
            reason: "Base exit value cannot be negative".into(),
        });
    }

    let steps = request.steps.unwrap_or(config.default_steps);
    if !config.step_options.contains(&steps) {
        return Err(WaterfallError::InvalidInput {
            field: "steps".into(),
            reason: format!("Step count must be one of {:?}", config.step_options),
        });
    }

    let clamp = |m: Decimal| m.clamp(config.min_range_multiplier, config.max_range_multiplier);
    let min_multiplier = clamp(request.min_multiplier.unwrap_or(config.default_min_multiplier));
    let max_multiplier = clamp(request.max_multiplier.unwrap_or(config.default_max_multiplier));
    if min_multiplier > max_multiplier {
        return Err(WaterfallError::InvalidInput {
            field: "min_multiplier".into(),
            reason: "Min multiplier must be <= max multiplier".into(),
        });
    }

    let min = checked_mul(base_exit_value, min_multiplier, "sweep start")?;
    let mut max = checked_mul(base_exit_value, max_multiplier, "sweep end")?;
    if max - min < config.min_range_span {
        max = checked_add(min, config.min_range_span, "sweep end")?;
    }

    let step_count = Decimal::from(steps);
    let mut step = (max - min) / step_count;
    if step < config.min_step {
        step = config.min_step;
    }

    let values = (0..=steps)
        .map(|i| {
            let offset = checked_mul(step, Decimal::from(i), "sweep point")?;
            checked_add(min, offset, "sweep point")
        })
        .collect::<EngineResult<Vec<Money>>>()?;
    Ok((values, step))
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Re-run the full calculation (including enhancements) across an exit-value
/// sweep.
///
/// Deterministic and uncached. Any point that fails fails the whole sweep:
/// a curve with holes in it would misstate the response.
pub fn run_sensitivity(
    scenario: &WaterfallScenario,
    request: &SensitivityRequest,
    config: &SensitivityConfig,
    options: &CalculationOptions,
) -> EngineResult<SensitivityAnalysis> {
    let base_exit_value = scenario.exit_value;
    let (exit_values, step) = generate_exit_values(base_exit_value, request, config)?;
    let steps = (exit_values.len() - 1) as u32;

    info!(
        scenario = %scenario.id,
        model = %scenario.model,
        points = exit_values.len(),
        "running exit-value sensitivity"
    );

    let mut data_points = Vec::with_capacity(exit_values.len());
    for exit_value in &exit_values {
        let point = scenario.at_exit_value(*exit_value);
        let results = calculate_enhanced(&point, options)?;
        debug!(exit_value = %exit_value, gp_carry = %results.gp_carry, "sensitivity point");
        data_points.push(SensitivityDataPoint::from_results(base_exit_value, &results)?);
    }

    let carry_threshold_exit_value = data_points
        .iter()
        .find(|p| p.gp_carry > Decimal::ZERO)
        .map(|p| p.exit_value);

    let min_exit_value = exit_values.first().copied().unwrap_or_default();
    let max_exit_value = exit_values.last().copied().unwrap_or_default();

    Ok(SensitivityAnalysis {
        model: scenario.model,
        base_exit_value,
        min_exit_value,
        max_exit_value,
        step_size: step,
        steps,
        base_case_index: closest_index(&exit_values, base_exit_value),
        data_points,
        carry_threshold_exit_value,
    })
}
