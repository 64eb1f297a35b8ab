use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;
use std::time::Instant;

use waterfall_core::allocation::LpAllocation;
use waterfall_core::sensitivity::{SensitivityConfig, SensitivityRequest};
use waterfall_core::types::with_metadata;
use waterfall_core::waterfall::{CalculationOptions, WaterfallScenario};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculationInput {
    scenario: WaterfallScenario,
    #[serde(default)]
    options: CalculationOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensitivityInput {
    scenario: WaterfallScenario,
    #[serde(default)]
    request: SensitivityRequest,
    #[serde(default)]
    config: SensitivityConfig,
    #[serde(default)]
    options: CalculationOptions,
}

// ---------------------------------------------------------------------------
// Waterfall
// ---------------------------------------------------------------------------

/// `{ scenario, options? }` in, enveloped `WaterfallResults` out.
#[napi]
pub fn calculate_waterfall(input_json: String) -> NapiResult<String> {
    let input: CalculationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let start = Instant::now();
    let warnings = waterfall_core::waterfall::scenario_warnings(&input.scenario);
    let results = waterfall_core::enhancements::calculate_enhanced(&input.scenario, &input.options)
        .map_err(to_napi_error)?;
    let output = with_metadata(
        &format!("{} distribution waterfall", input.scenario.model),
        &input.options,
        warnings,
        start.elapsed().as_micros() as u64,
        results,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn scenario_warnings(scenario_json: String) -> NapiResult<String> {
    let scenario: WaterfallScenario = serde_json::from_str(&scenario_json).map_err(to_napi_error)?;
    let warnings = waterfall_core::waterfall::scenario_warnings(&scenario);
    serde_json::to_string(&warnings).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

/// `{ scenario, request?, config?, options? }` in, enveloped sweep out.
#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let start = Instant::now();
    let warnings = waterfall_core::waterfall::scenario_warnings(&input.scenario);
    let analysis = waterfall_core::sensitivity::run_sensitivity(
        &input.scenario,
        &input.request,
        &input.config,
        &input.options,
    )
    .map_err(to_napi_error)?;
    let output = with_metadata(
        "Exit-value sweep re-running the full waterfall at each point",
        &input.request,
        warnings,
        start.elapsed().as_micros() as u64,
        analysis,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_sensitivity_config() -> NapiResult<String> {
    serde_json::to_string(&SensitivityConfig::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Allocations and templates
// ---------------------------------------------------------------------------

/// JSON array of issue strings; empty when the allocation reconciles.
#[napi]
pub fn allocation_issues(allocation_json: String) -> NapiResult<String> {
    let allocation: LpAllocation = serde_json::from_str(&allocation_json).map_err(to_napi_error)?;
    let issues = waterfall_core::allocation::allocation_issues(&allocation);
    serde_json::to_string(&issues).map_err(to_napi_error)
}

#[napi]
pub fn scenario_templates() -> NapiResult<String> {
    serde_json::to_string(&waterfall_core::scenario::builtin_templates()).map_err(to_napi_error)
}
