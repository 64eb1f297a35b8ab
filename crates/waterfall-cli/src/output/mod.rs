//! Renderers for command output.
//!
//! JSON is printed untouched. The other formats read waterfall and sweep
//! results back into the engine's types and lay them out as typed rows;
//! anything else (allocation checks, scenario documents, listings) gets a
//! generic field/record view.

pub mod csv_out;
pub mod minimal;
pub mod table;

use rust_decimal::Decimal;
use serde_json::Value;

use waterfall_core::sensitivity::SensitivityAnalysis;
use waterfall_core::waterfall::{InvestorType, WaterfallResults};

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("JSON serialization error: {e}"),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A command's result, typed where the shape is known.
pub(crate) enum Report<'a> {
    Waterfall(Box<WaterfallResults>),
    Sweep(Box<SensitivityAnalysis>),
    Records(&'a [Value]),
    Fields(&'a Value),
}

impl<'a> Report<'a> {
    /// Look through the `with_metadata` envelope, if present, and classify
    /// its result.
    pub(crate) fn of(value: &'a Value) -> Self {
        let result = value.get("result").unwrap_or(value);

        if result.get("tierBreakdown").is_some() {
            if let Ok(results) = serde_json::from_value(result.clone()) {
                return Report::Waterfall(Box::new(results));
            }
        }
        if result.get("baseCaseIndex").is_some() {
            if let Ok(analysis) = serde_json::from_value(result.clone()) {
                return Report::Sweep(Box::new(analysis));
            }
        }

        match result {
            Value::Array(items) => Report::Records(items),
            other => Report::Fields(other),
        }
    }
}

/// JSON value as cell text. Decimals already arrive as strings.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Header row for a list of records: the first record's keys.
pub(crate) fn record_headers(items: &[Value]) -> Option<Vec<String>> {
    items
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
}

pub(crate) fn money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

pub(crate) fn multiple(value: Decimal) -> String {
    format!("{}x", value.round_dp(2))
}

pub(crate) fn side(investor_type: InvestorType) -> &'static str {
    match investor_type {
        InvestorType::Lp => "LP",
        InvestorType::Gp => "GP",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterfall_core::enhancements::calculate_enhanced;
    use waterfall_core::scenario::templates::standard_european;
    use waterfall_core::sensitivity::{run_sensitivity, SensitivityConfig, SensitivityRequest};
    use waterfall_core::types::with_metadata;
    use waterfall_core::waterfall::CalculationOptions;

    #[test]
    fn test_enveloped_waterfall_is_read_back() {
        let results =
            calculate_enhanced(&standard_european(), &CalculationOptions::default()).unwrap();
        let envelope = with_metadata("Waterfall", &serde_json::json!({}), vec![], 0, &results);
        let value = serde_json::to_value(envelope).unwrap();
        match Report::of(&value) {
            Report::Waterfall(r) => assert_eq!(*r, results),
            _ => panic!("Expected a waterfall report"),
        }
    }

    #[test]
    fn test_sweep_is_read_back() {
        let analysis = run_sensitivity(
            &standard_european(),
            &SensitivityRequest::default(),
            &SensitivityConfig::default(),
            &CalculationOptions::default(),
        )
        .unwrap();
        let value = serde_json::json!({ "result": analysis });
        assert!(matches!(Report::of(&value), Report::Sweep(_)));
    }

    #[test]
    fn test_other_shapes_fall_back() {
        let list = serde_json::json!([{ "id": "a" }, { "id": "b" }]);
        assert!(matches!(Report::of(&list), Report::Records(items) if items.len() == 2));

        let check = serde_json::json!({ "result": { "valid": true, "issues": [] } });
        assert!(matches!(Report::of(&check), Report::Fields(_)));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell(&serde_json::json!("10000000")), "10000000");
        assert_eq!(cell(&serde_json::json!(null)), "");
        assert_eq!(cell(&serde_json::json!(["a", "b"])), "a, b");
        assert_eq!(cell(&serde_json::json!(true)), "true");
        assert_eq!(multiple(Decimal::new(14, 1)), "1.4x");
    }
}
