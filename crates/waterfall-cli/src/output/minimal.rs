use serde_json::Value;

use super::{cell, money, Report};

/// Headline fields for results that are not a waterfall or sweep, in order.
const HEADLINE_KEYS: [&str; 5] = ["valid", "carryThresholdExitValue", "seeded", "deleted", "id"];

/// Print just the key answer: GP carry for a waterfall, the exit value where
/// carry starts for a sweep, ids for a listing.
pub fn print_minimal(value: &Value) {
    println!("{}", answer(value));
}

fn answer(value: &Value) -> String {
    match Report::of(value) {
        Report::Waterfall(results) => money(results.gp_carry),
        Report::Sweep(analysis) => analysis
            .carry_threshold_exit_value
            .map_or_else(|| "none".to_string(), money),
        Report::Records(items) => items
            .iter()
            .map(|item| item.get("id").map_or_else(|| cell(item), cell))
            .collect::<Vec<_>>()
            .join("\n"),
        Report::Fields(fields) => headline(fields),
    }
}

/// First headline key present (null reads as "none"), else the first field.
fn headline(value: &Value) -> String {
    let Some(map) = value.as_object() else {
        return cell(value);
    };
    HEADLINE_KEYS
        .iter()
        .find_map(|key| map.get(*key))
        .map(|v| if v.is_null() { "none".to_string() } else { cell(v) })
        .or_else(|| map.iter().next().map(|(key, v)| format!("{key}: {}", cell(v))))
        .unwrap_or_default()
}
