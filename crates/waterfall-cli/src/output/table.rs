use serde_json::Value;
use tabled::{builder::Builder, Table, Tabled};

use waterfall_core::sensitivity::{SensitivityAnalysis, SensitivityDataPoint};
use waterfall_core::waterfall::*;

use super::{cell, money, multiple, record_headers, side, Report};

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Tier")]
    name: String,
    #[tabled(rename = "Type")]
    tier_type: &'static str,
    #[tabled(rename = "LP")]
    lp: String,
    #[tabled(rename = "GP")]
    gp: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Cumulative")]
    cumulative: String,
    #[tabled(rename = "% of exit")]
    share: String,
    #[tabled(rename = "Filled")]
    filled: &'static str,
}

impl From<&TierBreakdown> for TierRow {
    fn from(t: &TierBreakdown) -> Self {
        TierRow {
            name: t.tier_name.clone(),
            tier_type: t.tier_type.label(),
            lp: money(t.lp_amount),
            gp: money(t.gp_amount),
            total: money(t.total_amount),
            cumulative: money(t.cumulative_amount),
            share: money(t.percentage_of_exit),
            filled: if t.fully_satisfied { "yes" } else { "partial" },
        }
    }
}

#[derive(Tabled)]
struct InvestorRow {
    #[tabled(rename = "Class")]
    name: String,
    #[tabled(rename = "Side")]
    side: &'static str,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Distributed")]
    distributed: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Multiple")]
    multiple: String,
    #[tabled(rename = "% of total")]
    share: String,
}

impl From<&InvestorClassResult> for InvestorRow {
    fn from(r: &InvestorClassResult) -> Self {
        InvestorRow {
            name: r.investor_class_name.clone(),
            side: side(r.investor_type),
            invested: money(r.invested),
            distributed: money(r.total_distribution),
            profit: money(r.profit),
            multiple: multiple(r.multiple),
            share: money(r.percentage_of_total),
        }
    }
}

#[derive(Tabled)]
struct SweepRow {
    #[tabled(rename = "Exit value")]
    exit_value: String,
    #[tabled(rename = "x Base")]
    multiplier: String,
    #[tabled(rename = "GP carry")]
    gp_carry: String,
    #[tabled(rename = "Carry %")]
    carry_share: String,
    #[tabled(rename = "LP total")]
    lp_total: String,
    #[tabled(rename = "LP multiple")]
    lp_multiple: String,
    #[tabled(rename = "Clawback due")]
    clawback_due: String,
    #[tabled(rename = "Carry at risk")]
    carry_at_risk: String,
}

impl From<&SensitivityDataPoint> for SweepRow {
    fn from(p: &SensitivityDataPoint) -> Self {
        let optional = |v: Option<rust_decimal::Decimal>| v.map_or_else(|| "-".to_string(), money);
        SweepRow {
            exit_value: money(p.exit_value),
            multiplier: p.multiplier.round_dp(3).to_string(),
            gp_carry: money(p.gp_carry),
            carry_share: money(p.gp_carry_percentage),
            lp_total: money(p.lp_total_return),
            lp_multiple: multiple(p.lp_average_multiple),
            clawback_due: optional(p.clawback_due),
            carry_at_risk: optional(p.carry_at_risk),
        }
    }
}

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match Report::of(value) {
        Report::Waterfall(results) => print_waterfall(&results),
        Report::Sweep(analysis) => print_sweep(&analysis),
        Report::Records(items) => print_records(items),
        Report::Fields(fields) => print_fields(fields),
    }
    print_envelope_notes(value);
}

fn field_table(rows: &[(&str, String)]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in rows {
        builder.push_record([*field, value.as_str()]);
    }
    Table::from(builder)
}

fn print_waterfall(r: &WaterfallResults) {
    let mut summary = vec![
        ("Model", r.model.to_string()),
        ("Exit value", money(r.total_exit_value)),
        ("Invested", money(r.total_invested)),
        ("Returned", money(r.total_returned)),
        ("Undistributed", money(r.undistributed)),
        ("GP carry", format!("{} ({}% of profit)", money(r.gp_carry), money(r.gp_carry_percentage))),
        ("GP total", money(r.gp_total_return)),
        ("LP total", money(r.lp_total_return)),
        ("LP multiple", multiple(r.lp_average_multiple)),
    ];
    if let Some(b) = &r.blended_breakdown {
        summary.push((
            "Weights",
            format!("{}% European / {}% American", b.european_weight, b.american_weight),
        ));
    }
    println!("{}", field_table(&summary));

    println!("\nTiers:");
    println!("{}", Table::new(r.tier_breakdown.iter().map(TierRow::from)));

    if !r.investor_results.is_empty() {
        println!("\nInvestor classes:");
        println!("{}", Table::new(r.investor_results.iter().map(InvestorRow::from)));
    }

    if let Some(c) = &r.clawback {
        let status = match c.status {
            ClawbackStatus::Triggered => "triggered",
            ClawbackStatus::AtRisk => "at risk",
            ClawbackStatus::Clear => "clear",
        };
        println!(
            "\nClawback: {status}. Required {}, shortfall {}, due {} of {} carry paid",
            money(c.required_return),
            money(c.shortfall),
            money(c.clawback_due),
            money(c.total_carry_paid),
        );
    }
    if let Some(l) = &r.lookback {
        let status = match l.status {
            LookbackStatus::AtRisk => "at risk",
            LookbackStatus::Cleared => "cleared",
            LookbackStatus::Monitor => "monitor",
        };
        println!(
            "\nLookback: {status}. {} of carry at risk against {} of losses over {} years",
            money(l.carry_at_risk),
            money(l.losses_to_recover),
            l.lookback_years,
        );
    }
}

fn print_sweep(a: &SensitivityAnalysis) {
    let threshold = a
        .carry_threshold_exit_value
        .map_or_else(|| "not reached".to_string(), money);
    let summary = [
        ("Model", a.model.to_string()),
        ("Base exit value", money(a.base_exit_value)),
        ("Range", format!("{} to {}", money(a.min_exit_value), money(a.max_exit_value))),
        ("Step", format!("{} ({} steps)", money(a.step_size), a.steps)),
        ("Carry starts at", threshold),
    ];
    println!("{}", field_table(&summary));
    println!();
    println!("{}", Table::new(a.data_points.iter().map(SweepRow::from)));
}

/// Scalars as Field/Value, then each list of records as its own table.
fn print_fields(value: &Value) {
    let Value::Object(map) = value else {
        println!("{}", cell(value));
        return;
    };

    let mut scalars = Vec::new();
    let mut sections = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => sections.push((key, items)),
            _ => scalars.push((key.as_str(), cell(val))),
        }
    }
    println!("{}", field_table(&scalars));
    for (key, items) in sections {
        println!("\n{key}:");
        print_records(items);
    }
}

fn print_records(items: &[Value]) {
    let Some(headers) = record_headers(items) else {
        if items.is_empty() {
            println!("(none)");
        }
        for item in items {
            println!("{}", cell(item));
        }
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in items {
        builder.push_record(
            headers
                .iter()
                .map(|h| item.get(h.as_str()).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", cell(w));
            }
        }
    }
    if let Some(Value::String(methodology)) = value.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}
