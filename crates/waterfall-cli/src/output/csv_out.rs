use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::io;

use waterfall_core::sensitivity::SensitivityDataPoint;
use waterfall_core::waterfall::{TierBreakdown, WaterfallResults};

use super::{cell, record_headers, Report};

type Writer<'a> = csv::Writer<io::StdoutLock<'a>>;

/// One tier of a waterfall as a CSV row.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TierRecord<'a> {
    tier_id: &'a str,
    tier_name: &'a str,
    tier_type: &'static str,
    lp_amount: Decimal,
    gp_amount: Decimal,
    total_amount: Decimal,
    cumulative_amount: Decimal,
    percentage_of_exit: Decimal,
    fully_satisfied: bool,
}

impl<'a> From<&'a TierBreakdown> for TierRecord<'a> {
    fn from(t: &'a TierBreakdown) -> Self {
        TierRecord {
            tier_id: &t.tier_id,
            tier_name: &t.tier_name,
            tier_type: t.tier_type.label(),
            lp_amount: t.lp_amount,
            gp_amount: t.gp_amount,
            total_amount: t.total_amount,
            cumulative_amount: t.cumulative_amount,
            percentage_of_exit: t.percentage_of_exit,
            fully_satisfied: t.fully_satisfied,
        }
    }
}

/// One sweep point. Enhancement columns are empty when the provision is off.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PointRecord {
    exit_value: Decimal,
    multiplier: Decimal,
    total_returned: Decimal,
    gp_carry: Decimal,
    gp_carry_percentage: Decimal,
    gp_total_return: Decimal,
    lp_total_return: Decimal,
    lp_average_multiple: Decimal,
    clawback_due: Option<Decimal>,
    carry_at_risk: Option<Decimal>,
}

impl From<&SensitivityDataPoint> for PointRecord {
    fn from(p: &SensitivityDataPoint) -> Self {
        PointRecord {
            exit_value: p.exit_value,
            multiplier: p.multiplier,
            total_returned: p.total_returned,
            gp_carry: p.gp_carry,
            gp_carry_percentage: p.gp_carry_percentage,
            gp_total_return: p.gp_total_return,
            lp_total_return: p.lp_total_return,
            lp_average_multiple: p.lp_average_multiple,
            clawback_due: p.clawback_due,
            carry_at_risk: p.carry_at_risk,
        }
    }
}

/// Write output as CSV to stdout: tier rows for a waterfall, one row per
/// point for a sweep, otherwise records or field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match Report::of(value) {
        Report::Waterfall(results) => write_tiers(&mut wtr, &results),
        Report::Sweep(analysis) => analysis
            .data_points
            .iter()
            .try_for_each(|p| wtr.serialize(PointRecord::from(p))),
        Report::Records(items) => write_records(&mut wtr, items),
        Report::Fields(fields) => write_fields(&mut wtr, fields),
    };

    if let Err(e) = written.and_then(|()| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {e}");
    }
}

fn write_tiers(wtr: &mut Writer<'_>, results: &WaterfallResults) -> csv::Result<()> {
    results
        .tier_breakdown
        .iter()
        .try_for_each(|t| wtr.serialize(TierRecord::from(t)))
}

/// A result carrying a list of records (a metric curve, say) is written as
/// that list; anything else as field/value pairs.
fn write_fields(wtr: &mut Writer<'_>, value: &Value) -> csv::Result<()> {
    let Value::Object(map) = value else {
        return wtr.write_record([cell(value)]);
    };

    if let Some(items) = map
        .values()
        .filter_map(Value::as_array)
        .find(|items| items.iter().any(Value::is_object))
    {
        return write_records(wtr, items);
    }

    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.clone(), cell(val)])?;
    }
    Ok(())
}

fn write_records(wtr: &mut Writer<'_>, items: &[Value]) -> csv::Result<()> {
    let Some(headers) = record_headers(items) else {
        return items.iter().try_for_each(|item| wtr.write_record([cell(item)]));
    };

    wtr.write_record(&headers)?;
    for item in items {
        wtr.write_record(
            headers
                .iter()
                .map(|h| item.get(h.as_str()).map(cell).unwrap_or_default()),
        )?;
    }
    Ok(())
}
