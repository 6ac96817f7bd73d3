use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format the run report as console tables: the per-basin summary, the
/// orphan sprinkle rates, then warnings and methodology from the
/// envelope. Falls back to a generic Field/Value table for anything
/// that is not a run envelope.
pub fn print_table(value: &Value) {
    let Some(result) = value.as_object().and_then(|m| m.get("result")) else {
        print_flat_object(value);
        return;
    };

    if let Some(rows) = summary_with_total(result) {
        println!("Distribution Summary");
        print_rows(
            &rows,
            &[
                ("basin", "Basin"),
                ("sand_unalloc", "SandUnalloc"),
                ("prop_total", "PropTotal"),
                ("ratio_sand", "RatioSand"),
                ("handle_unalloc", "HandleUnalloc"),
                ("ratio_handle", "RatioHandle"),
                ("chem_unalloc", "ChemUnalloc"),
                ("ratio_chem", "RatioChem"),
                ("daily_unalloc", "DailyUnalloc"),
                ("day_total", "DayTotal"),
                ("ratio_daily", "RatioDaily"),
            ],
        );
    }

    let mut orphan_rows: Vec<(String, String, String)> = Vec::new();
    for key in ["sand", "handling", "chemical", "daily"] {
        if let Some(dist) = result.get(key) {
            let category = dist
                .get("category")
                .and_then(Value::as_str)
                .unwrap_or(key)
                .to_string();
            let pool = dist
                .get("orphan_pool")
                .map(format_value)
                .unwrap_or_default();
            let rate = dist
                .get("sprinkle_rate")
                .map(format_value)
                .unwrap_or_default();
            orphan_rows.push((category, pool, rate));
        }
    }
    if !orphan_rows.is_empty() {
        println!("\nOrphan Sprinkle Rates");
        let mut builder = Builder::default();
        builder.push_record(["Category", "Orphan Pool", "Sprinkle Rate"]);
        for (category, pool, rate) in orphan_rows {
            builder.push_record([category, pool, rate]);
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Per-basin summary rows plus the TOTAL row built from `result.totals`,
/// matching the sheet output. The TOTAL row carries no ratio fields, so
/// those cells render blank.
fn summary_with_total(result: &Value) -> Option<Vec<Value>> {
    let Some(Value::Array(summary)) = result.get("summary") else {
        return None;
    };
    let mut rows = summary.clone();
    if let Some(Value::Object(totals)) = result.get("totals") {
        let mut total = totals.clone();
        total.insert("basin".to_string(), Value::String("TOTAL".to_string()));
        rows.push(Value::Object(total));
    }
    Some(rows)
}

/// Print an array of objects as a table using the given (field, header)
/// column mapping.
fn print_rows(rows: &[Value], columns: &[(&str, &str)]) {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|(_, header)| header.to_string()));
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                columns
                    .iter()
                    .map(|(field, _)| map.get(*field).map(format_value).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
