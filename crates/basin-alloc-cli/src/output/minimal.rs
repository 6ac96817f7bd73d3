use serde_json::Value;

/// Print just the final per-basin ratios, one line per basin.
pub fn print_minimal(value: &Value) {
    let summary = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(|r| r.get("summary"))
        .and_then(Value::as_array);

    if let Some(rows) = summary {
        for row in rows {
            if let Value::Object(map) = row {
                println!(
                    "{} sand={} handle={} chem={} daily={}",
                    field(map, "basin"),
                    field(map, "ratio_sand"),
                    field(map, "ratio_handle"),
                    field(map, "ratio_chem"),
                    field(map, "ratio_daily"),
                );
            }
        }
        return;
    }

    // Not a run envelope, just print directly
    println!("{}", value);
}

fn field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
