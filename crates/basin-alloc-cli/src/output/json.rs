use serde_json::Value;

/// Pretty-print the run envelope as JSON. This is the machine-readable
/// surface; the exact envelope shape (result/methodology/warnings/
/// metadata) is part of the contract.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => println!("{body}"),
        Err(e) => eprintln!("failed to serialize report: {e}"),
    }
}
