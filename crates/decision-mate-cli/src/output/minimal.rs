use serde_json::Value;

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 6] = ["npv", "preferred_label", "base_npv", "count", "saved", "impact"];

/// Print just the key answer value from the output.
///
/// Looks through the result (and a nested `summary`, if any) for a
/// well-known headline field, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let summary = result_obj.get("summary").unwrap_or(result_obj);

    for candidate in [summary, result_obj] {
        if let Value::Object(map) = candidate {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key) {
                    if !val.is_null() {
                        println!("{}", format_minimal(val));
                        return;
                    }
                }
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
