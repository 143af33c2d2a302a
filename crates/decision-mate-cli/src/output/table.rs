use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into one Field/Value table; nested objects and arrays of
/// rows (cash-flow schedule, tornado bars, criteria) get a titled table each.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_section(None, result);
                print_envelope_notes(map);
            } else {
                print_section(None, value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_section(title: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            let (scalars, nested): (Vec<_>, Vec<_>) =
                map.iter().partition(|(_, v)| is_scalar_like(v));

            if !scalars.is_empty() {
                if let Some(t) = title {
                    println!("\n{}", t);
                }
                print_fields(&scalars);
            }
            for (key, val) in nested {
                let heading = match title {
                    Some(t) => format!("{} / {}", t, key),
                    None => key.clone(),
                };
                print_section(Some(heading.as_str()), val);
            }
        }
        Value::Array(arr) => {
            if let Some(t) = title {
                println!("\n{}", t);
            }
            print_array_table(arr);
        }
        other => println!("{}", format_value(other)),
    }
}

fn print_fields(fields: &[(&String, &Value)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

/// Arrays of plain values (inflows, scores) stay inline as a single cell.
fn is_scalar_like(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(arr) => !arr.iter().any(|v| v.is_object()),
        _ => true,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
