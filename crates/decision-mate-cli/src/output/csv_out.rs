use serde_json::{Map, Value};
use std::io;

/// Row-shaped fields, in the order they are preferred when a result holds
/// more than one (a business appraisal carries both schedule and tornado).
const ROW_KEYS: [&str; 4] = ["results", "schedule", "criteria", "bars"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            if let Some(rows) = find_rows(body) {
                write_array_csv(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in body {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn find_rows(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_KEYS.iter().find_map(|key| match map.get(*key) {
        Some(Value::Array(rows)) => Some(rows),
        _ => None,
    })
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_preferred_over_scalars() {
        let value = json!({"summary": {"npv": "1"}, "schedule": [{"year": 0}], "sensitivity": {}});
        let rows = find_rows(value.as_object().unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_no_rows_in_flat_object() {
        let value = json!({"saved": true, "user": "ana"});
        assert!(find_rows(value.as_object().unwrap()).is_none());
    }
}
