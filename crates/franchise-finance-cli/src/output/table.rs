use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Render the envelope as tables: scalar fields first, then one table per
/// nested object or array of records.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => {
                print_section("result", result);
                print_footer(map);
            }
            None => print_section("result", value),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{value}"),
    }
}

fn print_section(title: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            let (scalars, nested): (Vec<_>, Vec<_>) =
                map.iter().partition(|(_, v)| is_scalar_like(v));
            if !scalars.is_empty() {
                println!("{}", title.bold());
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in scalars {
                    builder.push_record([key.as_str(), &format_value(val)]);
                }
                println!("{}", Table::from(builder));
            }
            for (key, val) in nested {
                println!();
                print_section(&format!("{title}.{key}"), val);
            }
        }
        Value::Array(arr) => {
            println!("{}", title.bold());
            print_records(arr);
        }
        other => println!("{}: {}", title.bold(), format_value(other)),
    }
}

fn print_records(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        let items: Vec<String> = arr.iter().map(format_value).collect();
        println!("{}", items.join(", "));
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in arr {
        if let Value::Object(map) = item {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h).map(format_value).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

/// Scalars, and arrays of scalars, fit in a single cell.
fn is_scalar_like(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(arr) => arr.iter().all(|v| !v.is_object() && !v.is_array()),
        _ => true,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_like() {
        assert!(is_scalar_like(&json!("6")));
        assert!(is_scalar_like(&json!(["a", "b"])));
        assert!(!is_scalar_like(&json!([{"a": 1}])));
        assert!(!is_scalar_like(&json!({"a": 1})));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!(["x", 1])), "x, 1");
    }
}
