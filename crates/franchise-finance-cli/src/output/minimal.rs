use serde_json::Value;

/// Headline figure of each command, most specific first.
const HEADLINE_KEYS: [&str; 6] = [
    "total_fees",
    "periodic_payment",
    "self_funding_required",
    "expected_final_roi_percent",
    "total",
    "amount",
];

/// Print the one number a script usually wants from a command.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match headline(result) {
        Some(val) => println!("{}", scalar(val)),
        None => println!("{}", scalar(result)),
    }
}

fn headline(result: &Value) -> Option<&Value> {
    let map = result.as_object()?;
    HEADLINE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
