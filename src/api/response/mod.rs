pub mod collector_list;
pub mod inverter_data_list;
pub mod station_list;
pub mod user_login;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a JSON value as a number. Numeric strings are parsed, anything else counts as 0.
pub fn as_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn as_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/* The vendor API sends identifiers either as strings or as numbers */
pub(crate) fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    let repr = value.to_string();

    as_id(value).ok_or_else(|| serde::de::Error::custom(format!("invalid identifier: {}", repr)))
}

pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    Value::deserialize(d).map(as_id)
}

pub(crate) fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Value::deserialize(d).map(|v| as_number(&v))
}
