//! Tolerant deserializers for service payloads.
//!
//! The service echoes fields back as whatever JSON type it parsed them into:
//! eastings come back as integers, vice counties as strings or numbers, and
//! optional lists as `null`. These helpers fold all of that into strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

/// Deserialize any scalar (or null) into `Option<String>`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string))
}

/// Deserialize a list of scalars, treating `null` as empty.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .filter_map(scalar_to_string)
        .collect())
}

/// Deserialize a `u32` from a number or numeric string, as used for
/// spatial reference system ids and rule group ids.
pub fn number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid number: {number}"))),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {text}"))),
        other => Err(serde::de::Error::custom(format!("invalid number: {other}"))),
    }
}
