//! Lenient numeric decoding for rows coming out of a live editing grid.
//!
//! Partially edited rows routinely carry blanks, `null`s or stray text in numeric
//! columns. These helpers turn anything that is not a number into zero (or "missing")
//! instead of failing the whole record.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal_text(&number.to_string())
            .or_else(|| number.as_f64().and_then(Decimal::from_f64)),
        Value::String(text) => parse_decimal_text(text.trim()),
        _ => None,
    }
}

pub fn parse_decimal_text(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }

    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok()
}

/// Ceiling for any single quantity, rate or day count fed to the engine. With margins capped
/// at 100% each, products and sums of bounded inputs stay far inside `Decimal`'s range.
pub const MAX_INPUT_MAGNITUDE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Clamps into `[0, MAX_INPUT_MAGNITUDE]`.
pub fn bounded_input(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(MAX_INPUT_MAGNITUDE)
}

pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value).unwrap_or(Decimal::ZERO))
}

pub(crate) fn lenient_bounded<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_decimal(deserializer).map(bounded_input)
}

pub(crate) fn lenient_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{bounded_input, decimal_from_value, parse_decimal_text, MAX_INPUT_MAGNITUDE};

    #[test]
    fn numbers_and_numeric_strings_decode() {
        assert_eq!(decimal_from_value(&json!(10)), Some(Decimal::new(10, 0)));
        assert_eq!(decimal_from_value(&json!(2.5)), Some(Decimal::new(25, 1)));
        assert_eq!(decimal_from_value(&json!(" 7.25 ")), Some(Decimal::new(725, 2)));
    }

    #[test]
    fn garbage_decodes_to_none() {
        assert_eq!(decimal_from_value(&json!("ten")), None);
        assert_eq!(decimal_from_value(&json!(null)), None);
        assert_eq!(decimal_from_value(&json!(true)), None);
        assert_eq!(decimal_from_value(&json!([1])), None);
        assert_eq!(parse_decimal_text(""), None);
    }

    #[test]
    fn scientific_notation_is_accepted() {
        assert_eq!(parse_decimal_text("1e3"), Some(Decimal::new(1000, 0)));
    }

    #[test]
    fn inputs_are_capped_at_the_magnitude_ceiling() {
        assert_eq!(bounded_input(Decimal::new(-5, 0)), Decimal::ZERO);
        assert_eq!(bounded_input(Decimal::new(1_000_000_000_000_000, 0)), MAX_INPUT_MAGNITUDE);
        assert_eq!(bounded_input(Decimal::new(2500, 2)), Decimal::new(25, 0));
    }
}
