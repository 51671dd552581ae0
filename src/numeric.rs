//! Tolerant numeric parsing.
//!
//! Hour and amount inputs reach the engine either as numbers or as text typed
//! by a user in a German or English locale. Everything here is total: text
//! that cannot be read as a number becomes zero instead of an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// Parses locale-formatted numeric text.
///
/// Grouping and decimal separators are inferred from their position:
/// when both `.` and `,` occur, the right-most one is the decimal separator.
/// A lone `,` is a decimal comma. A lone `.` followed by exactly three digits
/// after a non-zero integer part is a thousands separator.
///
/// # Examples
///
/// ```
/// use tariff_engine::numeric::parse_decimal;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(parse_decimal("1.234,56"), Decimal::from_str("1234.56").unwrap());
/// assert_eq!(parse_decimal("12,5"), Decimal::from_str("12.5").unwrap());
/// assert_eq!(parse_decimal(""), Decimal::ZERO);
/// assert_eq!(parse_decimal("abc"), Decimal::ZERO);
/// ```
pub fn parse_decimal(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    let cleaned = cleaned.strip_suffix('%').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(&normalize_separators(cleaned)).unwrap_or(Decimal::ZERO)
}

fn normalize_separators(text: &str) -> String {
    match (text.rfind('.'), text.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => text.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => text.replace(',', ""),
        (None, Some(_)) if text.matches(',').count() == 1 => text.replace(',', "."),
        (None, Some(_)) => text.replace(',', ""),
        (Some(dot), None) if text.matches('.').count() > 1 || is_grouping_dot(text, dot) => {
            text.replace('.', "")
        }
        _ => text.to_string(),
    }
}

fn is_grouping_dot(text: &str, dot: usize) -> bool {
    let integer = text[..dot].trim_start_matches(['-', '+']);
    let fraction = &text[dot + 1..];
    fraction.len() == 3
        && fraction.chars().all(|c| c.is_ascii_digit())
        && !integer.is_empty()
        && integer.chars().any(|c| c != '0')
}

/// Clamps a value to be non-negative.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// The largest hour count, amount or hourly rate the engine accepts.
///
/// Hours, rates and derived hourly rates are each at most 1e9 and
/// percentages at most [`MAX_PERCENTAGE`], so the longest chain the
/// calculators compute (hours × factor% × hourly rate × tax-free%) stays
/// at most 1e20, far inside [`Decimal`]'s range of about 7.9e28.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// The largest percentage (standby factor or tax-free share) the engine
/// accepts: 1000%.
pub const MAX_PERCENTAGE: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Clamps a parsed hour count or amount into `[0, MAX_QUANTITY]`.
pub fn clamp_quantity(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, MAX_QUANTITY)
}

/// Clamps a percentage into `[0, MAX_PERCENTAGE]`.
pub fn clamp_percentage(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, MAX_PERCENTAGE)
}

/// Rounds a monetary amount to cents, half away from zero.
///
/// The engine itself never rounds; this is for callers presenting results.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a float to a decimal through its shortest round-trip text.
///
/// `38.03_f64` becomes exactly `38.03` rather than its binary expansion.
/// Non-finite or out-of-range values become zero.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or(Decimal::ZERO)
}

/// Reads a dataset value that may be a JSON number or numeric text.
///
/// JSON numbers are taken literally; only strings go through [`parse_decimal`].
///
/// Returns `None` for values that are neither (objects, arrays, booleans, null).
pub fn decimal_from_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            Some(
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .unwrap_or(Decimal::ZERO),
            )
        }
        serde_json::Value::String(s) => Some(parse_decimal(s)),
        _ => None,
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or numeric text")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Ok(decimal_from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(parse_decimal(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }
}

/// Serde helper: a number or numeric text, unparsable text as zero.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor)
}

/// Serde helper: like [`lenient_decimal`], clamped by [`clamp_quantity`].
pub fn non_negative_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_decimal(deserializer).map(clamp_quantity)
}

/// Serde helper for an integer that may arrive as text (`"3"`, `"3,0"`).
///
/// Fractions are truncated; anything unreadable is zero.
pub fn lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_decimal(deserializer)?;
    Ok(value.trunc().to_i64().unwrap_or(0))
}

struct NonNegative(Decimal);

impl<'de> Deserialize<'de> for NonNegative {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        non_negative_decimal(deserializer).map(NonNegative)
    }
}

/// Serde helper for a keyed map of non-negative amounts.
pub fn non_negative_map<'de, D, K>(deserializer: D) -> Result<BTreeMap<K, Decimal>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
{
    let raw = BTreeMap::<K, NonNegative>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.0)).collect())
}
