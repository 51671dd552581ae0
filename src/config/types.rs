//! Tariff dataset types.
//!
//! The dataset arrives as loosely-typed JSON (or YAML) authored outside the
//! engine. It is kept as a [`serde_json::Value`] and read entry by entry, so a
//! single malformed record is skipped instead of rejecting the whole dataset.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{PayGrade, SeniorityLevel};
use crate::numeric::{MAX_PERCENTAGE, clamp_percentage, clamp_quantity, decimal_from_value};

/// The raw, immutable tariff dataset.
///
/// Expected shape under `tariff`:
///
/// ```text
/// weekly_hours: number
/// entgelttabellen: [{ valid_from, table: { <PayGrade>: [number] } }]
/// bd_hourly:       [{ valid_from, by_eg: { <PayGrade>: number } }]
/// rb_factors:      { <SlotKey>: { I, II, III } }
/// rb_taxfree:      { <SlotKey>: number }
/// schichtzulage:   [{ valid_from, eur_per_month }]
/// wechselschicht_nacht_eur_per_h: [{ valid_from, eur_per_hour }]
/// ```
///
/// # Example
///
/// ```
/// use tariff_engine::config::TariffDataset;
///
/// let dataset: TariffDataset = serde_json::from_str(r#"{"tariff": {"weekly_hours": 40}}"#).unwrap();
/// assert_eq!(dataset.tariff["weekly_hours"], 40);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffDataset {
    /// The tariff section; anything missing here reads as empty.
    #[serde(default)]
    pub tariff: Value,
}

impl TariffDataset {
    /// Wraps an already-parsed `tariff` section.
    pub fn new(tariff: Value) -> Self {
        Self { tariff }
    }

    /// Returns the named sub-table as a list of entries, or an empty slice
    /// if it is missing or not a list.
    pub(crate) fn entries(&self, key: &str) -> &[Value] {
        match self.tariff.get(key) {
            Some(Value::Array(entries)) => entries.as_slice(),
            Some(other) => {
                warn!(sub_table = key, found = %kind_of(other), "Expected a list; ignoring sub-table");
                &[]
            }
            None => &[],
        }
    }

    /// Returns the named sub-table as an object, if it is one.
    pub(crate) fn object(&self, key: &str) -> Option<&serde_json::Map<String, Value>> {
        match self.tariff.get(key) {
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                warn!(sub_table = key, found = %kind_of(other), "Expected an object; ignoring sub-table");
                None
            }
            None => None,
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Reads `valid_from` as an ISO date; a trailing time part is ignored.
pub(crate) fn parse_valid_from(entry: &Value) -> Option<NaiveDate> {
    let raw = entry.get("valid_from")?.as_str()?.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn amount(value: &Value) -> Decimal {
    decimal_from_value(value)
        .map(clamp_quantity)
        .unwrap_or(Decimal::ZERO)
}

/// Reads a percentage, capped at [`MAX_PERCENTAGE`].
pub(crate) fn percentage(value: &Value) -> Option<Decimal> {
    let pct = decimal_from_value(value)?;
    if pct > MAX_PERCENTAGE {
        warn!(%pct, max = %MAX_PERCENTAGE, "Capping out-of-range percentage");
    }
    Some(clamp_percentage(pct))
}

/// Monthly amounts by pay grade, each indexed by seniority step (0-based).
pub type WageTable = HashMap<PayGrade, Vec<Decimal>>;

/// Hourly on-call rates by pay grade.
pub type OnCallRates = HashMap<PayGrade, Decimal>;

/// Factor percentages by seniority level for one standby slot.
pub type LevelFactors = HashMap<SeniorityLevel, Decimal>;

/// One dated version of the wage table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WageTableVersion {
    /// The date from which the table applies.
    pub effective_date: NaiveDate,
    /// Monthly amounts by grade and step.
    pub table: WageTable,
}

impl WageTableVersion {
    /// Reads one `entgelttabellen` entry. Unknown grade keys are skipped;
    /// non-numeric amounts read as zero so step positions are preserved.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let effective_date = parse_valid_from(entry)?;
        let raw_table = entry.get("table")?.as_object()?;

        let mut table = WageTable::new();
        for (key, amounts) in raw_table {
            let Ok(grade) = key.parse::<PayGrade>() else {
                warn!(key = %key, valid_from = %effective_date, "Skipping unknown pay grade in wage table");
                continue;
            };
            let Some(amounts) = amounts.as_array() else {
                warn!(pay_grade = %grade, valid_from = %effective_date, "Wage table row is not a list");
                continue;
            };
            table.insert(grade, amounts.iter().map(amount).collect());
        }

        Some(Self {
            effective_date,
            table,
        })
    }
}

/// One dated version of the on-call hourly rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnCallRateVersion {
    /// The date from which the rates apply.
    pub effective_date: NaiveDate,
    /// Hourly rate by grade.
    pub rates: OnCallRates,
}

impl OnCallRateVersion {
    /// Reads one `bd_hourly` entry.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let effective_date = parse_valid_from(entry)?;
        let by_grade = entry.get("by_eg")?.as_object()?;

        let mut rates = OnCallRates::new();
        for (key, rate) in by_grade {
            let Ok(grade) = key.parse::<PayGrade>() else {
                warn!(key = %key, valid_from = %effective_date, "Skipping unknown pay grade in on-call rates");
                continue;
            };
            if let Some(rate) = decimal_from_value(rate) {
                rates.insert(grade, clamp_quantity(rate));
            }
        }

        Some(Self {
            effective_date,
            rates,
        })
    }
}

/// A single dated amount: the monthly shift allowance or the hourly
/// night-shift rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatedAmount {
    /// The date from which the amount applies.
    pub effective_date: NaiveDate,
    /// The amount.
    pub amount: Decimal,
}

impl DatedAmount {
    /// Reads one entry, taking the amount from `field`.
    pub fn from_value(entry: &Value, field: &str) -> Option<Self> {
        let effective_date = parse_valid_from(entry)?;
        let amount = decimal_from_value(entry.get(field)?)?;
        Some(Self {
            effective_date,
            amount: clamp_quantity(amount),
        })
    }
}

/// Reads one `rb_factors` slot entry (`{ "I": 12.5, "II": 15, "III": 20 }`).
pub(crate) fn level_factors_from_value(value: &Value) -> Option<LevelFactors> {
    let raw = value.as_object()?;
    let factors = raw
        .iter()
        .filter_map(|(key, pct)| {
            let level = key.parse::<SeniorityLevel>().ok()?;
            Some((level, percentage(pct).unwrap_or(Decimal::ZERO)))
        })
        .collect();
    Some(factors)
}
