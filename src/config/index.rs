//! The tariff index.
//!
//! [`TariffIndex`] is built once from a [`TariffDataset`] and is read-only
//! afterwards. It turns the loosely-typed dataset into typed, date-sorted
//! lookup structures keyed by the closed enums in [`crate::models`].

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{PayGrade, SeniorityLevel, SlotKey, VersionId};
use crate::numeric::{clamp_quantity, decimal_from_value};

use super::series::DatedSeries;
use super::types::{
    DatedAmount, LevelFactors, OnCallRateVersion, OnCallRates, TariffDataset, WageTable,
    WageTableVersion, level_factors_from_value, percentage,
};

const WAGE_TABLES: &str = "entgelttabellen";
const ON_CALL_RATES: &str = "bd_hourly";
const SLOT_FACTORS: &str = "rb_factors";
const TAX_FREE: &str = "rb_taxfree";
const SHIFT_ALLOWANCE: &str = "schichtzulage";
const NIGHT_SHIFT_RATE: &str = "wechselschicht_nacht_eur_per_h";

/// An on-call rate together with the version it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    /// The hourly rate.
    pub rate: Decimal,
    /// The version whose rate table supplied it.
    pub source: VersionId,
}

/// Lookup structures derived from a tariff dataset.
///
/// # Example
///
/// ```
/// use tariff_engine::config::{TariffDataset, TariffIndex};
/// use tariff_engine::models::{PayGrade, VersionId};
/// use chrono::NaiveDate;
///
/// let dataset = TariffDataset::new(serde_json::json!({
///     "weekly_hours": 40,
///     "entgelttabellen": [
///         { "valid_from": "2025-04-01", "table": { "EG II": [6910, 7489, 7992] } }
///     ]
/// }));
///
/// let index = TariffIndex::build(&dataset);
/// let version = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
///
/// assert_eq!(index.versions(), &[version]);
/// assert_eq!(index.steps_at(version, PayGrade::EgII), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TariffIndex {
    weekly_hours: Decimal,
    versions: Vec<VersionId>,
    wage_tables: DatedSeries<WageTable>,
    on_call_rates: DatedSeries<OnCallRates>,
    slot_factors: HashMap<SlotKey, LevelFactors>,
    tax_free_pct: HashMap<SlotKey, Decimal>,
    shift_allowance: DatedSeries<Decimal>,
    night_shift_rate: DatedSeries<Decimal>,
}

impl TariffIndex {
    /// Builds the index. Never fails: missing or malformed sub-tables yield
    /// empty lookups.
    pub fn build(dataset: &TariffDataset) -> Self {
        let weekly_hours = dataset
            .tariff
            .get("weekly_hours")
            .and_then(decimal_from_value)
            .map(clamp_quantity)
            .unwrap_or(Decimal::ZERO);

        let wage_tables = DatedSeries::from_entries(
            dated_entries(dataset, WAGE_TABLES, WageTableVersion::from_value)
                .map(|version| (version.effective_date, version.table)),
        );
        let on_call_rates = DatedSeries::from_entries(
            dated_entries(dataset, ON_CALL_RATES, OnCallRateVersion::from_value)
                .map(|version| (version.effective_date, version.rates)),
        );
        let shift_allowance = DatedSeries::from_entries(
            dated_entries(dataset, SHIFT_ALLOWANCE, |entry| {
                DatedAmount::from_value(entry, "eur_per_month")
            })
            .map(|dated| (dated.effective_date, dated.amount)),
        );
        let night_shift_rate = DatedSeries::from_entries(
            dated_entries(dataset, NIGHT_SHIFT_RATE, |entry| {
                DatedAmount::from_value(entry, "eur_per_hour")
            })
            .map(|dated| (dated.effective_date, dated.amount)),
        );

        let slot_factors = slot_table(dataset, SLOT_FACTORS, level_factors_from_value);
        let tax_free_pct = slot_table(dataset, TAX_FREE, percentage);

        let versions: Vec<VersionId> = [
            wage_tables.dates(),
            on_call_rates.dates(),
            shift_allowance.dates(),
            night_shift_rate.dates(),
        ]
        .into_iter()
        .flatten()
        .copied()
        .collect::<BTreeSet<NaiveDate>>()
        .into_iter()
        .map(VersionId::new)
        .collect();

        debug!(
            versions = versions.len(),
            wage_tables = wage_tables.len(),
            on_call_rate_tables = on_call_rates.len(),
            slot_factors = slot_factors.len(),
            %weekly_hours,
            "Built tariff index"
        );
        if versions.is_empty() {
            warn!("Tariff dataset contains no dated entries");
        }

        Self {
            weekly_hours,
            versions,
            wage_tables,
            on_call_rates,
            slot_factors,
            tax_free_pct,
            shift_allowance,
            night_shift_rate,
        }
    }

    /// Contractual weekly working hours (0 if missing).
    pub fn weekly_hours(&self) -> Decimal {
        self.weekly_hours
    }

    /// All version identifiers, ascending.
    pub fn versions(&self) -> &[VersionId] {
        &self.versions
    }

    /// The wage table in force at `version`.
    pub fn wage_table_at(&self, version: VersionId) -> Option<&WageTable> {
        self.wage_tables
            .in_force(version.effective_date())
            .map(|(_, table)| table)
    }

    /// The monthly amounts for `grade` at `version`, by step.
    pub fn wage_row(&self, version: VersionId, grade: PayGrade) -> Option<&[Decimal]> {
        self.wage_table_at(version)
            .and_then(|table| table.get(&grade))
            .map(Vec::as_slice)
    }

    /// The on-call hourly rate for `grade` at `version`.
    ///
    /// If the version's own rate table lacks the grade, the last earlier
    /// table that has it is used.
    pub fn on_call_rate(&self, version: VersionId, grade: PayGrade) -> Option<ResolvedRate> {
        let date = version.effective_date();
        if let Some(rate) = self.on_call_rates.exact(date).and_then(|rates| rates.get(&grade)) {
            return Some(ResolvedRate {
                rate: *rate,
                source: version,
            });
        }

        self.on_call_rates
            .iter()
            .take_while(|(effective_date, _)| *effective_date < date)
            .filter_map(|(effective_date, rates)| {
                rates.get(&grade).map(|rate| ResolvedRate {
                    rate: *rate,
                    source: VersionId::new(effective_date),
                })
            })
            .last()
    }

    /// The standby factor percentage for a slot and level, if configured.
    pub fn slot_factor(&self, slot: SlotKey, level: SeniorityLevel) -> Option<Decimal> {
        self.slot_factors
            .get(&slot)
            .and_then(|factors| factors.get(&level))
            .copied()
    }

    /// The tax-free percentage for a slot (0 if not configured).
    pub fn tax_free_pct(&self, slot: SlotKey) -> Decimal {
        self.tax_free_pct
            .get(&slot)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// The monthly shift allowance in force at `date`, with its effective date.
    pub fn shift_allowance_at(&self, date: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        self.shift_allowance
            .resolve(date)
            .map(|(effective_date, amount)| (effective_date, *amount))
    }

    /// The hourly night-shift rate in force at `date`, with its effective date.
    pub fn night_shift_rate_at(&self, date: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        self.night_shift_rate
            .resolve(date)
            .map(|(effective_date, amount)| (effective_date, *amount))
    }

    /// Pay grades with a wage row at `version`, ascending.
    pub fn pay_grades_at(&self, version: VersionId) -> Vec<PayGrade> {
        PayGrade::ALL
            .into_iter()
            .filter(|grade| self.wage_row(version, *grade).is_some())
            .collect()
    }

    /// Number of seniority steps for `grade` at `version`.
    pub fn steps_at(&self, version: VersionId, grade: PayGrade) -> usize {
        self.wage_row(version, grade).map_or(0, <[Decimal]>::len)
    }
}

fn dated_entries<'a, T>(
    dataset: &'a TariffDataset,
    key: &'static str,
    parse: impl Fn(&serde_json::Value) -> Option<T> + 'a,
) -> impl Iterator<Item = T> + 'a {
    dataset
        .entries(key)
        .iter()
        .enumerate()
        .filter_map(move |(position, entry)| {
            let parsed = parse(entry);
            if parsed.is_none() {
                warn!(sub_table = key, position, "Skipping malformed dated entry");
            }
            parsed
        })
}

fn slot_table<T>(
    dataset: &TariffDataset,
    key: &'static str,
    parse: impl Fn(&serde_json::Value) -> Option<T>,
) -> HashMap<SlotKey, T> {
    let Some(raw) = dataset.object(key) else {
        return HashMap::new();
    };

    raw.iter()
        .filter_map(|(raw_slot, value)| {
            let slot = match raw_slot.parse::<SlotKey>() {
                Ok(slot) => slot,
                Err(err) => {
                    warn!(sub_table = key, %err, "Skipping unknown slot");
                    return None;
                }
            };
            parse(value).map(|parsed| (slot, parsed))
        })
        .collect()
}
