//! Tariff version resolution.
//!
//! This module selects the tariff version in force for a calendar month.

use chrono::{Datelike, NaiveDate};

use crate::config::{TariffIndex, resolve_position};
use crate::models::{AuditStep, AuditWarning, VersionId};

/// Day of the month used as the reference date for version resolution.
pub const REFERENCE_DAY: u32 = 15;

/// The result of resolving a tariff version, including the audit step.
#[derive(Debug, Clone)]
pub struct VersionResolution {
    /// The version in force, or `None` if the index has no versions.
    pub version: Option<VersionId>,
    /// The day-15 reference date for the requested month.
    pub reference_date: NaiveDate,
    /// True if the reference date precedes every known version.
    pub fell_back_to_earliest: bool,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
    /// Warnings raised while resolving.
    pub warnings: Vec<AuditWarning>,
}

/// Builds the reference date for a month: the 15th.
///
/// Months outside 1-12 are clamped into range, as are years outside the
/// supported calendar.
///
/// ```
/// use tariff_engine::calculation::reference_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(reference_date(2025, 6), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
/// assert_eq!(reference_date(2025, 13), NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
/// assert_eq!(reference_date(2025, 0), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
/// ```
pub fn reference_date(year: i32, month: u32) -> NaiveDate {
    let year = year.clamp(NaiveDate::MIN.year() + 1, NaiveDate::MAX.year() - 1);
    let month = month.clamp(1, 12);
    NaiveDate::from_ymd_opt(year, month, REFERENCE_DAY).unwrap_or(NaiveDate::MIN)
}

/// Returns the version in force for `year`/`month`.
///
/// This is the latest version effective on or before the 15th of the month.
/// If the month precedes every version, the earliest version is returned.
/// Returns `None` only when the index has no versions.
pub fn resolve(index: &TariffIndex, year: i32, month: u32) -> Option<VersionId> {
    resolve_at(index, reference_date(year, month))
}

fn resolve_at(index: &TariffIndex, date: NaiveDate) -> Option<VersionId> {
    let versions = index.versions();
    resolve_position(versions, date).map(|position| versions[position])
}

/// Resolves the tariff version for a month and records the decision.
///
/// # Example
///
/// ```
/// use tariff_engine::calculation::resolve_version;
/// use tariff_engine::config::{TariffDataset, TariffIndex};
///
/// let index = TariffIndex::build(&TariffDataset::new(serde_json::json!({
///     "bd_hourly": [
///         { "valid_from": "2024-07-01", "by_eg": {} },
///         { "valid_from": "2025-04-01", "by_eg": {} }
///     ]
/// })));
///
/// let resolution = resolve_version(&index, 2025, 3, 1);
/// assert_eq!(resolution.version.unwrap().to_string(), "2024-07-01");
/// assert!(!resolution.fell_back_to_earliest);
/// ```
pub fn resolve_version(
    index: &TariffIndex,
    year: i32,
    month: u32,
    step_number: u32,
) -> VersionResolution {
    let reference_date = reference_date(year, month);
    let version = resolve_at(index, reference_date);
    let fell_back_to_earliest =
        version.is_some_and(|v| v.effective_date() > reference_date);

    let mut warnings = Vec::new();
    if version.is_none() {
        warnings.push(AuditWarning::new(
            "NO_VERSIONS",
            "The tariff dataset contains no versions; all table-based amounts are 0",
            "high",
        ));
    }
    if let Some(earliest) = version.filter(|_| fell_back_to_earliest) {
        warnings.push(AuditWarning::new(
            "VERSION_FALLBACK_EARLIEST",
            format!(
                "{} precedes every tariff version; using the earliest version {}",
                reference_date, earliest
            ),
            "medium",
        ));
    }

    let reasoning = match version {
        Some(v) if fell_back_to_earliest => format!(
            "Reference date {} precedes all {} versions; fell back to earliest version {}",
            reference_date,
            index.versions().len(),
            v
        ),
        Some(v) => format!(
            "Latest of {} versions effective on or before {} is {}",
            index.versions().len(),
            reference_date,
            v
        ),
        None => format!("No tariff versions available for {}", reference_date),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "version_resolution".to_string(),
        rule_name: "Tariff Version Resolution".to_string(),
        input: serde_json::json!({
            "year": year,
            "month": month,
            "reference_date": reference_date.to_string(),
            "available_versions": index.versions().iter().map(ToString::to_string).collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "version": version.map(|v| v.to_string()),
            "fell_back_to_earliest": fell_back_to_earliest
        }),
        reasoning,
    };

    VersionResolution {
        version,
        reference_date,
        fell_back_to_earliest,
        audit_step,
        warnings,
    }
}
