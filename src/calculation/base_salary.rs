//! Base salary lookup.
//!
//! This module resolves the monthly table salary for a pay grade and
//! seniority step, and derives the individual hourly rate from it.

use rust_decimal::Decimal;

use crate::config::TariffIndex;
use crate::models::{AuditStep, AuditWarning, PayGrade, VersionId};
use crate::numeric::{MAX_QUANTITY, clamp_quantity};

/// Weeks per year used to convert weekly hours into monthly hours.
pub const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);

/// Months per year.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// The result of a base salary lookup, including the audit step.
#[derive(Debug, Clone)]
pub struct BaseSalaryResult {
    /// The monthly table salary (0 if the table or grade is missing).
    pub monthly: Decimal,
    /// The individual hourly rate derived from `monthly`.
    pub hourly: Decimal,
    /// The 1-based step actually used, or `None` if there was no table row.
    pub step_used: Option<usize>,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
    /// Warnings raised during the lookup.
    pub warnings: Vec<AuditWarning>,
}

/// Clamps a 1-based step into a row of `len` entries, returning a 0-based
/// position. Returns `None` for an empty row.
///
/// ```
/// use tariff_engine::calculation::clamp_step;
///
/// assert_eq!(clamp_step(3, 7), Some(2));
/// assert_eq!(clamp_step(0, 7), Some(0));
/// assert_eq!(clamp_step(-5, 7), Some(0));
/// assert_eq!(clamp_step(99, 7), Some(6));
/// assert_eq!(clamp_step(1, 0), None);
/// ```
pub fn clamp_step(step: i64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let position = usize::try_from(step.saturating_sub(1)).unwrap_or(0);
    Some(position.min(last))
}

/// Returns the monthly table salary for a grade and step at a version.
///
/// The step is clamped into the grade's row. Returns 0 if the version has no
/// wage table in force or the table has no row for the grade.
pub fn base_monthly(index: &TariffIndex, version: VersionId, grade: PayGrade, step: i64) -> Decimal {
    lookup(index, Some(version), grade, step)
        .map(|(monthly, _)| monthly)
        .unwrap_or(Decimal::ZERO)
}

fn lookup(
    index: &TariffIndex,
    version: Option<VersionId>,
    grade: PayGrade,
    step: i64,
) -> Option<(Decimal, usize)> {
    let row = index.wage_row(version?, grade)?;
    let position = clamp_step(step, row.len())?;
    Some((row[position], position))
}

/// Converts a monthly salary into an hourly rate.
///
/// Monthly hours are `weekly_hours × 52 / 12`, kept exact by computing
/// `monthly × 12 / (weekly_hours × 52)`. Both inputs are clamped into
/// `[0, MAX_QUANTITY]` first. Returns 0 if `weekly_hours` is 0; a rate above
/// [`MAX_QUANTITY`] (a vanishingly small weekly hour count) is capped there.
///
/// # Examples
///
/// ```
/// use tariff_engine::calculation::hourly_from_monthly;
/// use tariff_engine::numeric::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let hourly = hourly_from_monthly(Decimal::from(7992), Decimal::from(40));
/// assert_eq!(round_money(hourly), Decimal::from_str("46.11").unwrap());
/// assert_eq!(hourly_from_monthly(Decimal::from(7992), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn hourly_from_monthly(monthly: Decimal, weekly_hours: Decimal) -> Decimal {
    let yearly_hours = clamp_quantity(weekly_hours) * WEEKS_PER_YEAR;
    if yearly_hours.is_zero() {
        return Decimal::ZERO;
    }
    (clamp_quantity(monthly) * MONTHS_PER_YEAR)
        .checked_div(yearly_hours)
        .map_or(MAX_QUANTITY, clamp_quantity)
}

/// Resolves the base salary and hourly rate, recording the lookup.
pub fn calculate_base_salary(
    index: &TariffIndex,
    version: Option<VersionId>,
    grade: PayGrade,
    step: i64,
    step_number: u32,
) -> BaseSalaryResult {
    let weekly_hours = index.weekly_hours();
    let mut warnings = Vec::new();

    let row_len = version
        .and_then(|v| index.wage_row(v, grade))
        .map(<[Decimal]>::len);
    let resolved = lookup(index, version, grade, step);

    match (version, row_len) {
        (None, _) => {}
        (Some(v), None) if index.wage_table_at(v).is_none() => {
            warnings.push(AuditWarning::new(
                "WAGE_TABLE_MISSING",
                format!("No wage table is in force at version {}; base salary is 0", v),
                "high",
            ));
        }
        (Some(v), None) | (Some(v), Some(0)) => {
            warnings.push(AuditWarning::new(
                "PAY_GRADE_MISSING",
                format!("Wage table {} has no amounts for {}; base salary is 0", v, grade),
                "high",
            ));
        }
        (Some(_), Some(len)) => {
            if step < 1 || step > len as i64 {
                let used = resolved.map_or(1, |(_, position)| position + 1);
                warnings.push(AuditWarning::new(
                    "STEP_CLAMPED",
                    format!(
                        "Step {} is outside 1..={} for {}; using step {}",
                        step, len, grade, used
                    ),
                    "low",
                ));
            }
        }
    }

    if weekly_hours.is_zero() {
        warnings.push(AuditWarning::new(
            "WEEKLY_HOURS_MISSING",
            "Weekly hours are 0; all hourly rates are 0",
            "high",
        ));
    }

    let (monthly, step_used) = match resolved {
        Some((monthly, position)) => (monthly, Some(position + 1)),
        None => (Decimal::ZERO, None),
    };
    let hourly = hourly_from_monthly(monthly, weekly_hours);
    if hourly >= MAX_QUANTITY {
        warnings.push(AuditWarning::new(
            "HOURLY_RATE_CAPPED",
            format!(
                "Monthly {} over {} h/week exceeds the largest supported hourly rate; using {}",
                monthly.normalize(),
                weekly_hours.normalize(),
                MAX_QUANTITY
            ),
            "high",
        ));
    }

    let reasoning = match step_used {
        Some(used) => format!(
            "{} step {} at version {}: monthly {} / ({} h/week × 52 / 12) = {} per hour",
            grade,
            used,
            version.map_or_else(String::new, |v| v.to_string()),
            monthly.normalize(),
            weekly_hours.normalize(),
            hourly.normalize()
        ),
        None => format!("No table salary for {} step {}; base salary is 0", grade, step),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_salary".to_string(),
        rule_name: "Base Table Salary".to_string(),
        input: serde_json::json!({
            "version": version.map(|v| v.to_string()),
            "pay_grade": grade.key(),
            "requested_step": step,
            "weekly_hours": weekly_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "step_used": step_used,
            "monthly": monthly.normalize().to_string(),
            "hourly": hourly.normalize().to_string()
        }),
        reasoning,
    };

    BaseSalaryResult {
        monthly,
        hourly,
        step_used,
        audit_step,
        warnings,
    }
}
