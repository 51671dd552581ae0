//! On-call duty (Bereitschaftsdienst) pay calculation.
//!
//! On-call duty is paid per scheduled hour at a flat rate set per pay grade
//! and tariff version. Night and holiday hours earn a surcharge on top, and
//! every hour beyond the monthly threshold earns a further surcharge.

use rust_decimal::Decimal;

use crate::config::TariffIndex;
use crate::models::{AuditStep, AuditWarning, OnCallBreakdown, OnCallHours, PayGrade, VersionId};
use crate::numeric::clamp_quantity;

/// Surcharge on night hours (15%).
pub const NIGHT_SURCHARGE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Surcharge on holiday hours (25%).
pub const HOLIDAY_SURCHARGE_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Monthly on-call hours after which the threshold surcharge applies.
pub const THRESHOLD_HOURS: Decimal = Decimal::from_parts(97, 0, 0, false, 0);

/// Surcharge on hours beyond [`THRESHOLD_HOURS`] (5%).
pub const THRESHOLD_SURCHARGE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// The result of an on-call rate lookup, including the audit step.
#[derive(Debug, Clone)]
pub struct OnCallRateLookup {
    /// The hourly on-call rate (0 if none was found).
    pub rate: Decimal,
    /// The version the rate was taken from.
    pub source: Option<VersionId>,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
    /// Warnings raised during the lookup.
    pub warnings: Vec<AuditWarning>,
}

/// The result of an on-call pay calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct OnCallDutyResult {
    /// The itemized on-call pay.
    pub breakdown: OnCallBreakdown,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Warnings raised during the calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Looks up the on-call hourly rate for a grade at a version.
///
/// If the version's own rate table has no entry for the grade, the last
/// earlier version that has one is used and a warning is recorded.
pub fn lookup_on_call_rate(
    index: &TariffIndex,
    version: Option<VersionId>,
    grade: PayGrade,
    step_number: u32,
) -> OnCallRateLookup {
    let resolved = version.and_then(|v| index.on_call_rate(v, grade));
    let mut warnings = Vec::new();

    let reasoning = match (version, resolved) {
        (Some(v), Some(found)) if found.source == v => {
            format!("On-call rate for {} at version {}: {} per hour", grade, v, found.rate)
        }
        (Some(v), Some(found)) => {
            warnings.push(AuditWarning::new(
                "ON_CALL_RATE_FALLBACK",
                format!(
                    "Version {} has no on-call rate for {}; using the rate from {}",
                    v, grade, found.source
                ),
                "medium",
            ));
            format!(
                "Version {} has no on-call rate for {}; last known rate from {}: {} per hour",
                v, grade, found.source, found.rate
            )
        }
        (Some(v), None) => {
            warnings.push(AuditWarning::new(
                "ON_CALL_RATE_MISSING",
                format!("No on-call rate for {} at or before {}; on-call pay is 0", grade, v),
                "high",
            ));
            format!("No on-call rate for {} at or before version {}", grade, v)
        }
        (None, _) => format!("No tariff version resolved; no on-call rate for {}", grade),
    };

    let rate = resolved.map_or(Decimal::ZERO, |found| found.rate);
    let source = resolved.map(|found| found.source);

    let audit_step = AuditStep {
        step_number,
        rule_id: "on_call_rate_lookup".to_string(),
        rule_name: "On-Call Rate Lookup".to_string(),
        input: serde_json::json!({
            "version": version.map(|v| v.to_string()),
            "pay_grade": grade.key()
        }),
        output: serde_json::json!({
            "rate": rate.normalize().to_string(),
            "source_version": source.map(|v| v.to_string())
        }),
        reasoning,
    };

    OnCallRateLookup {
        rate,
        source,
        audit_step,
        warnings,
    }
}

/// Calculates on-call duty pay.
///
/// Night hours are clamped into `[0, total]` and holiday hours into
/// `[0, total - night]`. The four terms are:
///
/// - base: `total × rate`
/// - night surcharge: `night × rate × 15%`
/// - holiday surcharge: `holiday × rate × 25%`
/// - threshold surcharge: `max(0, total - 97) × rate × 5%`
///
/// # Examples
///
/// ```
/// use tariff_engine::calculation::calculate_on_call_duty;
/// use tariff_engine::models::OnCallHours;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let hours = OnCallHours {
///     total: Decimal::from(100),
///     night: Decimal::from(10),
///     holiday: Decimal::from(5),
/// };
/// let rate = Decimal::from_str("38.03").unwrap();
///
/// let result = calculate_on_call_duty(&hours, rate, None, 4);
/// assert_eq!(result.breakdown.base, Decimal::from_str("3803").unwrap());
/// assert_eq!(result.breakdown.threshold_surcharge, Decimal::from_str("5.7045").unwrap());
/// assert_eq!(result.breakdown.total, Decimal::from_str("3913.287").unwrap());
/// ```
pub fn calculate_on_call_duty(
    hours: &OnCallHours,
    rate: Decimal,
    rate_version: Option<VersionId>,
    step_number: u32,
) -> OnCallDutyResult {
    let rate = clamp_quantity(rate);
    let total_hours = clamp_quantity(hours.total);
    let night_hours = clamp_quantity(hours.night).min(total_hours);
    let holiday_hours = clamp_quantity(hours.holiday).min(total_hours - night_hours);
    let threshold_hours = (total_hours - THRESHOLD_HOURS).max(Decimal::ZERO);

    let mut warnings = Vec::new();
    if night_hours < hours.night || holiday_hours < hours.holiday {
        warnings.push(AuditWarning::new(
            "HOURS_CLAMPED",
            format!(
                "Night ({}) and holiday ({}) hours exceed total on-call hours ({}); using night {} and holiday {}",
                hours.night.normalize(),
                hours.holiday.normalize(),
                total_hours.normalize(),
                night_hours.normalize(),
                holiday_hours.normalize()
            ),
            "low",
        ));
    }

    let base = total_hours * rate;
    let night_surcharge = night_hours * rate * NIGHT_SURCHARGE_RATE;
    let holiday_surcharge = holiday_hours * rate * HOLIDAY_SURCHARGE_RATE;
    let threshold_surcharge = threshold_hours * rate * THRESHOLD_SURCHARGE_RATE;
    let total = base + night_surcharge + holiday_surcharge + threshold_surcharge;

    let breakdown = OnCallBreakdown {
        hours: total_hours,
        night_hours,
        holiday_hours,
        threshold_hours,
        rate,
        rate_version,
        base,
        night_surcharge,
        holiday_surcharge,
        threshold_surcharge,
        total,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "on_call_duty".to_string(),
        rule_name: "On-Call Duty Pay".to_string(),
        input: serde_json::json!({
            "total_hours": total_hours.normalize().to_string(),
            "night_hours": night_hours.normalize().to_string(),
            "holiday_hours": holiday_hours.normalize().to_string(),
            "rate": rate.normalize().to_string(),
            "threshold_hours": THRESHOLD_HOURS.to_string()
        }),
        output: serde_json::json!({
            "base": base.normalize().to_string(),
            "night_surcharge": night_surcharge.normalize().to_string(),
            "holiday_surcharge": holiday_surcharge.normalize().to_string(),
            "threshold_surcharge": threshold_surcharge.normalize().to_string(),
            "total": total.normalize().to_string()
        }),
        reasoning: format!(
            "{} h × {} = {}; night {} h × 15% = {}; holiday {} h × 25% = {}; {} h beyond {} × 5% = {}; total {}",
            total_hours.normalize(),
            rate.normalize(),
            base.normalize(),
            night_hours.normalize(),
            night_surcharge.normalize(),
            holiday_hours.normalize(),
            holiday_surcharge.normalize(),
            threshold_hours.normalize(),
            THRESHOLD_HOURS,
            threshold_surcharge.normalize(),
            total.normalize()
        ),
    };

    OnCallDutyResult {
        breakdown,
        audit_step,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TariffDataset;
    use crate::numeric::round_money;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn hours(total: &str, night: &str, holiday: &str) -> OnCallHours {
        OnCallHours {
            total: dec(total),
            night: dec(night),
            holiday: dec(holiday),
        }
    }

    fn version(y: i32, m: u32, d: u32) -> VersionId {
        VersionId::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    // ==========================================================================
    // Formula
    // ==========================================================================

    #[test]
    fn test_on_call_pay_reference_scenario() {
        let result = calculate_on_call_duty(&hours("100", "10", "5"), dec("38.03"), None, 4);
        let b = &result.breakdown;

        assert_eq!(b.base, dec("3803"));
        assert_eq!(b.night_surcharge, dec("57.045"));
        assert_eq!(b.holiday_surcharge, dec("47.5375"));
        assert_eq!(b.threshold_hours, dec("3"));
        assert_eq!(b.threshold_surcharge, dec("5.7045"));
        assert_eq!(b.total, dec("3913.287"));
        assert_eq!(round_money(b.total), dec("3913.29"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_threshold_surcharge_zero_at_or_below_threshold() {
        let at = calculate_on_call_duty(&hours("97", "0", "0"), dec("38.03"), None, 4);
        let below = calculate_on_call_duty(&hours("40", "0", "0"), dec("38.03"), None, 4);

        assert_eq!(at.breakdown.threshold_surcharge, Decimal::ZERO);
        assert_eq!(below.breakdown.threshold_surcharge, Decimal::ZERO);
        assert_eq!(at.breakdown.total, dec("3688.91"));
    }

    #[test]
    fn test_threshold_surcharge_just_above_threshold() {
        let result = calculate_on_call_duty(&hours("97.5", "0", "0"), dec("40"), None, 4);
        assert_eq!(result.breakdown.threshold_surcharge, dec("1"));
    }

    #[test]
    fn test_zero_rate_yields_zero_pay() {
        let result = calculate_on_call_duty(&hours("120", "20", "10"), Decimal::ZERO, None, 4);
        assert_eq!(result.breakdown.total, Decimal::ZERO);
        assert_eq!(result.breakdown.hours, dec("120"));
    }

    // ==========================================================================
    // Clamping
    // ==========================================================================

    #[test]
    fn test_night_hours_clamped_to_total() {
        let result = calculate_on_call_duty(&hours("10", "15", "0"), dec("40"), None, 4);

        assert_eq!(result.breakdown.night_hours, dec("10"));
        assert_eq!(result.breakdown.night_surcharge, dec("60"));
        assert_eq!(result.warnings[0].code, "HOURS_CLAMPED");
    }

    #[test]
    fn test_holiday_hours_clamped_to_remaining_total() {
        let result = calculate_on_call_duty(&hours("10", "6", "8"), dec("40"), None, 4);

        assert_eq!(result.breakdown.night_hours, dec("6"));
        assert_eq!(result.breakdown.holiday_hours, dec("4"));
        assert_eq!(result.breakdown.holiday_surcharge, dec("40"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_negative_hours_treated_as_zero() {
        let result = calculate_on_call_duty(&hours("-5", "-1", "-1"), dec("40"), None, 4);
        assert_eq!(result.breakdown.hours, Decimal::ZERO);
        assert_eq!(result.breakdown.total, Decimal::ZERO);
    }

    // ==========================================================================
    // Rate lookup
    // ==========================================================================

    fn rate_index() -> TariffIndex {
        TariffIndex::build(&TariffDataset::new(json!({
            "bd_hourly": [
                { "valid_from": "2024-07-01", "by_eg": { "EG_II": 36.51, "EG_IV": 41.36 } },
                { "valid_from": "2025-04-01", "by_eg": { "EG_II": 38.03 } }
            ]
        })))
    }

    #[test]
    fn test_lookup_exact_version() {
        let lookup = lookup_on_call_rate(&rate_index(), Some(version(2025, 4, 1)), PayGrade::EgII, 3);

        assert_eq!(lookup.rate, dec("38.03"));
        assert_eq!(lookup.source, Some(version(2025, 4, 1)));
        assert!(lookup.warnings.is_empty());
        assert_eq!(lookup.audit_step.output["source_version"], "2025-04-01");
    }

    #[test]
    fn test_lookup_falls_back_to_earlier_version() {
        let lookup = lookup_on_call_rate(&rate_index(), Some(version(2025, 4, 1)), PayGrade::EgIV, 3);

        assert_eq!(lookup.rate, dec("41.36"));
        assert_eq!(lookup.source, Some(version(2024, 7, 1)));
        assert_eq!(lookup.warnings[0].code, "ON_CALL_RATE_FALLBACK");
    }

    #[test]
    fn test_lookup_missing_rate_is_zero() {
        let lookup = lookup_on_call_rate(&rate_index(), Some(version(2025, 4, 1)), PayGrade::EgI, 3);

        assert_eq!(lookup.rate, Decimal::ZERO);
        assert_eq!(lookup.source, None);
        assert_eq!(lookup.warnings[0].code, "ON_CALL_RATE_MISSING");
    }

    #[test]
    fn test_lookup_without_version() {
        let lookup = lookup_on_call_rate(&rate_index(), None, PayGrade::EgII, 3);
        assert_eq!(lookup.rate, Decimal::ZERO);
        assert!(lookup.warnings.is_empty());
    }
}
