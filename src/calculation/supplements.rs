//! Statutory supplement calculation.
//!
//! Covers the flat monthly shift allowance, the hourly night rate inside a
//! rotating-shift schedule, and the Sunday and holiday percentage
//! supplements. The percentages are applied to the hourly rate at the
//! reference step of the pay grade, not the person's own step.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::TariffIndex;
use crate::models::{
    AuditStep, AuditWarning, PayGrade, SupplementBreakdown, SupplementInputs, SupplementKind,
    SupplementLine, VersionId,
};
use crate::numeric::clamp_quantity;

use super::base_salary::hourly_from_monthly;

/// The seniority step whose hourly rate the percentage supplements use.
pub const REFERENCE_STEP: usize = 3;

/// Sunday supplement (40%).
pub const SUNDAY_RATE: Decimal = Decimal::from_parts(40, 0, 0, false, 2);

/// Holiday supplement without compensatory time off (135%).
pub const HOLIDAY_NO_COMP_RATE: Decimal = Decimal::from_parts(135, 0, 0, false, 2);

/// Holiday supplement with compensatory time off (35%).
pub const HOLIDAY_WITH_COMP_RATE: Decimal = Decimal::from_parts(35, 0, 0, false, 2);

/// The hourly rate the percentage supplements are based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceHourly {
    /// The hourly rate.
    pub hourly: Decimal,
    /// True if the reference step had no salary and the person's own
    /// hourly rate was used instead.
    pub fell_back: bool,
}

/// The result of a supplement calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct SupplementResult {
    /// The itemized supplements.
    pub breakdown: SupplementBreakdown,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Warnings raised during the calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Returns the hourly rate at [`REFERENCE_STEP`] for a grade at a version.
///
/// Falls back to `own_hourly` only if the grade's row has no positive
/// salary at the reference step. A row shorter than the reference step is
/// not clamped to its last entry.
///
/// # Examples
///
/// ```
/// use tariff_engine::calculation::reference_hourly;
/// use tariff_engine::config::{TariffDataset, TariffIndex};
/// use tariff_engine::models::{PayGrade, VersionId};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let index = TariffIndex::build(&TariffDataset::new(serde_json::json!({
///     "weekly_hours": 40,
///     "entgelttabellen": [{ "valid_from": "2025-04-01", "table": { "EG_I": [5200, 5720, 6240] } }]
/// })));
/// let version = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
///
/// // 6240 × 12 / 2080 = 36
/// let reference = reference_hourly(&index, Some(version), PayGrade::EgI, Decimal::from(30));
/// assert_eq!(reference.hourly, Decimal::from(36));
/// assert!(!reference.fell_back);
/// ```
pub fn reference_hourly(
    index: &TariffIndex,
    version: Option<VersionId>,
    grade: PayGrade,
    own_hourly: Decimal,
) -> ReferenceHourly {
    let reference_monthly = version
        .and_then(|v| index.wage_row(v, grade))
        .and_then(|row| row.get(REFERENCE_STEP - 1))
        .copied()
        .filter(|monthly| *monthly > Decimal::ZERO);

    match reference_monthly {
        Some(monthly) => ReferenceHourly {
            hourly: hourly_from_monthly(monthly, index.weekly_hours()),
            fell_back: false,
        },
        None => ReferenceHourly {
            hourly: own_hourly,
            fell_back: true,
        },
    }
}

/// Calculates the statutory supplements for a month.
///
/// - shift allowance: the flat monthly amount in force at `reference_date`,
///   if `permanent_shift` is set
/// - night shift: `night_shift_hours × night rate in force at reference_date`
/// - Sunday: `sunday_hours × reference hourly × 40%`
/// - holiday without time off: `hours × reference hourly × 135%`
/// - holiday with time off: `hours × reference hourly × 35%`
///
/// `supplement_total` covers the last four; the shift allowance is reported
/// separately.
pub fn calculate_supplements(
    index: &TariffIndex,
    inputs: &SupplementInputs,
    reference_date: NaiveDate,
    reference: ReferenceHourly,
    step_number: u32,
) -> SupplementResult {
    let mut warnings = Vec::new();
    let mut lines = Vec::new();

    let night_shift_hours = clamp_quantity(inputs.night_shift_hours);
    let sunday_hours = clamp_quantity(inputs.sunday_hours);
    let holiday_no_comp_hours = clamp_quantity(inputs.holiday_hours_no_comp);
    let holiday_with_comp_hours = clamp_quantity(inputs.holiday_hours_with_comp);

    let shift_allowance = if inputs.permanent_shift {
        index
            .shift_allowance_at(reference_date)
            .map_or(Decimal::ZERO, |(_, amount)| amount)
    } else {
        Decimal::ZERO
    };
    if shift_allowance > Decimal::ZERO {
        lines.push(SupplementLine {
            kind: SupplementKind::ShiftAllowance,
            description: "Permanent rotating-shift allowance (monthly)".to_string(),
            units: Decimal::ONE,
            rate: shift_allowance,
            amount: shift_allowance,
        });
    }

    let night_rate = index
        .night_shift_rate_at(reference_date)
        .map_or(Decimal::ZERO, |(_, rate)| rate);
    let hourly = clamp_quantity(reference.hourly);

    let night_shift = push_hourly_line(
        &mut lines,
        SupplementKind::NightShift,
        "Night hours in rotating shifts",
        night_shift_hours,
        night_rate,
    );
    let sunday = push_hourly_line(
        &mut lines,
        SupplementKind::Sunday,
        "Sunday supplement (40%)",
        sunday_hours,
        hourly * SUNDAY_RATE,
    );
    let holiday_no_comp = push_hourly_line(
        &mut lines,
        SupplementKind::HolidayNoComp,
        "Holiday supplement without time off (135%)",
        holiday_no_comp_hours,
        hourly * HOLIDAY_NO_COMP_RATE,
    );
    let holiday_with_comp = push_hourly_line(
        &mut lines,
        SupplementKind::HolidayWithComp,
        "Holiday supplement with time off (35%)",
        holiday_with_comp_hours,
        hourly * HOLIDAY_WITH_COMP_RATE,
    );
    let supplement_total = night_shift + sunday + holiday_no_comp + holiday_with_comp;

    let percentage_hours = sunday_hours + holiday_no_comp_hours + holiday_with_comp_hours;
    if reference.fell_back && percentage_hours > Decimal::ZERO {
        warnings.push(AuditWarning::new(
            "REFERENCE_STEP_FALLBACK",
            format!(
                "No salary at step {}; Sunday and holiday supplements use the individual hourly rate {}",
                REFERENCE_STEP,
                hourly.normalize()
            ),
            "medium",
        ));
    }

    let reasoning = format!(
        "Reference hourly rate {} (step {}{}); shift allowance {}; night {} h × {} = {}; \
         Sunday {}; holiday {} + {}; supplement total {}",
        hourly.normalize(),
        REFERENCE_STEP,
        if reference.fell_back { ", fallback to own step" } else { "" },
        shift_allowance.normalize(),
        night_shift_hours.normalize(),
        night_rate.normalize(),
        night_shift.normalize(),
        sunday.normalize(),
        holiday_no_comp.normalize(),
        holiday_with_comp.normalize(),
        supplement_total.normalize()
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "statutory_supplements".to_string(),
        rule_name: "Statutory Supplements".to_string(),
        input: serde_json::json!({
            "reference_date": reference_date.to_string(),
            "reference_hourly": hourly.normalize().to_string(),
            "reference_fallback": reference.fell_back,
            "permanent_shift": inputs.permanent_shift,
            "night_shift_hours": night_shift_hours.normalize().to_string(),
            "sunday_hours": sunday_hours.normalize().to_string(),
            "holiday_hours_no_comp": holiday_no_comp_hours.normalize().to_string(),
            "holiday_hours_with_comp": holiday_with_comp_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "shift_allowance": shift_allowance.normalize().to_string(),
            "night_shift": night_shift.normalize().to_string(),
            "sunday": sunday.normalize().to_string(),
            "holiday_no_comp": holiday_no_comp.normalize().to_string(),
            "holiday_with_comp": holiday_with_comp.normalize().to_string(),
            "supplement_total": supplement_total.normalize().to_string()
        }),
        reasoning,
    };

    SupplementResult {
        breakdown: SupplementBreakdown {
            reference_hourly: hourly,
            lines,
            shift_allowance,
            night_shift,
            sunday,
            holiday_no_comp,
            holiday_with_comp,
            supplement_total,
        },
        audit_step,
        warnings,
    }
}

fn push_hourly_line(
    lines: &mut Vec<SupplementLine>,
    kind: SupplementKind,
    description: &str,
    hours: Decimal,
    rate: Decimal,
) -> Decimal {
    let amount = hours * rate;
    if !amount.is_zero() {
        lines.push(SupplementLine {
            kind,
            description: description.to_string(),
            units: hours,
            rate,
            amount,
        });
    }
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TariffDataset;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn version(y: i32, m: u32, day: u32) -> VersionId {
        VersionId::new(d(y, m, day))
    }

    fn sample_index() -> TariffIndex {
        TariffIndex::build(&TariffDataset::new(json!({
            "weekly_hours": 40,
            "entgelttabellen": [{
                "valid_from": "2025-04-01",
                "table": { "EG_I": [5200, 5720, 6240, 6760], "EG_IV": [10179, 10907] }
            }],
            "schichtzulage": [{ "valid_from": "2024-07-01", "eur_per_month": 105 }],
            "wechselschicht_nacht_eur_per_h": [
                { "valid_from": "2024-07-01", "eur_per_hour": 1.5 },
                { "valid_from": "2025-04-01", "eur_per_hour": 2 }
            ]
        })))
    }

    fn reference(hourly: &str) -> ReferenceHourly {
        ReferenceHourly {
            hourly: dec(hourly),
            fell_back: false,
        }
    }

    // ==========================================================================
    // Reference hourly rate
    // ==========================================================================

    #[test]
    fn test_reference_hourly_uses_step_three_regardless_of_own_step() {
        let index = sample_index();
        let result = reference_hourly(&index, Some(version(2025, 4, 1)), PayGrade::EgI, dec("39"));
        assert_eq!(result.hourly, dec("36"));
        assert!(!result.fell_back);
    }

    #[test]
    fn test_reference_hourly_falls_back_without_step_three() {
        let index = sample_index();
        let result = reference_hourly(&index, Some(version(2025, 4, 1)), PayGrade::EgIV, dec("62.9"));
        assert_eq!(result.hourly, dec("62.9"));
        assert!(result.fell_back);

        // Not the clamped last step of the two-step row
        let last_step = hourly_from_monthly(dec("10907"), dec("40"));
        assert_ne!(result.hourly, last_step);
    }

    #[test]
    fn test_reference_hourly_falls_back_on_zero_step_three() {
        let index = TariffIndex::build(&TariffDataset::new(json!({
            "weekly_hours": 40,
            "entgelttabellen": [{ "valid_from": "2025-04-01", "table": { "EG_I": [5200, 5720, 0] } }]
        })));
        let result = reference_hourly(&index, Some(version(2025, 4, 1)), PayGrade::EgI, dec("30"));
        assert_eq!(result.hourly, dec("30"));
        assert!(result.fell_back);
    }

    #[test]
    fn test_reference_hourly_falls_back_without_version() {
        let result = reference_hourly(&sample_index(), None, PayGrade::EgI, Decimal::ZERO);
        assert_eq!(result.hourly, Decimal::ZERO);
        assert!(result.fell_back);
    }

    // ==========================================================================
    // Supplements
    // ==========================================================================

    #[test]
    fn test_percentage_supplements() {
        let index = sample_index();
        let inputs = SupplementInputs {
            sunday_hours: dec("8"),
            holiday_hours_no_comp: dec("4"),
            holiday_hours_with_comp: dec("10"),
            ..SupplementInputs::default()
        };

        let result = calculate_supplements(&index, &inputs, d(2025, 6, 15), reference("36"), 6);
        let b = &result.breakdown;

        // 8 × 36 × 0.40
        assert_eq!(b.sunday, dec("115.2"));
        // 4 × 36 × 1.35
        assert_eq!(b.holiday_no_comp, dec("194.4"));
        // 10 × 36 × 0.35
        assert_eq!(b.holiday_with_comp, dec("126"));
        assert_eq!(b.supplement_total, dec("435.6"));
        assert_eq!(b.shift_allowance, Decimal::ZERO);
        assert_eq!(b.lines.len(), 3);
    }

    #[test]
    fn test_shift_allowance_only_for_permanent_shift() {
        let index = sample_index();
        let mut inputs = SupplementInputs::default();

        let without = calculate_supplements(&index, &inputs, d(2025, 6, 15), reference("36"), 6);
        assert_eq!(without.breakdown.shift_allowance, Decimal::ZERO);

        inputs.permanent_shift = true;
        let with = calculate_supplements(&index, &inputs, d(2025, 6, 15), reference("36"), 6);
        assert_eq!(with.breakdown.shift_allowance, dec("105"));
        assert_eq!(with.breakdown.lines[0].kind, SupplementKind::ShiftAllowance);
        assert_eq!(with.breakdown.supplement_total, Decimal::ZERO);
    }

    #[test]
    fn test_night_shift_rate_follows_dated_series() {
        let index = sample_index();
        let inputs = SupplementInputs {
            night_shift_hours: dec("20"),
            ..SupplementInputs::default()
        };

        let before = calculate_supplements(&index, &inputs, d(2025, 3, 15), reference("36"), 6);
        let after = calculate_supplements(&index, &inputs, d(2025, 4, 15), reference("36"), 6);
        let early = calculate_supplements(&index, &inputs, d(2020, 1, 15), reference("36"), 6);

        assert_eq!(before.breakdown.night_shift, dec("30"));
        assert_eq!(after.breakdown.night_shift, dec("40"));
        assert_eq!(early.breakdown.night_shift, dec("30"));
    }

    #[test]
    fn test_fallback_warning_only_with_percentage_hours() {
        let index = sample_index();
        let fallback = ReferenceHourly {
            hourly: dec("40"),
            fell_back: true,
        };

        let idle = calculate_supplements(&index, &SupplementInputs::default(), d(2025, 6, 15), fallback, 6);
        assert!(idle.warnings.is_empty());

        let inputs = SupplementInputs {
            sunday_hours: dec("1"),
            ..SupplementInputs::default()
        };
        let busy = calculate_supplements(&index, &inputs, d(2025, 6, 15), fallback, 6);
        assert_eq!(busy.breakdown.sunday, dec("16"));
        assert_eq!(busy.warnings[0].code, "REFERENCE_STEP_FALLBACK");
    }

    #[test]
    fn test_audit_step_records_supplements() {
        let index = sample_index();
        let inputs = SupplementInputs {
            permanent_shift: true,
            sunday_hours: dec("8"),
            ..SupplementInputs::default()
        };

        let result = calculate_supplements(&index, &inputs, d(2025, 6, 15), reference("36"), 6);
        assert_eq!(result.audit_step.rule_id, "statutory_supplements");
        assert_eq!(result.audit_step.output["shift_allowance"], "105");
        assert_eq!(result.audit_step.output["sunday"], "115.2");
        assert_eq!(result.audit_step.input["permanent_shift"], true);
    }
}
