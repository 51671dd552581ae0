//! Calculation result models.
//!
//! This module contains the [`CalculationResult`] type and the itemized
//! breakdowns for each pay component, plus the audit trace that records how
//! each figure was derived.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::round_money;

use super::{PayGrade, SeniorityLevel, SlotKey, VersionId};

/// Itemized on-call duty (Bereitschaftsdienst) pay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCallBreakdown {
    /// Total on-call hours (after clamping to `>= 0`).
    pub hours: Decimal,
    /// Night hours, clamped into `[0, hours]`.
    pub night_hours: Decimal,
    /// Holiday hours, clamped into `[0, hours - night_hours]`.
    pub holiday_hours: Decimal,
    /// Hours beyond the monthly threshold.
    pub threshold_hours: Decimal,
    /// The hourly on-call rate applied.
    pub rate: Decimal,
    /// The tariff version the rate was taken from, if any.
    pub rate_version: Option<VersionId>,
    /// `hours × rate`.
    pub base: Decimal,
    /// `night_hours × rate × 15%`.
    pub night_surcharge: Decimal,
    /// `holiday_hours × rate × 25%`.
    pub holiday_surcharge: Decimal,
    /// `threshold_hours × rate × 5%`.
    pub threshold_surcharge: Decimal,
    /// Sum of the four terms above.
    pub total: Decimal,
}

/// Standby pay for a single time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandbySlotLine {
    /// The time slot.
    pub slot: SlotKey,
    /// Standby hours in this slot.
    pub hours: Decimal,
    /// The factor percentage for the slot and seniority level.
    pub factor_pct: Decimal,
    /// `hours × factor_pct / 100`.
    pub equivalent_hours: Decimal,
    /// `equivalent_hours × individual hourly rate`.
    pub euro: Decimal,
    /// The tax-free percentage for the slot.
    pub tax_free_pct: Decimal,
    /// `euro × tax_free_pct / 100`; informational only.
    pub tax_free_euro: Decimal,
}

/// Itemized standby (Rufbereitschaft) pay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandbyBreakdown {
    /// The factor column applied.
    pub level: SeniorityLevel,
    /// The individual hourly rate the equivalent hours are paid at.
    pub hourly_rate: Decimal,
    /// One line per slot with non-zero hours, in slot order.
    pub slots: Vec<StandbySlotLine>,
    /// Sum of equivalent hours across slots.
    pub equivalent_hours: Decimal,
    /// Sum of euro amounts; part of the grand total.
    pub euro_total: Decimal,
    /// Sum of tax-free amounts; NOT part of the grand total.
    pub tax_free_total: Decimal,
}

/// The kind of a statutory supplement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementKind {
    /// Flat monthly allowance for permanent rotating shifts.
    ShiftAllowance,
    /// Hourly rate for night hours inside a rotating-shift schedule.
    NightShift,
    /// Sunday percentage supplement.
    Sunday,
    /// Holiday supplement without compensatory time off.
    HolidayNoComp,
    /// Holiday supplement with compensatory time off.
    HolidayWithComp,
}

/// A single statutory supplement line.
///
/// # Example
///
/// ```
/// use tariff_engine::models::{SupplementKind, SupplementLine};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let line = SupplementLine {
///     kind: SupplementKind::Sunday,
///     description: "Sunday supplement (40%)".to_string(),
///     units: Decimal::from_str("8").unwrap(),
///     rate: Decimal::from_str("18.44").unwrap(),
///     amount: Decimal::from_str("147.52").unwrap(),
/// };
/// assert_eq!(line.units * line.rate, line.amount);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementLine {
    /// The kind of supplement.
    pub kind: SupplementKind,
    /// A human-readable description.
    pub description: String,
    /// Units paid (hours, or 1 for a flat monthly amount).
    pub units: Decimal,
    /// The rate per unit.
    pub rate: Decimal,
    /// `units × rate`.
    pub amount: Decimal,
}

/// Itemized statutory supplements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementBreakdown {
    /// The hourly rate at the reference step the percentages are based on.
    pub reference_hourly: Decimal,
    /// Lines with a non-zero amount.
    pub lines: Vec<SupplementLine>,
    /// Flat monthly shift allowance.
    pub shift_allowance: Decimal,
    /// Night hours in rotating shifts.
    pub night_shift: Decimal,
    /// Sunday supplement.
    pub sunday: Decimal,
    /// Holiday supplement without compensatory time off.
    pub holiday_no_comp: Decimal,
    /// Holiday supplement with compensatory time off.
    pub holiday_with_comp: Decimal,
    /// Night, Sunday and both holiday supplements (excludes the shift allowance).
    pub supplement_total: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings mark components that were zeroed, clamped or resolved through a
/// fallback because the dataset or request was incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium" or "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// The number the next recorded step will carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The complete result of one monthly pay calculation.
///
/// Amounts are unrounded. [`CalculationResult::rounded_grand_total`] rounds
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The tariff version in force for the requested month.
    pub version: Option<VersionId>,
    /// The day-15 reference date used to resolve versions.
    pub reference_date: Option<NaiveDate>,
    /// The pay grade calculated for.
    pub pay_grade: PayGrade,
    /// The 1-based step actually used after clamping, if the grade has a table.
    pub step_used: Option<usize>,
    /// Monthly table salary.
    pub base_monthly: Decimal,
    /// Individual hourly rate derived from `base_monthly`.
    pub base_hourly: Decimal,
    /// On-call duty pay total.
    pub on_call_total: Decimal,
    /// Standby pay total.
    pub standby_euro_total: Decimal,
    /// Tax-free share of standby pay; informational only.
    pub standby_tax_free_total: Decimal,
    /// Flat monthly shift allowance.
    pub shift_allowance: Decimal,
    /// Night-shift, Sunday and holiday supplements.
    pub supplement_total: Decimal,
    /// Gross monthly pay.
    pub grand_total: Decimal,
    /// On-call duty detail.
    pub on_call: OnCallBreakdown,
    /// Standby detail.
    pub standby: StandbyBreakdown,
    /// Supplement detail.
    pub supplements: SupplementBreakdown,
    /// How each figure was derived.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// The grand total rounded to cents.
    pub fn rounded_grand_total(&self) -> Decimal {
        round_money(self.grand_total)
    }
}
