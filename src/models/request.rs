//! Calculation request model.
//!
//! A request describes one person in one month: grade, step, and the hours
//! worked in each pay-relevant category. Every hour field is parsed
//! tolerantly and clamped to `>= 0` on deserialization.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::{lenient_integer, non_negative_decimal, non_negative_map};

use super::{PayGrade, SeniorityLevel, SlotKey};

/// On-call duty (Bereitschaftsdienst) hours for the month.
///
/// `night` and `holiday` are subsets of `total`; the calculator clamps them
/// so that `night + holiday <= total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCallHours {
    /// All on-call duty hours in the month.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub total: Decimal,
    /// The share of `total` worked at night.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub night: Decimal,
    /// The share of `total` worked on public holidays.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub holiday: Decimal,
}

/// Inputs for the statutory supplements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementInputs {
    /// Whether the person works permanent rotating shifts (Wechselschicht).
    #[serde(default)]
    pub permanent_shift: bool,
    /// Night hours worked inside a rotating-shift schedule.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub night_shift_hours: Decimal,
    /// Hours worked on Sundays.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub sunday_hours: Decimal,
    /// Holiday hours without compensatory time off.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub holiday_hours_no_comp: Decimal,
    /// Holiday hours with compensatory time off.
    #[serde(default, deserialize_with = "non_negative_decimal")]
    pub holiday_hours_with_comp: Decimal,
}

/// A request to compute one month of gross pay.
///
/// # Example
///
/// ```
/// use tariff_engine::models::{CalculationRequest, PayGrade};
///
/// let json = r#"{
///     "year": 2025,
///     "month": 6,
///     "pay_grade": "EG II",
///     "step": "3",
///     "on_call_hours": { "total": "100", "night": "10", "holiday": "5" },
///     "standby_hours": { "weekday_night": "12,5" }
/// }"#;
///
/// let request: CalculationRequest = serde_json::from_str(json).unwrap();
/// assert_eq!(request.pay_grade, PayGrade::EgII);
/// assert_eq!(request.step, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The calendar year of the month being paid.
    pub year: i32,
    /// The calendar month (1-12); out-of-range values are clamped.
    pub month: u32,
    /// The person's pay grade.
    pub pay_grade: PayGrade,
    /// The 1-based seniority step within the grade; clamped into the table.
    #[serde(deserialize_with = "lenient_integer")]
    pub step: i64,
    /// On-call duty hours.
    #[serde(default)]
    pub on_call_hours: OnCallHours,
    /// The factor column used for standby slots.
    #[serde(default)]
    pub standby_level: SeniorityLevel,
    /// Standby hours by time slot.
    #[serde(default, deserialize_with = "non_negative_map")]
    pub standby_hours: BTreeMap<SlotKey, Decimal>,
    /// Statutory supplement inputs.
    #[serde(default)]
    pub supplements: SupplementInputs,
}

impl CalculationRequest {
    /// Creates a request with no on-call, standby or supplement hours.
    pub fn new(year: i32, month: u32, pay_grade: PayGrade, step: i64) -> Self {
        Self {
            year,
            month,
            pay_grade,
            step,
            on_call_hours: OnCallHours::default(),
            standby_level: SeniorityLevel::default(),
            standby_hours: BTreeMap::new(),
            supplements: SupplementInputs::default(),
        }
    }
}
