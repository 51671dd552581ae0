//! Standby (Rufbereitschaft) pay calculation.
//!
//! Standby hours are converted into equivalent working hours using a factor
//! percentage per time slot and seniority level, then paid at the person's
//! own hourly rate. A tax-free share is reported per slot but never added to
//! the pay total.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::TariffIndex;
use crate::models::{
    AuditStep, AuditWarning, SeniorityLevel, SlotKey, StandbyBreakdown, StandbySlotLine,
};
use crate::numeric::clamp_quantity;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The result of a standby pay calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct StandbyResult {
    /// The itemized standby pay.
    pub breakdown: StandbyBreakdown,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Warnings raised during the calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Calculates standby pay for all slots with non-zero hours.
///
/// Per slot:
///
/// - `equivalent_hours = hours × factor_pct / 100` (factor 0 if not configured)
/// - `euro = equivalent_hours × hourly_rate`
/// - `tax_free_euro = euro × tax_free_pct / 100`
///
/// `euro_total` feeds the grand total; `tax_free_total` is informational.
///
/// # Examples
///
/// ```
/// use tariff_engine::calculation::calculate_standby;
/// use tariff_engine::config::{TariffDataset, TariffIndex};
/// use tariff_engine::models::{SeniorityLevel, SlotKey};
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let index = TariffIndex::build(&TariffDataset::new(serde_json::json!({
///     "rb_factors": { "sunday": { "I": 25, "II": 30, "III": 35 } },
///     "rb_taxfree": { "sunday": 50 }
/// })));
/// let hours = BTreeMap::from([(SlotKey::Sunday, Decimal::from(8))]);
///
/// let result = calculate_standby(&index, &hours, SeniorityLevel::I, Decimal::from(40), 5);
/// // 8 h × 25% = 2 h; 2 h × 40 = 80; 50% tax-free = 40
/// assert_eq!(result.breakdown.euro_total, Decimal::from(80));
/// assert_eq!(result.breakdown.tax_free_total, Decimal::from(40));
/// ```
pub fn calculate_standby(
    index: &TariffIndex,
    hours_by_slot: &BTreeMap<SlotKey, Decimal>,
    level: SeniorityLevel,
    hourly_rate: Decimal,
    step_number: u32,
) -> StandbyResult {
    let hourly_rate = clamp_quantity(hourly_rate);
    let mut warnings = Vec::new();
    let mut slots = Vec::new();

    for (&slot, &raw_hours) in hours_by_slot {
        let hours = clamp_quantity(raw_hours);
        if hours.is_zero() {
            continue;
        }

        let factor_pct = match index.slot_factor(slot, level) {
            Some(pct) => pct,
            None => {
                warnings.push(AuditWarning::new(
                    "STANDBY_FACTOR_MISSING",
                    format!(
                        "No standby factor for slot {} at level {}; {} h count as 0",
                        slot,
                        level,
                        hours.normalize()
                    ),
                    "medium",
                ));
                Decimal::ZERO
            }
        };
        let tax_free_pct = index.tax_free_pct(slot);

        let equivalent_hours = hours * factor_pct / HUNDRED;
        let euro = equivalent_hours * hourly_rate;
        let tax_free_euro = euro * tax_free_pct / HUNDRED;

        slots.push(StandbySlotLine {
            slot,
            hours,
            factor_pct,
            equivalent_hours,
            euro,
            tax_free_pct,
            tax_free_euro,
        });
    }

    let equivalent_hours: Decimal = slots.iter().map(|line| line.equivalent_hours).sum();
    let euro_total: Decimal = slots.iter().map(|line| line.euro).sum();
    let tax_free_total: Decimal = slots.iter().map(|line| line.tax_free_euro).sum();

    let slot_summary: Vec<String> = slots
        .iter()
        .map(|line| {
            format!(
                "{}: {} h × {}% = {} h",
                line.slot,
                line.hours.normalize(),
                line.factor_pct.normalize(),
                line.equivalent_hours.normalize()
            )
        })
        .collect();

    let reasoning = if slots.is_empty() {
        "No standby hours".to_string()
    } else {
        format!(
            "Level {}: {}; {} equivalent h × {} = {} (tax-free share {}, not added)",
            level,
            slot_summary.join(", "),
            equivalent_hours.normalize(),
            hourly_rate.normalize(),
            euro_total.normalize(),
            tax_free_total.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "standby".to_string(),
        rule_name: "Standby Pay".to_string(),
        input: serde_json::json!({
            "level": level.key(),
            "hourly_rate": hourly_rate.normalize().to_string(),
            "hours_by_slot": slots
                .iter()
                .map(|line| (line.slot.key().to_string(), line.hours.normalize().to_string()))
                .collect::<BTreeMap<_, _>>()
        }),
        output: serde_json::json!({
            "equivalent_hours": equivalent_hours.normalize().to_string(),
            "euro_total": euro_total.normalize().to_string(),
            "tax_free_total": tax_free_total.normalize().to_string()
        }),
        reasoning,
    };

    StandbyResult {
        breakdown: StandbyBreakdown {
            level,
            hourly_rate,
            slots,
            equivalent_hours,
            euro_total,
            tax_free_total,
        },
        audit_step,
        warnings,
    }
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

    fn sample_index() -> TariffIndex {
        TariffIndex::build(&TariffDataset::new(json!({
            "rb_factors": {
                "weekday_day": { "I": 0, "II": 0, "III": 0 },
                "weekday_night": { "I": 12.5, "II": 15, "III": 20 },
                "sunday": { "I": 25, "II": 30, "III": 35 },
                "holiday": { "I": 50, "II": 55, "III": 60 }
            },
            "rb_taxfree": { "weekday_night": 25, "sunday": 50, "holiday": 125 }
        })))
    }

    fn hours(entries: &[(SlotKey, &str)]) -> BTreeMap<SlotKey, Decimal> {
        entries.iter().map(|(slot, h)| (*slot, dec(h))).collect()
    }

    #[test]
    fn test_single_slot_equivalent_hours_and_pay() {
        let index = sample_index();
        let result = calculate_standby(
            &index,
            &hours(&[(SlotKey::WeekdayNight, "12")]),
            SeniorityLevel::I,
            dec("40"),
            5,
        );

        let line = &result.breakdown.slots[0];
        assert_eq!(line.factor_pct, dec("12.5"));
        assert_eq!(line.equivalent_hours, dec("1.5"));
        assert_eq!(line.euro, dec("60"));
        assert_eq!(line.tax_free_euro, dec("15"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_level_selects_factor_column() {
        let index = sample_index();
        let slots = hours(&[(SlotKey::Sunday, "10")]);

        let level_one = calculate_standby(&index, &slots, SeniorityLevel::I, dec("40"), 5);
        let level_three = calculate_standby(&index, &slots, SeniorityLevel::III, dec("40"), 5);

        assert_eq!(level_one.breakdown.equivalent_hours, dec("2.5"));
        assert_eq!(level_three.breakdown.equivalent_hours, dec("3.5"));
    }

    #[test]
    fn test_multiple_slots_are_summed_in_slot_order() {
        let index = sample_index();
        let result = calculate_standby(
            &index,
            &hours(&[(SlotKey::Holiday, "4"), (SlotKey::WeekdayNight, "8")]),
            SeniorityLevel::II,
            dec("50"),
            5,
        );

        let b = &result.breakdown;
        assert_eq!(b.slots[0].slot, SlotKey::WeekdayNight);
        assert_eq!(b.slots[1].slot, SlotKey::Holiday);
        // 8 × 15% = 1.2 h; 4 × 55% = 2.2 h
        assert_eq!(b.equivalent_hours, dec("3.4"));
        assert_eq!(b.euro_total, dec("170"));
        // 60 × 25% + 110 × 125%
        assert_eq!(b.tax_free_total, dec("152.5"));
    }

    #[test]
    fn test_zero_factor_yields_zero_equivalent_hours() {
        let index = sample_index();
        let result = calculate_standby(
            &index,
            &hours(&[(SlotKey::WeekdayDay, "100")]),
            SeniorityLevel::III,
            dec("40"),
            5,
        );

        assert_eq!(result.breakdown.equivalent_hours, Decimal::ZERO);
        assert_eq!(result.breakdown.euro_total, Decimal::ZERO);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_factor_warns_and_counts_zero() {
        let index = sample_index();
        let result = calculate_standby(
            &index,
            &hours(&[(SlotKey::Saturday, "6")]),
            SeniorityLevel::I,
            dec("40"),
            5,
        );

        assert_eq!(result.breakdown.euro_total, Decimal::ZERO);
        assert_eq!(result.warnings[0].code, "STANDBY_FACTOR_MISSING");
    }

    #[test]
    fn test_zero_and_negative_hours_are_skipped() {
        let index = sample_index();
        let result = calculate_standby(
            &index,
            &hours(&[(SlotKey::Sunday, "0"), (SlotKey::Holiday, "-3")]),
            SeniorityLevel::I,
            dec("40"),
            5,
        );

        assert!(result.breakdown.slots.is_empty());
        assert_eq!(result.audit_step.reasoning, "No standby hours");
    }

    #[test]
    fn test_audit_step_lists_slot_hours() {
        let index = sample_index();
        let result = calculate_standby(
            &index,
            &hours(&[(SlotKey::Sunday, "8")]),
            SeniorityLevel::I,
            dec("40"),
            5,
        );

        assert_eq!(result.audit_step.rule_id, "standby");
        assert_eq!(result.audit_step.input["hours_by_slot"]["sunday"], "8");
        assert_eq!(result.audit_step.output["euro_total"], "80");
    }
}
