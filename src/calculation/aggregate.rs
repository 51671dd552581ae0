//! Compensation aggregation.
//!
//! [`evaluate`] runs every calculation step for a request and sums the
//! components into a single [`CalculationResult`].

use tracing::debug;

use crate::config::TariffIndex;
use crate::models::{AuditStep, AuditTrace, AuditWarning, CalculationRequest, CalculationResult};

use super::base_salary::calculate_base_salary;
use super::on_call_duty::{calculate_on_call_duty, lookup_on_call_rate};
use super::standby::calculate_standby;
use super::supplements::{calculate_supplements, reference_hourly};
use super::version::resolve_version;

/// Computes one month of gross pay.
///
/// Never fails: missing tariff data resolves to zero and is reported through
/// warnings in the audit trace. Steps are recorded in this order:
///
/// 1. Version resolution
/// 2. Base table salary
/// 3. On-call rate lookup
/// 4. On-call duty pay
/// 5. Standby pay
/// 6. Statutory supplements
/// 7. Aggregation
///
/// # Examples
///
/// ```
/// use tariff_engine::calculation::evaluate;
/// use tariff_engine::config::{TariffDataset, TariffIndex};
/// use tariff_engine::models::{CalculationRequest, PayGrade};
/// use tariff_engine::numeric::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let index = TariffIndex::build(&TariffDataset::new(serde_json::json!({
///     "weekly_hours": 40,
///     "entgelttabellen": [{
///         "valid_from": "2025-04-01",
///         "table": { "EG_II": [6910, 7489, 7992, 8300, 8587, 8887, 9174] }
///     }],
///     "bd_hourly": [{ "valid_from": "2025-04-01", "by_eg": { "EG_II": 38.03 } }]
/// })));
///
/// let request = CalculationRequest::new(2025, 6, PayGrade::EgII, 3);
/// let result = evaluate(&index, &request);
///
/// assert_eq!(result.base_monthly, Decimal::from(7992));
/// assert_eq!(round_money(result.base_hourly), Decimal::from_str("46.11").unwrap());
/// assert_eq!(result.grand_total, Decimal::from(7992));
/// ```
pub fn evaluate(index: &TariffIndex, request: &CalculationRequest) -> CalculationResult {
    let mut trace = AuditTrace::default();

    let resolution = resolve_version(index, request.year, request.month, trace.next_step_number());
    let version = resolution.version;
    record(&mut trace, resolution.audit_step, resolution.warnings);

    let base = calculate_base_salary(
        index,
        version,
        request.pay_grade,
        request.step,
        trace.next_step_number(),
    );
    let (base_monthly, base_hourly, step_used) = (base.monthly, base.hourly, base.step_used);
    record(&mut trace, base.audit_step, base.warnings);

    let rate = lookup_on_call_rate(index, version, request.pay_grade, trace.next_step_number());
    let (on_call_rate, rate_version) = (rate.rate, rate.source);
    record(&mut trace, rate.audit_step, rate.warnings);

    let on_call = calculate_on_call_duty(
        &request.on_call_hours,
        on_call_rate,
        rate_version,
        trace.next_step_number(),
    );
    let on_call_breakdown = on_call.breakdown;
    record(&mut trace, on_call.audit_step, on_call.warnings);

    let standby = calculate_standby(
        index,
        &request.standby_hours,
        request.standby_level,
        base_hourly,
        trace.next_step_number(),
    );
    let standby_breakdown = standby.breakdown;
    record(&mut trace, standby.audit_step, standby.warnings);

    let reference = reference_hourly(index, version, request.pay_grade, base_hourly);
    let supplements = calculate_supplements(
        index,
        &request.supplements,
        resolution.reference_date,
        reference,
        trace.next_step_number(),
    );
    let supplement_breakdown = supplements.breakdown;
    record(&mut trace, supplements.audit_step, supplements.warnings);

    let on_call_total = on_call_breakdown.total;
    let standby_euro_total = standby_breakdown.euro_total;
    let standby_tax_free_total = standby_breakdown.tax_free_total;
    let shift_allowance = supplement_breakdown.shift_allowance;
    let supplement_total = supplement_breakdown.supplement_total;
    let grand_total =
        base_monthly + on_call_total + standby_euro_total + shift_allowance + supplement_total;

    let aggregation = AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "aggregation".to_string(),
        rule_name: "Compensation Aggregation".to_string(),
        input: serde_json::json!({
            "base_monthly": base_monthly.normalize().to_string(),
            "on_call_total": on_call_total.normalize().to_string(),
            "standby_euro_total": standby_euro_total.normalize().to_string(),
            "shift_allowance": shift_allowance.normalize().to_string(),
            "supplement_total": supplement_total.normalize().to_string()
        }),
        output: serde_json::json!({
            "grand_total": grand_total.normalize().to_string(),
            "standby_tax_free_total": standby_tax_free_total.normalize().to_string()
        }),
        reasoning: format!(
            "{} + {} + {} + {} + {} = {} (tax-free standby share {} is informational and not added)",
            base_monthly.normalize(),
            on_call_total.normalize(),
            standby_euro_total.normalize(),
            shift_allowance.normalize(),
            supplement_total.normalize(),
            grand_total.normalize(),
            standby_tax_free_total.normalize()
        ),
    };
    trace.steps.push(aggregation);

    debug!(
        version = ?version.map(|v| v.to_string()),
        pay_grade = %request.pay_grade,
        step = ?step_used,
        grand_total = %grand_total.normalize(),
        warnings = trace.warnings.len(),
        "Evaluated monthly compensation"
    );

    CalculationResult {
        version,
        reference_date: Some(resolution.reference_date),
        pay_grade: request.pay_grade,
        step_used,
        base_monthly,
        base_hourly,
        on_call_total,
        standby_euro_total,
        standby_tax_free_total,
        shift_allowance,
        supplement_total,
        grand_total,
        on_call: on_call_breakdown,
        standby: standby_breakdown,
        supplements: supplement_breakdown,
        audit_trace: trace,
    }
}

fn record(trace: &mut AuditTrace, step: AuditStep, warnings: Vec<AuditWarning>) {
    trace.steps.push(step);
    trace.warnings.extend(warnings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TariffDataset;
    use crate::models::{PayGrade, SeniorityLevel, SlotKey};
    use crate::numeric::{MAX_PERCENTAGE, MAX_QUANTITY, round_money};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn reference_index() -> TariffIndex {
        TariffIndex::build(&TariffDataset::new(json!({
            "weekly_hours": 40,
            "entgelttabellen": [{
                "valid_from": "2025-04-01",
                "table": { "EG_II": [6910, 7489, 7992, 8300, 8587, 8887, 9174] }
            }],
            "bd_hourly": [{ "valid_from": "2025-04-01", "by_eg": { "EG_II": 38.03 } }],
            "rb_factors": { "sunday": { "I": 25, "II": 30, "III": 35 } },
            "rb_taxfree": { "sunday": 50 },
            "schichtzulage": [{ "valid_from": "2025-04-01", "eur_per_month": 105 }],
            "wechselschicht_nacht_eur_per_h": [{ "valid_from": "2025-04-01", "eur_per_hour": 2 }]
        })))
    }

    fn reference_request() -> CalculationRequest {
        let mut request = CalculationRequest::new(2025, 6, PayGrade::EgII, 3);
        request.on_call_hours.total = dec("100");
        request.on_call_hours.night = dec("10");
        request.on_call_hours.holiday = dec("5");
        request
    }

    // ==========================================================================
    // Reference scenario
    // ==========================================================================

    #[test]
    fn test_reference_scenario_base_and_on_call() {
        let result = evaluate(&reference_index(), &reference_request());

        assert_eq!(result.version.map(|v| v.to_string()), Some("2025-04-01".to_string()));
        assert_eq!(result.base_monthly, dec("7992"));
        assert_eq!(round_money(result.base_hourly), dec("46.11"));
        assert_eq!(result.on_call.base, dec("3803"));
        assert_eq!(result.on_call.night_surcharge, dec("57.045"));
        assert_eq!(result.on_call.holiday_surcharge, dec("47.5375"));
        assert_eq!(result.on_call.threshold_surcharge, dec("5.7045"));
        assert_eq!(round_money(result.on_call_total), dec("3913.29"));
        assert_eq!(result.grand_total, dec("11905.287"));
        assert_eq!(result.rounded_grand_total(), dec("11905.29"));
        assert!(result.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_audit_trace_records_every_step_in_order() {
        let result = evaluate(&reference_index(), &reference_request());
        let rule_ids: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|step| step.rule_id.as_str())
            .collect();

        assert_eq!(
            rule_ids,
            vec![
                "version_resolution",
                "base_salary",
                "on_call_rate_lookup",
                "on_call_duty",
                "standby",
                "statutory_supplements",
                "aggregation"
            ]
        );
        for (i, step) in result.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
    }

    // ==========================================================================
    // Totals
    // ==========================================================================

    #[test]
    fn test_grand_total_sums_components_but_not_tax_free() {
        let mut request = reference_request();
        request.standby_level = SeniorityLevel::I;
        request.standby_hours.insert(SlotKey::Sunday, dec("8"));
        request.supplements.permanent_shift = true;
        request.supplements.night_shift_hours = dec("10");
        request.supplements.sunday_hours = dec("8");

        let result = evaluate(&reference_index(), &request);

        assert!(result.standby_euro_total > Decimal::ZERO);
        assert!(result.standby_tax_free_total > Decimal::ZERO);
        assert_eq!(result.shift_allowance, dec("105"));
        assert_eq!(
            result.grand_total,
            result.base_monthly
                + result.on_call_total
                + result.standby_euro_total
                + result.shift_allowance
                + result.supplement_total
        );
        assert_eq!(
            result.supplement_total,
            result.supplements.night_shift
                + result.supplements.sunday
                + result.supplements.holiday_no_comp
                + result.supplements.holiday_with_comp
        );
    }

    #[test]
    fn test_standby_uses_individual_hourly_rate() {
        let mut request = CalculationRequest::new(2025, 6, PayGrade::EgII, 7);
        request.standby_hours.insert(SlotKey::Sunday, dec("8"));

        let result = evaluate(&reference_index(), &request);
        // 8 h × 25% = 2 equivalent hours at the step-7 hourly rate
        assert_eq!(result.standby.hourly_rate, result.base_hourly);
        assert_eq!(
            result.standby_euro_total.round_dp(10),
            (dec("2") * result.base_hourly).round_dp(10)
        );
    }

    #[test]
    fn test_supplements_use_step_three_rate_for_any_step() {
        let mut low = CalculationRequest::new(2025, 6, PayGrade::EgII, 1);
        low.supplements.sunday_hours = dec("8");
        let mut high = low.clone();
        high.step = 7;

        let index = reference_index();
        let low_result = evaluate(&index, &low);
        let high_result = evaluate(&index, &high);

        assert_eq!(low_result.supplements.sunday, high_result.supplements.sunday);
        assert_ne!(low_result.base_monthly, high_result.base_monthly);
    }

    // ==========================================================================
    // Degraded datasets
    // ==========================================================================

    #[test]
    fn test_empty_index_yields_zero_result() {
        let result = evaluate(&TariffIndex::default(), &reference_request());

        assert!(result.version.is_none());
        assert_eq!(result.grand_total, Decimal::ZERO);
        assert!(result.audit_trace.has_warning("NO_VERSIONS"));
        assert_eq!(result.audit_trace.steps.len(), 7);
    }

    #[test]
    fn test_unknown_grade_in_dataset_yields_zero_base_with_warning() {
        let request = CalculationRequest::new(2025, 6, PayGrade::EgIII, 1);
        let result = evaluate(&reference_index(), &request);

        assert_eq!(result.base_monthly, Decimal::ZERO);
        assert!(result.audit_trace.has_warning("PAY_GRADE_MISSING"));
        assert!(result.audit_trace.has_warning("ON_CALL_RATE_MISSING"));
    }

    // ==========================================================================
    // Extreme datasets
    // ==========================================================================

    fn extreme_index(weekly_hours: &str) -> TariffIndex {
        TariffIndex::build(&TariffDataset::new(json!({
            "weekly_hours": weekly_hours,
            "entgelttabellen": [{ "valid_from": "2025-04-01", "table": { "EG_II": [1e9] } }],
            "bd_hourly": [{ "valid_from": "2025-04-01", "by_eg": { "EG_II": 1e9 } }],
            "rb_factors": { "sunday": { "I": 1e9, "II": 1e9, "III": 1e9 } },
            "rb_taxfree": { "sunday": 1e9, "holiday": 1e9 },
            "schichtzulage": [{ "valid_from": "2025-04-01", "eur_per_month": 1e9 }],
            "wechselschicht_nacht_eur_per_h": [{ "valid_from": "2025-04-01", "eur_per_hour": 1e9 }]
        })))
    }

    fn extreme_request() -> CalculationRequest {
        let mut request = CalculationRequest::new(2025, 6, PayGrade::EgII, 1);
        request.on_call_hours.total = MAX_QUANTITY;
        request.on_call_hours.night = MAX_QUANTITY;
        request.standby_level = SeniorityLevel::I;
        request.standby_hours.insert(SlotKey::Sunday, MAX_QUANTITY);
        request.standby_hours.insert(SlotKey::Holiday, MAX_QUANTITY);
        request.supplements.permanent_shift = true;
        request.supplements.night_shift_hours = MAX_QUANTITY;
        request.supplements.sunday_hours = MAX_QUANTITY;
        request.supplements.holiday_hours_no_comp = MAX_QUANTITY;
        request.supplements.holiday_hours_with_comp = MAX_QUANTITY;
        request
    }

    #[test]
    fn test_huge_factors_and_hours_do_not_overflow() {
        let result = evaluate(&extreme_index("40"), &extreme_request());

        let sunday = result
            .standby
            .slots
            .iter()
            .find(|line| line.slot == SlotKey::Sunday)
            .unwrap();
        assert_eq!(sunday.factor_pct, MAX_PERCENTAGE);
        assert_eq!(sunday.tax_free_pct, MAX_PERCENTAGE);
        assert!(result.standby_tax_free_total > result.standby_euro_total);
        assert!(result.grand_total > Decimal::ZERO);
        assert_eq!(result.audit_trace.steps.len(), 7);
    }

    #[test]
    fn test_tiny_weekly_hours_cap_the_hourly_rate() {
        let result = evaluate(&extreme_index("0.000000000001"), &extreme_request());

        assert_eq!(result.base_hourly, MAX_QUANTITY);
        assert_eq!(result.standby.hourly_rate, MAX_QUANTITY);
        assert!(result.audit_trace.has_warning("HOURLY_RATE_CAPPED"));
        assert!(result.grand_total > Decimal::ZERO);
    }
}
