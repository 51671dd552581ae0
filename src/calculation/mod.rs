//! Calculation logic for the tariff engine.
//!
//! This module contains version resolution, the base table salary lookup,
//! on-call duty pay with night, holiday and threshold surcharges, standby
//! pay by time slot, the statutory supplements, and the aggregation of all
//! components into a [`CalculationResult`](crate::models::CalculationResult).

mod aggregate;
mod base_salary;
mod on_call_duty;
mod standby;
mod supplements;
mod version;

pub use aggregate::evaluate;
pub use base_salary::{
    BaseSalaryResult, MONTHS_PER_YEAR, WEEKS_PER_YEAR, base_monthly, calculate_base_salary,
    clamp_step, hourly_from_monthly,
};
pub use on_call_duty::{
    HOLIDAY_SURCHARGE_RATE, NIGHT_SURCHARGE_RATE, OnCallDutyResult, OnCallRateLookup,
    THRESHOLD_HOURS, THRESHOLD_SURCHARGE_RATE, calculate_on_call_duty, lookup_on_call_rate,
};
pub use standby::{StandbyResult, calculate_standby};
pub use supplements::{
    HOLIDAY_NO_COMP_RATE, HOLIDAY_WITH_COMP_RATE, REFERENCE_STEP, ReferenceHourly, SUNDAY_RATE,
    SupplementResult, calculate_supplements, reference_hourly,
};
pub use version::{REFERENCE_DAY, VersionResolution, reference_date, resolve, resolve_version};
