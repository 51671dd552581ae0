//! Core data models for the tariff engine.
//!
//! This module contains the typed keys, the request, and the itemized result
//! used throughout the engine.

mod calculation_result;
mod keys;
mod request;
mod version;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, OnCallBreakdown, StandbyBreakdown,
    StandbySlotLine, SupplementBreakdown, SupplementKind, SupplementLine,
};
pub use keys::{PayGrade, SeniorityLevel, SlotKey, UnknownKey, normalize_key};
pub use request::{CalculationRequest, OnCallHours, SupplementInputs};
pub use version::VersionId;
