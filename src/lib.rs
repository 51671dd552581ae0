//! Tariff-versioned compensation engine for hospital physicians.
//!
//! Given a dated tariff dataset and one person's month (pay grade, seniority
//! step, on-call duty hours, standby hours by slot, and supplement hours),
//! the engine produces an itemized gross pay breakdown with an audit trail.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tariff_engine::config::TariffDataset;
//! use tariff_engine::models::{CalculationRequest, PayGrade};
//!
//! let index = tariff_engine::build_index(&TariffDataset::new(json!({
//!     "weekly_hours": 40,
//!     "entgelttabellen": [
//!         { "valid_from": "2025-04-01", "table": { "EG II": [6910, 7489, 7992] } }
//!     ]
//! })));
//!
//! let request = CalculationRequest::new(2025, 6, PayGrade::EgII, 3);
//! let result = tariff_engine::evaluate(&index, &request);
//! assert_eq!(result.base_monthly.to_string(), "7992");
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod numeric;

pub use calculation::evaluate;

use config::{TariffDataset, TariffIndex};

/// Builds the lookup index for a dataset.
///
/// Malformed entries are skipped with a warning; an empty dataset yields an
/// empty index, for which every evaluation reports `NO_VERSIONS`.
pub fn build_index(dataset: &TariffDataset) -> TariffIndex {
    TariffIndex::build(dataset)
}
