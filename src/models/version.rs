//! Tariff version identifiers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifies a tariff version by the date it took effect (`valid_from`).
///
/// Versions order chronologically, so a sorted `Vec<VersionId>` is also the
/// legal succession of tariff versions.
///
/// # Example
///
/// ```
/// use tariff_engine::models::VersionId;
/// use chrono::NaiveDate;
///
/// let version = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
/// assert_eq!(version.to_string(), "2025-04-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(NaiveDate);

impl VersionId {
    /// Creates a version identifier from its effective date.
    pub fn new(effective_date: NaiveDate) -> Self {
        Self(effective_date)
    }

    /// The date from which this version applies.
    pub fn effective_date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for VersionId {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<VersionId> for NaiveDate {
    fn from(version: VersionId) -> Self {
        version.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_order_by_date() {
        let older = VersionId::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        let newer = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert!(older < newer);
    }

    #[test]
    fn test_version_serializes_as_iso_date() {
        let version = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"2025-04-01\"");
        let parsed: VersionId = serde_json::from_str("\"2025-04-01\"").unwrap();
        assert_eq!(parsed, version);
    }
}
