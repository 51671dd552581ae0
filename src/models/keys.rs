//! Closed key types for pay grades, standby slots and seniority levels.
//!
//! Datasets and user input spell these keys inconsistently (`"EG II"`,
//! `"EG-II"`, `"eg_ii"`). Every spelling is normalized once, at the
//! boundary, into one of the variants below. Lookups inside the engine only
//! ever see the enums.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Error returned when a key cannot be normalized to a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// What kind of key was expected (e.g. "pay grade").
    pub kind: &'static str,
    /// The raw text that was rejected.
    pub raw: String,
}

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.raw)
    }
}

impl std::error::Error for UnknownKey {}

/// Collapses case and separator variants into one canonical spelling.
///
/// Letters are upper-cased; every run of `-`, `_`, whitespace or `.` becomes
/// a single `_`; leading and trailing separators are dropped.
///
/// ```
/// use tariff_engine::models::normalize_key;
///
/// assert_eq!(normalize_key(" eg - ii "), "EG_II");
/// assert_eq!(normalize_key("Weekday-Late  Evening"), "WEEKDAY_LATE_EVENING");
/// ```
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for c in raw.chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.extend(c.to_uppercase());
    }
    out
}

fn numeral(text: &str) -> Option<u8> {
    match text {
        "I" | "1" => Some(1),
        "II" | "2" => Some(2),
        "III" | "3" => Some(3),
        "IV" | "4" => Some(4),
        _ => None,
    }
}

macro_rules! string_keyed_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.key())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

/// A salary classification grade (Entgeltgruppe).
///
/// # Example
///
/// ```
/// use tariff_engine::models::PayGrade;
///
/// assert_eq!("EG II".parse::<PayGrade>().unwrap(), PayGrade::EgII);
/// assert_eq!("eg-ii".parse::<PayGrade>().unwrap(), PayGrade::EgII);
/// assert_eq!(PayGrade::EgII.key(), "EG_II");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PayGrade {
    /// Physician (Ärztin/Arzt).
    EgI,
    /// Specialist (Fachärztin/Facharzt).
    EgII,
    /// Senior physician (Oberärztin/Oberarzt).
    EgIII,
    /// Leading senior physician.
    EgIV,
}

impl PayGrade {
    /// All grades in ascending order.
    pub const ALL: [PayGrade; 4] = [PayGrade::EgI, PayGrade::EgII, PayGrade::EgIII, PayGrade::EgIV];

    /// The canonical key used in datasets and responses.
    pub fn key(self) -> &'static str {
        match self {
            PayGrade::EgI => "EG_I",
            PayGrade::EgII => "EG_II",
            PayGrade::EgIII => "EG_III",
            PayGrade::EgIV => "EG_IV",
        }
    }
}

impl FromStr for PayGrade {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_key(raw);
        let grade = normalized
            .strip_prefix("EG")
            .map(|rest| rest.trim_start_matches('_'))
            .and_then(numeral);

        match grade {
            Some(1) => Ok(PayGrade::EgI),
            Some(2) => Ok(PayGrade::EgII),
            Some(3) => Ok(PayGrade::EgIII),
            Some(4) => Ok(PayGrade::EgIV),
            _ => Err(UnknownKey {
                kind: "pay grade",
                raw: raw.to_string(),
            }),
        }
    }
}

string_keyed_serde!(PayGrade);

/// Seniority level selecting a column of the standby factor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SeniorityLevel {
    /// Level I.
    #[default]
    I,
    /// Level II.
    II,
    /// Level III.
    III,
}

impl SeniorityLevel {
    /// All levels in ascending order.
    pub const ALL: [SeniorityLevel; 3] = [SeniorityLevel::I, SeniorityLevel::II, SeniorityLevel::III];

    /// The canonical key (`"I"`, `"II"`, `"III"`).
    pub fn key(self) -> &'static str {
        match self {
            SeniorityLevel::I => "I",
            SeniorityLevel::II => "II",
            SeniorityLevel::III => "III",
        }
    }
}

impl FromStr for SeniorityLevel {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match numeral(&normalize_key(raw)) {
            Some(1) => Ok(SeniorityLevel::I),
            Some(2) => Ok(SeniorityLevel::II),
            Some(3) => Ok(SeniorityLevel::III),
            _ => Err(UnknownKey {
                kind: "seniority level",
                raw: raw.to_string(),
            }),
        }
    }
}

string_keyed_serde!(SeniorityLevel);

/// A time-of-week slot for standby (Rufbereitschaft) hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    /// Monday to Friday, daytime.
    WeekdayDay,
    /// Monday to Friday, early morning.
    WeekdayEarly,
    /// Monday to Friday, late evening.
    WeekdayLate,
    /// Monday to Friday, night.
    WeekdayNight,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
    /// Public holiday.
    Holiday,
}

impl SlotKey {
    /// All slots in display order.
    pub const ALL: [SlotKey; 7] = [
        SlotKey::WeekdayDay,
        SlotKey::WeekdayEarly,
        SlotKey::WeekdayLate,
        SlotKey::WeekdayNight,
        SlotKey::Saturday,
        SlotKey::Sunday,
        SlotKey::Holiday,
    ];

    /// The canonical key used in datasets and responses.
    pub fn key(self) -> &'static str {
        match self {
            SlotKey::WeekdayDay => "weekday_day",
            SlotKey::WeekdayEarly => "weekday_early",
            SlotKey::WeekdayLate => "weekday_late",
            SlotKey::WeekdayNight => "weekday_night",
            SlotKey::Saturday => "saturday",
            SlotKey::Sunday => "sunday",
            SlotKey::Holiday => "holiday",
        }
    }
}

impl FromStr for SlotKey {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_key(raw).as_str() {
            "WEEKDAY_DAY" => Ok(SlotKey::WeekdayDay),
            "WEEKDAY_EARLY" | "WEEKDAY_EARLY_MORNING" => Ok(SlotKey::WeekdayEarly),
            "WEEKDAY_LATE" | "WEEKDAY_LATE_EVENING" => Ok(SlotKey::WeekdayLate),
            "WEEKDAY_NIGHT" => Ok(SlotKey::WeekdayNight),
            "SATURDAY" => Ok(SlotKey::Saturday),
            "SUNDAY" => Ok(SlotKey::Sunday),
            "HOLIDAY" => Ok(SlotKey::Holiday),
            _ => Err(UnknownKey {
                kind: "standby slot",
                raw: raw.to_string(),
            }),
        }
    }
}

string_keyed_serde!(SlotKey);
