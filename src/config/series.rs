//! Date-versioned series.
//!
//! Every versioned piece of the tariff (wage tables, on-call rates, shift
//! allowance, night-shift rate) is a list of values keyed by the date they
//! took effect. Lookups follow one rule: the latest entry effective on or
//! before the reference date, or the earliest entry if the reference date
//! precedes them all.

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Resolves a reference date against ascending, de-duplicated dates.
///
/// Returns the position of the latest date `<= reference`, or `0` if the
/// reference precedes every date. Returns `None` only for an empty list.
/// Accepts anything that converts to a date, so the index's version list
/// resolves in place.
///
/// # Example
///
/// ```
/// use tariff_engine::config::resolve_position;
/// use chrono::NaiveDate;
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
/// let dates = [d(2024, 7, 1), d(2025, 4, 1)];
///
/// assert_eq!(resolve_position(&dates, d(2025, 6, 15)), Some(1));
/// assert_eq!(resolve_position(&dates, d(2024, 12, 15)), Some(0));
/// assert_eq!(resolve_position(&dates, d(2020, 1, 15)), Some(0));
/// assert_eq!(resolve_position::<NaiveDate>(&[], d(2025, 6, 15)), None);
/// ```
pub fn resolve_position<D>(dates: &[D], reference: NaiveDate) -> Option<usize>
where
    D: Copy + Into<NaiveDate>,
{
    if dates.is_empty() {
        return None;
    }
    let in_force = dates.partition_point(|&date| {
        let date: NaiveDate = date.into();
        date <= reference
    });
    Some(in_force.saturating_sub(1))
}

/// Values keyed by effective date, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedSeries<T> {
    dates: Vec<NaiveDate>,
    values: Vec<T>,
}

impl<T> Default for DatedSeries<T> {
    fn default() -> Self {
        Self {
            dates: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T> DatedSeries<T> {
    /// Builds a series from unordered entries. On duplicate dates the entry
    /// appearing last wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, T)>,
    {
        let by_date: BTreeMap<NaiveDate, T> = entries.into_iter().collect();
        let (dates, values) = by_date.into_iter().unzip();
        Self { dates, values }
    }

    /// The effective dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Returns true if the series has no entries.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Iterates over `(effective_date, value)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &T)> {
        self.dates.iter().copied().zip(self.values.iter())
    }

    /// The entry in force at `reference`, falling back to the earliest entry.
    pub fn resolve(&self, reference: NaiveDate) -> Option<(NaiveDate, &T)> {
        let position = resolve_position(&self.dates, reference)?;
        Some((self.dates[position], &self.values[position]))
    }

    /// The entry in force at `reference`, without the earliest-entry fallback.
    pub fn in_force(&self, reference: NaiveDate) -> Option<(NaiveDate, &T)> {
        self.resolve(reference)
            .filter(|(effective_date, _)| *effective_date <= reference)
    }

    /// The entry with exactly this effective date.
    pub fn exact(&self, date: NaiveDate) -> Option<&T> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|position| &self.values[position])
    }
}
