//! Date utilities
//!
//! Dates cross the wire as ISO-8601 strings. Parsing is lenient: full
//! timestamps are truncated to their date portion and blank strings count as
//! absent. All comparisons happen at day granularity on [`NaiveDate`].

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Parse `YYYY-MM-DD`, truncating any time portion (`T...` or ` ...`).
///
/// Returns `None` for blank or malformed input.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Zero the time of day of an injected "now"
pub fn as_of<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

/// Resolve the date an entity is actually measured against.
///
/// The revised date wins only when the override was approved and a revised
/// date exists; otherwise the original date applies.
pub fn effective_end_date(
    original: Option<NaiveDate>,
    revised: Option<NaiveDate>,
    approved: bool,
) -> Option<NaiveDate> {
    match revised {
        Some(revised) if approved => Some(revised),
        _ => original,
    }
}

/// Inclusive range of calendar days
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range with open sides: a missing start or end admits every date on
    /// that side.
    pub fn bounded(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self::new(start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX))
    }

    /// `date` is not before the range start
    pub fn admits_start(&self, date: NaiveDate) -> bool {
        date >= self.start
    }

    /// `date` is not after the range end
    pub fn admits_end(&self, date: NaiveDate) -> bool {
        date <= self.end
    }

    /// True when this range lies entirely inside `parent` (shared edges allowed)
    pub fn is_within(&self, parent: &DateRange) -> bool {
        parent.admits_start(self.start) && parent.admits_end(self.end)
    }

    /// True when the ranges share at least one day
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// End strictly after start
    pub fn is_ordered(&self) -> bool {
        self.end > self.start
    }
}

/// Serde adapter for ISO-8601 dates that tolerates timestamps
pub mod iso_date {
    use super::parse_iso_date;
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date: {raw:?}")))
    }

    /// Optional variant: `null`, missing and `""` all map to `None`
    pub mod option {
        use super::{parse_iso_date, FORMAT};
        use chrono::NaiveDate;
        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.collect_str(&date.format(FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse_iso_date(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date: {raw:?}"))),
            }
        }
    }
}
