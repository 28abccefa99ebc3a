//! Delay / on-track classification
//!
//! An entity is delayed once its effective schedule date has been reached.
//! The effective date is the approved revised date when there is one, else
//! the original date (see [`effective_end_date`]). Comparison is per calendar
//! day; "today" is always injected by the caller.
//!
//! Two behaviours are policy rather than fixed rule:
//!
//! - [`DelayBoundary`]: whether a date equal to today already counts as
//!   delayed (`Inclusive`, the default) or only dates strictly in the past
//!   (`Strict`).
//! - `legacy_duration_fallback`: records with no resolvable date are treated
//!   as delayed when `durationInMonths > 0`. The result is tagged
//!   [`DelayBasis::LegacyDuration`] so callers can flag it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{effective_end_date, parse_iso_date};
use crate::status::ScheduleIndicator;
use crate::{Activity, Milestone, RevisionApproval};

/// Sentinel returned when no delay duration applies
pub const NOT_APPLICABLE: &str = "N/A";

const DAYS_PER_MONTH: f64 = 30.44;
const DAYS_PER_YEAR: f64 = 365.25;

/// Anything with a schedule date that can fall behind
pub trait Scheduled {
    /// Originally scheduled completion date
    fn scheduled_date(&self) -> Option<NaiveDate>;

    /// Revised completion date, if one was requested
    fn revised_date(&self) -> Option<NaiveDate> {
        None
    }

    /// Whether the revised date has been approved
    fn revision_approved(&self) -> bool {
        false
    }

    /// Legacy duration signal from records that predate schedule dates
    fn duration_in_months(&self) -> Option<f64> {
        None
    }

    /// The date delay is measured against
    fn effective_date(&self) -> Option<NaiveDate> {
        effective_end_date(
            self.scheduled_date(),
            self.revised_date(),
            self.revision_approved(),
        )
    }
}

impl Scheduled for Milestone {
    fn scheduled_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    fn revised_date(&self) -> Option<NaiveDate> {
        self.revised_end_date
    }

    fn revision_approved(&self) -> bool {
        self.revision_approval.is_some_and(RevisionApproval::is_approved)
    }
}

impl Scheduled for Activity {
    fn scheduled_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    fn revised_date(&self) -> Option<NaiveDate> {
        self.revised_end_date
    }

    fn revision_approved(&self) -> bool {
        self.revision_approval.is_some_and(RevisionApproval::is_approved)
    }
}

/// A raw schedule record as list views receive it: dates are unparsed strings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    #[serde(default)]
    pub schedule_date: Option<String>,
    #[serde(default)]
    pub revised_date: Option<String>,
    #[serde(default)]
    pub override_approval: Option<String>,
    #[serde(default)]
    pub duration_in_months: Option<f64>,
}

impl ScheduleRecord {
    /// Record with only an original schedule date
    pub fn scheduled(date: impl Into<String>) -> Self {
        Self {
            schedule_date: Some(date.into()),
            ..Self::default()
        }
    }

    /// Set a revised date and approval flag
    pub fn revised(mut self, date: impl Into<String>, approval: impl Into<String>) -> Self {
        self.revised_date = Some(date.into());
        self.override_approval = Some(approval.into());
        self
    }

    /// Set the legacy duration signal
    pub fn duration_in_months(mut self, months: f64) -> Self {
        self.duration_in_months = Some(months);
        self
    }
}

impl Scheduled for ScheduleRecord {
    fn scheduled_date(&self) -> Option<NaiveDate> {
        self.schedule_date.as_deref().and_then(parse_iso_date)
    }

    fn revised_date(&self) -> Option<NaiveDate> {
        self.revised_date.as_deref().and_then(parse_iso_date)
    }

    fn revision_approved(&self) -> bool {
        self.override_approval
            .as_deref()
            .is_some_and(|raw| RevisionApproval::parse(raw).is_approved())
    }

    fn duration_in_months(&self) -> Option<f64> {
        self.duration_in_months
    }
}

/// How a date equal to today is classified
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayBoundary {
    /// `effective <= today` is delayed
    #[default]
    Inclusive,
    /// `effective < today` is delayed
    Strict,
}

impl DelayBoundary {
    fn reached(self, effective: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DelayBoundary::Inclusive => effective <= today,
            DelayBoundary::Strict => effective < today,
        }
    }
}

/// What a classification was based on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "date")]
pub enum DelayBasis {
    /// Compared against this effective date
    ScheduleDate(NaiveDate),
    /// No date; the legacy duration heuristic decided
    LegacyDuration,
    /// No date and no usable fallback
    Unresolved,
}

/// Result of classifying one entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub delayed: bool,
    pub basis: DelayBasis,
}

impl Classification {
    pub fn indicator(&self) -> ScheduleIndicator {
        ScheduleIndicator::from_delayed(self.delayed)
    }
}

/// Delay classification rules
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayPolicy {
    pub boundary: DelayBoundary,
    pub legacy_duration_fallback: bool,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            boundary: DelayBoundary::Inclusive,
            legacy_duration_fallback: true,
        }
    }
}

impl DelayPolicy {
    /// Policy with a strict `<` boundary
    pub fn strict() -> Self {
        Self {
            boundary: DelayBoundary::Strict,
            ..Self::default()
        }
    }

    /// Disable the legacy duration fallback
    pub fn without_legacy_fallback(mut self) -> Self {
        self.legacy_duration_fallback = false;
        self
    }

    pub fn classify<E: Scheduled + ?Sized>(&self, entity: &E, today: NaiveDate) -> Classification {
        if let Some(effective) = entity.effective_date() {
            return Classification {
                delayed: self.boundary.reached(effective, today),
                basis: DelayBasis::ScheduleDate(effective),
            };
        }

        match entity.duration_in_months() {
            Some(months) if self.legacy_duration_fallback => Classification {
                delayed: months > 0.0,
                basis: DelayBasis::LegacyDuration,
            },
            _ => Classification {
                delayed: false,
                basis: DelayBasis::Unresolved,
            },
        }
    }

    pub fn is_delayed<E: Scheduled + ?Sized>(&self, entity: &E, today: NaiveDate) -> bool {
        self.classify(entity, today).delayed
    }

    /// Human-readable overrun: `"N months"` below a year, `"N.N yrs"` above.
    ///
    /// Returns [`NOT_APPLICABLE`] when the entity is not delayed or has no
    /// usable date.
    pub fn delay_duration<E: Scheduled + ?Sized>(&self, entity: &E, today: NaiveDate) -> String {
        match self.classify(entity, today) {
            Classification {
                delayed: true,
                basis: DelayBasis::ScheduleDate(effective),
            } => format_delay((today - effective).num_days()),
            _ => NOT_APPLICABLE.to_string(),
        }
    }
}

/// Format an overrun given in days
pub fn format_delay(days: i64) -> String {
    let days = days.max(0) as f64;
    let months = days / DAYS_PER_MONTH;
    if months < 12.0 {
        format!("{} months", months.round() as i64)
    } else {
        format!("{:.1} yrs", days / DAYS_PER_YEAR)
    }
}

/// Classify with the default policy
pub fn classify<E: Scheduled + ?Sized>(entity: &E, today: NaiveDate) -> Classification {
    DelayPolicy::default().classify(entity, today)
}

/// Whether `entity` is delayed as of `today` under the default policy
pub fn is_delayed<E: Scheduled + ?Sized>(entity: &E, today: NaiveDate) -> bool {
    DelayPolicy::default().is_delayed(entity, today)
}

/// Delay duration under the default policy
pub fn delay_duration<E: Scheduled + ?Sized>(entity: &E, today: NaiveDate) -> String {
    DelayPolicy::default().delay_duration(entity, today)
}
