//! # phasetree-core
//!
//! Core domain model for the phasetree schedule engine.
//!
//! This crate provides:
//! - Domain types: `ProjectPlan`, `Phase`, `Milestone`, `Activity`, `ProjectBounds`
//! - Date utilities: lenient ISO-8601 parsing, range containment, effective end dates
//! - Typed field paths and edits for the Phase → Milestone → Activity tree
//! - Status derivation and delay classification
//!
//! Everything here is pure: no I/O, no clock reads. Callers inject "today".
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use phasetree_core::{Activity, ActivityStatus, Milestone, Phase, PhaseName};
//!
//! let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
//!
//! let phase = Phase::new(PhaseName::DetailedDesign)
//!     .weight(40)
//!     .milestone(
//!         Milestone::new("Structural drawings", d(2, 1), d(4, 30))
//!             .weight(60)
//!             .activity(
//!                 Activity::new("Foundation plan", d(2, 1), d(3, 1))
//!                     .weight(50)
//!                     .status(ActivityStatus::Completed),
//!             )
//!             .activity(Activity::new("Roof plan", d(3, 1), d(4, 1)).weight(50)),
//!     );
//!
//! assert_eq!(phase.milestones[0].derived_status(), ActivityStatus::InProgress);
//! ```

pub mod dates;
pub mod delay;
pub mod edit;
pub mod path;
pub mod status;

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dates::{effective_end_date, parse_iso_date, DateRange};
pub use delay::{
    classify, delay_duration, is_delayed, Classification, DelayBasis, DelayBoundary, DelayPolicy,
    ScheduleRecord, Scheduled, NOT_APPLICABLE,
};
pub use edit::{ActivityEdit, MilestoneEdit, PhaseEdit};
pub use path::{ActivityField, FieldPath, MilestoneField, PhaseField};
pub use status::{
    derive_milestone_status, ActivityStatus, DelaySummary, PlanStatus, ScheduleIndicator,
    StatusBreakdown,
};

// ============================================================================
// Project
// ============================================================================

/// Date bounds of the owning project. All phases must fit inside them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct ProjectBounds {
    /// Project start (`createdDate` on the wire)
    #[serde(rename = "createdDate", with = "dates::iso_date")]
    pub start: NaiveDate,
    /// Project end (`endDate` on the wire)
    #[serde(rename = "endDate", with = "dates::iso_date")]
    pub end: NaiveDate,
}

impl ProjectBounds {
    /// Create project bounds. An end before the start is an integration bug
    /// in the caller, not a user error, so it is rejected here.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::InvertedBounds { start, end });
        }
        Ok(Self { start, end })
    }

    /// The bounds as a date range
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

#[derive(Deserialize)]
struct RawBounds {
    #[serde(rename = "createdDate", with = "dates::iso_date")]
    start: NaiveDate,
    #[serde(rename = "endDate", with = "dates::iso_date")]
    end: NaiveDate,
}

impl TryFrom<RawBounds> for ProjectBounds {
    type Error = ModelError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        ProjectBounds::new(raw.start, raw.end)
    }
}

/// The phase tree owned by a single project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    /// Project display name
    #[serde(default)]
    pub name: String,
    /// Project date bounds
    pub project: ProjectBounds,
    /// Phases in display order
    pub phases: Vec<Phase>,
}

impl ProjectPlan {
    pub fn new(name: impl Into<String>, project: ProjectBounds) -> Self {
        Self {
            name: name.into(),
            project,
            phases: Vec::new(),
        }
    }

    /// Add a phase
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Iterate over every milestone in the plan
    pub fn milestones(&self) -> impl Iterator<Item = &Milestone> {
        self.phases.iter().flat_map(|p| p.milestones.iter())
    }

    /// Iterate over every activity in the plan
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.milestones().flat_map(|m| m.activities.iter())
    }
}

// ============================================================================
// Phase
// ============================================================================

/// The fixed set of phase names a project may use
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseName {
    #[serde(rename = "Initiation")]
    Initiation,
    #[serde(rename = "Feasibility Study")]
    FeasibilityStudy,
    #[serde(rename = "Detailed Design")]
    DetailedDesign,
    #[serde(rename = "Procurement")]
    Procurement,
    #[serde(rename = "Construction")]
    Construction,
    #[serde(rename = "Testing & Commissioning")]
    TestingAndCommissioning,
    #[serde(rename = "Handover")]
    Handover,
    #[serde(rename = "Closure")]
    Closure,
}

impl PhaseName {
    pub const ALL: [PhaseName; 8] = [
        PhaseName::Initiation,
        PhaseName::FeasibilityStudy,
        PhaseName::DetailedDesign,
        PhaseName::Procurement,
        PhaseName::Construction,
        PhaseName::TestingAndCommissioning,
        PhaseName::Handover,
        PhaseName::Closure,
    ];

    /// Display label, also used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Initiation => "Initiation",
            PhaseName::FeasibilityStudy => "Feasibility Study",
            PhaseName::DetailedDesign => "Detailed Design",
            PhaseName::Procurement => "Procurement",
            PhaseName::Construction => "Construction",
            PhaseName::TestingAndCommissioning => "Testing & Commissioning",
            PhaseName::Handover => "Handover",
            PhaseName::Closure => "Closure",
        }
    }

    /// Upper snake case code (e.g. `DETAILED_DESIGN`)
    pub fn code(&self) -> &'static str {
        match self {
            PhaseName::Initiation => "INITIATION",
            PhaseName::FeasibilityStudy => "FEASIBILITY_STUDY",
            PhaseName::DetailedDesign => "DETAILED_DESIGN",
            PhaseName::Procurement => "PROCUREMENT",
            PhaseName::Construction => "CONSTRUCTION",
            PhaseName::TestingAndCommissioning => "TESTING_AND_COMMISSIONING",
            PhaseName::Handover => "HANDOVER",
            PhaseName::Closure => "CLOSURE",
        }
    }
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PhaseName {
    type Err = ModelError;

    /// Accepts the display label or the code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PhaseName::ALL
            .into_iter()
            .find(|name| {
                name.as_str().eq_ignore_ascii_case(needle) || name.code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ModelError::UnknownPhaseName(needle.to_string()))
    }
}

/// Top-level project stage with a share of total project effort
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Phase name; `None` while the form field is blank
    #[serde(default, with = "optional_phase_name")]
    pub name: Option<PhaseName>,
    /// Percentage weight (1-100); `None` while blank
    #[serde(default)]
    pub weight: Option<i64>,
    /// Milestones in array order
    pub milestones: Vec<Milestone>,
}

impl Phase {
    pub fn new(name: PhaseName) -> Self {
        Self {
            name: Some(name),
            weight: None,
            milestones: Vec::new(),
        }
    }

    /// Set the weight
    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Append a milestone, assigning it the next `order`
    pub fn milestone(mut self, mut milestone: Milestone) -> Self {
        milestone.order = self.milestones.len();
        self.milestones.push(milestone);
        self
    }

    /// Reassign `order` to match array position
    pub(crate) fn renumber(&mut self) {
        for (index, milestone) in self.milestones.iter_mut().enumerate() {
            milestone.order = index;
        }
    }
}

// ============================================================================
// Milestone
// ============================================================================

/// A dated sub-goal within a phase
///
/// A milestone's status is never stored; see [`Milestone::derived_status`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "dates::iso_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "dates::iso_date::option")]
    pub end_date: Option<NaiveDate>,
    /// Revised completion date requested after an overrun
    #[serde(default, with = "dates::iso_date::option")]
    pub revised_end_date: Option<NaiveDate>,
    /// Approval state of the revised end date
    #[serde(default, rename = "overrideApproval")]
    pub revision_approval: Option<RevisionApproval>,
    #[serde(default)]
    pub weight: Option<i64>,
    /// Zero-based display and persisted sequence
    #[serde(default)]
    pub order: usize,
    pub activities: Vec<Activity>,
}

impl Milestone {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date: Some(start),
            end_date: Some(end),
            revised_end_date: None,
            revision_approval: None,
            weight: None,
            order: 0,
            activities: Vec::new(),
        }
    }

    /// Set the weight
    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set a revised end date with its approval state
    pub fn revised_end(mut self, date: NaiveDate, approval: RevisionApproval) -> Self {
        self.revised_end_date = Some(date);
        self.revision_approval = Some(approval);
        self
    }

    /// Append an activity
    pub fn activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Status derived from child activities. Always recomputed.
    pub fn derived_status(&self) -> ActivityStatus {
        derive_milestone_status(self.activities.iter().map(|a| a.status))
    }

    /// Start/end as a range, when both are set
    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.start_date?, self.end_date?))
    }
}

// ============================================================================
// Activity
// ============================================================================

/// Leaf unit of work; the only level with a user-settable status
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "dates::iso_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "dates::iso_date::option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, with = "dates::iso_date::option")]
    pub revised_end_date: Option<NaiveDate>,
    #[serde(default, rename = "overrideApproval")]
    pub revision_approval: Option<RevisionApproval>,
    #[serde(default)]
    pub status: ActivityStatus,
}

impl Activity {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            weight: None,
            description: None,
            start_date: Some(start),
            end_date: Some(end),
            revised_end_date: None,
            revision_approval: None,
            status: ActivityStatus::NotStarted,
        }
    }

    /// Set the weight
    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    pub fn status(mut self, status: ActivityStatus) -> Self {
        self.status = status;
        self
    }

    /// Set a revised end date with its approval state
    pub fn revised_end(mut self, date: NaiveDate, approval: RevisionApproval) -> Self {
        self.revised_end_date = Some(date);
        self.revision_approval = Some(approval);
        self
    }

    /// Start/end as a range, when both are set
    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.start_date?, self.end_date?))
    }
}

// ============================================================================
// Revision approval
// ============================================================================

/// Approval state of a revised end date (`overrideApproval` on the wire)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RevisionApproval {
    Approved,
    Rejected,
    #[default]
    Pending,
}

impl RevisionApproval {
    /// Lenient parse: `YES`/`Y`/`APPROVED`/`TRUE` approve, `NO`/`N`/`REJECTED`/`FALSE`
    /// reject, anything else is pending.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "YES" | "Y" | "APPROVED" | "TRUE" => RevisionApproval::Approved,
            "NO" | "N" | "REJECTED" | "FALSE" => RevisionApproval::Rejected,
            _ => RevisionApproval::Pending,
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(self, RevisionApproval::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionApproval::Approved => "YES",
            RevisionApproval::Rejected => "NO",
            RevisionApproval::Pending => "PENDING",
        }
    }
}

impl From<String> for RevisionApproval {
    fn from(raw: String) -> Self {
        RevisionApproval::parse(&raw)
    }
}

impl From<RevisionApproval> for String {
    fn from(approval: RevisionApproval) -> Self {
        approval.as_str().to_string()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Integration errors: malformed input from the calling layer, never user data problems
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("project end date {end} is before start date {start}")]
    InvertedBounds { start: NaiveDate, end: NaiveDate },

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("unknown phase name: {0}")]
    UnknownPhaseName(String),
}

/// Blank phase names deserialize as `None`
mod optional_phase_name {
    use super::PhaseName;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(name: &Option<PhaseName>, serializer: S) -> Result<S::Ok, S::Error> {
        match name {
            Some(name) => name.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PhaseName>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn project_bounds_reject_inverted() {
        let err = ProjectBounds::new(date(2024, 12, 31), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ModelError::InvertedBounds { .. }));
        assert!(ProjectBounds::new(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn phase_builder_assigns_order() {
        let phase = Phase::new(PhaseName::Procurement)
            .weight(30)
            .milestone(Milestone::new("a", date(2024, 1, 1), date(2024, 2, 1)))
            .milestone(Milestone::new("b", date(2024, 2, 1), date(2024, 3, 1)));

        assert_eq!(phase.weight, Some(30));
        assert_eq!(phase.milestones[0].order, 0);
        assert_eq!(phase.milestones[1].order, 1);
    }

    #[test]
    fn phase_name_parses_label_and_code() {
        assert_eq!("Detailed Design".parse::<PhaseName>().unwrap(), PhaseName::DetailedDesign);
        assert_eq!("detailed_design".parse::<PhaseName>().unwrap(), PhaseName::DetailedDesign);
        assert_eq!(
            " Testing & Commissioning ".parse::<PhaseName>().unwrap(),
            PhaseName::TestingAndCommissioning
        );
        assert!(matches!(
            "Demolition".parse::<PhaseName>(),
            Err(ModelError::UnknownPhaseName(_))
        ));
    }

    #[test]
    fn revision_approval_parse() {
        assert_eq!(RevisionApproval::parse("YES"), RevisionApproval::Approved);
        assert_eq!(RevisionApproval::parse(" yes "), RevisionApproval::Approved);
        assert_eq!(RevisionApproval::parse("No"), RevisionApproval::Rejected);
        assert_eq!(RevisionApproval::parse(""), RevisionApproval::Pending);
        assert!(RevisionApproval::Approved.is_approved());
        assert!(!RevisionApproval::Pending.is_approved());
    }

    #[test]
    fn plan_deserializes_from_camel_case_json() {
        let json = r#"{
            "name": "Depot",
            "project": { "createdDate": "2024-01-01T08:30:00Z", "endDate": "2024-12-31" },
            "phases": [{
                "name": "Detailed Design",
                "weight": 40,
                "milestones": [{
                    "name": "Drawings",
                    "startDate": "2024-02-01",
                    "endDate": "2024-04-30",
                    "revisedEndDate": "",
                    "weight": 60,
                    "order": 0,
                    "activities": [{
                        "name": "Foundation plan",
                        "weight": 50,
                        "startDate": "2024-02-01",
                        "endDate": "2024-03-01",
                        "status": "IN_PROGRESS"
                    }]
                }]
            }]
        }"#;

        let plan: ProjectPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.project.start, date(2024, 1, 1));
        assert_eq!(plan.phases[0].name, Some(PhaseName::DetailedDesign));

        let milestone = &plan.phases[0].milestones[0];
        assert_eq!(milestone.revised_end_date, None);
        assert_eq!(milestone.activities[0].status, ActivityStatus::InProgress);
        assert_eq!(plan.activities().count(), 1);
    }

    #[test]
    fn blank_phase_name_is_none() {
        let phase: Phase = serde_json::from_str(r#"{"name": "", "milestones": []}"#).unwrap();
        assert_eq!(phase.name, None);
        assert_eq!(phase.weight, None);
    }

    #[test]
    fn missing_milestone_array_is_rejected() {
        let result = serde_json::from_str::<Phase>(r#"{"name": "Closure", "weight": 10}"#);
        assert!(result.is_err());
    }

    #[test]
    fn inverted_project_bounds_fail_deserialization() {
        let result = serde_json::from_str::<ProjectBounds>(
            r#"{"createdDate": "2024-12-31", "endDate": "2024-01-01"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn milestone_serializes_dates_as_iso() {
        let milestone = Milestone::new("m", date(2024, 2, 1), date(2024, 3, 1))
            .revised_end(date(2024, 3, 15), RevisionApproval::Approved);
        let value = serde_json::to_value(&milestone).unwrap();

        assert_eq!(value["startDate"], "2024-02-01");
        assert_eq!(value["revisedEndDate"], "2024-03-15");
        assert_eq!(value["overrideApproval"], "YES");
    }
}
