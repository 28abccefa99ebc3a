//! Status derivation and plan dashboards
//!
//! Activities carry the only user-settable status. Milestone status is
//! derived from them on demand and is never stored.
//!
//! # Core Concepts
//!
//! - **ActivityStatus**: Not Started, In Progress, On Hold or Completed
//! - **ScheduleIndicator**: On Track or Delayed, the badge list views show
//! - **DelaySummary**: Total / On Track / Delayed bucket counts
//! - **PlanStatus**: Aggregated view of a whole plan as of a given day
//!
//! # Example
//!
//! ```rust
//! use phasetree_core::status::{derive_milestone_status, ActivityStatus};
//!
//! let status = derive_milestone_status([ActivityStatus::OnHold, ActivityStatus::Completed]);
//! assert_eq!(status, ActivityStatus::OnHold);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::delay::{DelayPolicy, Scheduled};
use crate::ProjectPlan;

// ============================================================================
// Core Types
// ============================================================================

/// Status of a unit of work
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    #[default]
    NotStarted,
    InProgress,
    OnHold,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::NotStarted => "Not Started",
            ActivityStatus::InProgress => "In Progress",
            ActivityStatus::OnHold => "On Hold",
            ActivityStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive a milestone's status from its activities.
///
/// First matching rule wins:
/// 1. no activities → Not Started
/// 2. all Completed → Completed
/// 3. all Not Started → Not Started
/// 4. any On Hold → On Hold
/// 5. otherwise → In Progress
pub fn derive_milestone_status<I>(statuses: I) -> ActivityStatus
where
    I: IntoIterator<Item = ActivityStatus>,
{
    let breakdown = StatusBreakdown::from_statuses(statuses);
    let total = breakdown.total();

    if total == 0 {
        ActivityStatus::NotStarted
    } else if breakdown.completed == total {
        ActivityStatus::Completed
    } else if breakdown.not_started == total {
        ActivityStatus::NotStarted
    } else if breakdown.on_hold > 0 {
        ActivityStatus::OnHold
    } else {
        ActivityStatus::InProgress
    }
}

/// Count of items per status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub not_started: usize,
    pub in_progress: usize,
    pub on_hold: usize,
    pub completed: usize,
}

impl StatusBreakdown {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ActivityStatus>,
    {
        let mut breakdown = Self::default();
        for status in statuses {
            breakdown.record(status);
        }
        breakdown
    }

    pub fn record(&mut self, status: ActivityStatus) {
        match status {
            ActivityStatus::NotStarted => self.not_started += 1,
            ActivityStatus::InProgress => self.in_progress += 1,
            ActivityStatus::OnHold => self.on_hold += 1,
            ActivityStatus::Completed => self.completed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.not_started + self.in_progress + self.on_hold + self.completed
    }
}

/// Badge shown for a scheduled entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleIndicator {
    OnTrack,
    Delayed,
}

impl ScheduleIndicator {
    pub fn from_delayed(delayed: bool) -> Self {
        if delayed {
            ScheduleIndicator::Delayed
        } else {
            ScheduleIndicator::OnTrack
        }
    }

    /// Get the display string for this indicator
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleIndicator::OnTrack => "On Track",
            ScheduleIndicator::Delayed => "Delayed",
        }
    }
}

impl std::fmt::Display for ScheduleIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Total / On Track / Delayed bucket counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelaySummary {
    pub total: usize,
    pub on_track: usize,
    pub delayed: usize,
}

impl DelaySummary {
    /// Classify every item as of `today` and count the buckets
    pub fn from_items<'a, E, I>(items: I, today: NaiveDate, policy: &DelayPolicy) -> Self
    where
        E: Scheduled + ?Sized + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut summary = Self::default();
        for item in items {
            summary.record(ScheduleIndicator::from_delayed(policy.is_delayed(item, today)));
        }
        summary
    }

    pub fn record(&mut self, indicator: ScheduleIndicator) {
        self.total += 1;
        match indicator {
            ScheduleIndicator::OnTrack => self.on_track += 1,
            ScheduleIndicator::Delayed => self.delayed += 1,
        }
    }
}

/// Aggregated plan metrics as of a status date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatus {
    /// Project name
    pub project_name: String,

    /// As-of date for the status
    pub status_date: NaiveDate,

    /// Delay buckets over all milestones
    pub milestones: DelaySummary,

    /// Delay buckets over all activities
    pub activities: DelaySummary,

    /// Milestones per derived status
    pub milestone_statuses: StatusBreakdown,

    /// Activities per status
    pub activity_statuses: StatusBreakdown,

    /// Days from the status date to the project end (negative once past it)
    pub days_remaining: i64,
}

impl PlanStatus {
    /// Build the dashboard view of a plan.
    ///
    /// ```ignore
    /// let status = PlanStatus::from_plan(&plan, today, &DelayPolicy::default());
    /// println!("Delayed milestones: {}", status.milestones.delayed);
    /// ```
    pub fn from_plan(plan: &ProjectPlan, status_date: NaiveDate, policy: &DelayPolicy) -> Self {
        Self {
            project_name: plan.name.clone(),
            status_date,
            milestones: DelaySummary::from_items(plan.milestones(), status_date, policy),
            activities: DelaySummary::from_items(plan.activities(), status_date, policy),
            milestone_statuses: StatusBreakdown::from_statuses(
                plan.milestones().map(|m| m.derived_status()),
            ),
            activity_statuses: StatusBreakdown::from_statuses(plan.activities().map(|a| a.status)),
            days_remaining: (plan.project.end - status_date).num_days(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
