//! `phasetree status` report
//!
//! One row per milestone and activity with its status, schedule indicator
//! and delay, plus the plan-wide [`PlanStatus`] summary.

use std::io::Write;

use chrono::NaiveDate;
use phasetree_core::{
    ActivityStatus, DelayBasis, DelayPolicy, PlanStatus, ProjectPlan, ScheduleIndicator, Scheduled,
};
use serde::Serialize;
use tracing::{debug, warn};

const UNNAMED_PHASE: &str = "(unnamed phase)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub name: String,
    pub status: ActivityStatus,
    pub indicator: ScheduleIndicator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_end: Option<NaiveDate>,
    pub delay: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRow {
    pub phase: String,
    pub name: String,
    /// Derived from the activities
    pub status: ActivityStatus,
    pub indicator: ScheduleIndicator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_end: Option<NaiveDate>,
    pub delay: String,
    pub activities: Vec<ActivityRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub summary: PlanStatus,
    pub milestones: Vec<MilestoneRow>,
}

/// Indicator and delay for one entity; logs how the decision was reached
fn schedule_columns<E: Scheduled + ?Sized>(
    name: &str,
    entity: &E,
    today: NaiveDate,
    policy: &DelayPolicy,
) -> (ScheduleIndicator, String) {
    let classification = policy.classify(entity, today);
    match classification.basis {
        DelayBasis::LegacyDuration => {
            warn!(entity = name, "no schedule date, classified by legacy duration");
        }
        DelayBasis::Unresolved => debug!(entity = name, "no schedule date, treated as on track"),
        DelayBasis::ScheduleDate(_) => {}
    }
    (
        classification.indicator(),
        policy.delay_duration(entity, today),
    )
}

impl StatusReport {
    pub fn build(plan: &ProjectPlan, today: NaiveDate, policy: &DelayPolicy) -> Self {
        let milestones = plan
            .phases
            .iter()
            .flat_map(|phase| {
                let phase_name = phase
                    .name
                    .map_or_else(|| UNNAMED_PHASE.to_string(), |name| name.to_string());
                phase.milestones.iter().map(move |milestone| {
                    let (indicator, delay) =
                        schedule_columns(&milestone.name, milestone, today, policy);
                    let activities = milestone
                        .activities
                        .iter()
                        .map(|activity| {
                            let (indicator, delay) =
                                schedule_columns(&activity.name, activity, today, policy);
                            ActivityRow {
                                name: activity.name.clone(),
                                status: activity.status,
                                indicator,
                                effective_end: activity.effective_date(),
                                delay,
                            }
                        })
                        .collect();
                    MilestoneRow {
                        phase: phase_name.clone(),
                        name: milestone.name.clone(),
                        status: milestone.derived_status(),
                        indicator,
                        effective_end: milestone.effective_date(),
                        delay,
                        activities,
                    }
                })
            })
            .collect();

        Self {
            summary: PlanStatus::from_plan(plan, today, policy),
            milestones,
        }
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let summary = &self.summary;
        writeln!(out, "Project: {}", summary.project_name)?;
        writeln!(out, "Status date: {}", summary.status_date)?;
        writeln!(out, "Days remaining: {}", summary.days_remaining)?;
        writeln!(out)?;
        writeln!(
            out,
            "Milestones: {} total, {} on track, {} delayed",
            summary.milestones.total, summary.milestones.on_track, summary.milestones.delayed
        )?;
        writeln!(
            out,
            "Activities: {} total, {} on track, {} delayed",
            summary.activities.total, summary.activities.on_track, summary.activities.delayed
        )?;

        let mut current_phase: Option<&str> = None;
        for milestone in &self.milestones {
            if current_phase != Some(milestone.phase.as_str()) {
                writeln!(out)?;
                writeln!(out, "[{}]", milestone.phase)?;
                current_phase = Some(milestone.phase.as_str());
            }
            writeln!(
                out,
                "  {:<28} {:<12} {:<9} {}",
                milestone.name,
                milestone.status.as_str(),
                milestone.indicator.as_str(),
                milestone.delay
            )?;
            for activity in &milestone.activities {
                writeln!(
                    out,
                    "    - {:<24} {:<12} {:<9} {}",
                    activity.name,
                    activity.status.as_str(),
                    activity.indicator.as_str(),
                    activity.delay
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasetree_core::{
        Activity, Milestone, Phase, PhaseName, ProjectBounds, RevisionApproval, NOT_APPLICABLE,
    };
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn plan() -> ProjectPlan {
        let bounds = ProjectBounds::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        ProjectPlan::new("Depot", bounds).phase(
            Phase::new(PhaseName::Construction)
                .weight(50)
                .milestone(
                    Milestone::new("Foundations", date(2024, 1, 1), date(2024, 3, 1))
                        .weight(50)
                        .activity(
                            Activity::new("Pour", date(2024, 1, 1), date(2024, 2, 1))
                                .weight(50)
                                .status(ActivityStatus::Completed),
                        )
                        .activity(
                            Activity::new("Cure", date(2024, 2, 1), date(2024, 3, 1))
                                .weight(50)
                                .status(ActivityStatus::InProgress),
                        ),
                )
                .milestone(
                    Milestone::new("Frame", date(2024, 3, 1), date(2024, 4, 1))
                        .weight(50)
                        .revised_end(date(2024, 9, 1), RevisionApproval::Approved),
                ),
        )
    }

    #[test]
    fn rows_follow_tree_order() {
        let report = StatusReport::build(&plan(), date(2024, 5, 1), &DelayPolicy::default());

        let names: Vec<&str> = report.milestones.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Foundations", "Frame"]);
        assert_eq!(report.milestones[0].phase, "Construction");
        assert_eq!(report.milestones[0].status, ActivityStatus::InProgress);
        assert_eq!(report.milestones[0].activities.len(), 2);
    }

    #[test]
    fn approved_revision_keeps_milestone_on_track() {
        let report = StatusReport::build(&plan(), date(2024, 5, 1), &DelayPolicy::default());
        let frame = &report.milestones[1];

        assert_eq!(frame.indicator, ScheduleIndicator::OnTrack);
        assert_eq!(frame.effective_end, Some(date(2024, 9, 1)));
        assert_eq!(frame.delay, NOT_APPLICABLE);
    }

    #[test]
    fn overdue_milestone_reports_delay() {
        let report = StatusReport::build(&plan(), date(2024, 5, 1), &DelayPolicy::default());
        let foundations = &report.milestones[0];

        assert_eq!(foundations.indicator, ScheduleIndicator::Delayed);
        // 61 days / 30.44 rounds to 2
        assert_eq!(foundations.delay, "2 months");
        assert_eq!(report.summary.milestones.delayed, 1);
        assert_eq!(report.summary.activities.delayed, 2);
    }

    #[test]
    fn text_output_groups_by_phase() {
        let report = StatusReport::build(&plan(), date(2024, 5, 1), &DelayPolicy::default());
        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Project: Depot\nStatus date: 2024-05-01\n"));
        assert!(text.contains("Milestones: 2 total, 1 on track, 1 delayed"));
        assert!(text.contains("[Construction]"));
        assert!(text.contains("Foundations"));
        assert!(text.contains("- Pour"));
    }

    #[test]
    fn json_output_has_summary_and_rows() {
        let report = StatusReport::build(&plan(), date(2024, 5, 1), &DelayPolicy::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["projectName"], "Depot");
        assert_eq!(json["milestones"][1]["effectiveEnd"], "2024-09-01");
        assert_eq!(json["milestones"][0]["activities"][0]["status"], "COMPLETED");
    }
}
