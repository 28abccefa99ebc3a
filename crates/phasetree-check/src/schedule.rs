//! Schedule validation for a single phase
//!
//! One pass over the tree, no backtracking:
//!
//! 1. phase name and weight
//! 2. each milestone in array order (not by `order`): required fields, then
//!    its dates against the project bounds
//! 3. each activity: required fields, then its dates against the parent
//!    milestone's start and original end date
//! 4. sibling weight sums, keyed to the parent
//!
//! A revised end date must not fall before the original end (or before the
//! start while no original end exists yet) and stays within the same upper
//! bound as the original end. It never takes part in the original
//! end-after-start check.

use chrono::NaiveDate;
use phasetree_core::{
    Activity, ActivityField, DateRange, FieldPath, Milestone, MilestoneField, Phase, PhaseField,
    ProjectBounds,
};
use tracing::debug;

use crate::weight::{validate_weight, validate_weight_sum};
use crate::ErrorMap;

/// Dates of whatever encloses the node being checked
struct Container {
    label: &'static str,
    range: DateRange,
}

/// The dated fields of a milestone or activity
struct DatedFields {
    subject: &'static str,
    range: Option<DateRange>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    revised_end: Option<NaiveDate>,
}

struct DatePaths {
    start: FieldPath,
    end: FieldPath,
    revised_end: FieldPath,
}

pub(crate) fn check_phase(phase: &Phase, bounds: &ProjectBounds, cap: i64) -> ErrorMap {
    let mut errors = ErrorMap::new();

    if phase.name.is_none() {
        errors.insert(FieldPath::phase(PhaseField::Name), "Phase name is required");
    }
    if let Err(err) = validate_weight(phase.weight) {
        errors.insert(FieldPath::phase(PhaseField::Weight), format!("Phase {err}"));
    }

    let project = Container {
        label: "project",
        range: bounds.range(),
    };

    for (index, milestone) in phase.milestones.iter().enumerate() {
        check_milestone(index, milestone, &project, cap, &mut errors);
    }

    if let Err(err) = validate_weight_sum(phase.milestones.iter().map(|m| m.weight), cap) {
        errors.insert(
            FieldPath::phase(PhaseField::MilestoneWeights),
            format!("Total milestone {err}"),
        );
    }

    debug!(
        phase = phase.name.map(|n| n.as_str()).unwrap_or("<unnamed>"),
        milestones = phase.milestones.len(),
        errors = errors.len(),
        "validated phase"
    );

    errors
}

fn check_milestone(
    index: usize,
    milestone: &Milestone,
    project: &Container,
    cap: i64,
    errors: &mut ErrorMap,
) {
    let path = |field| FieldPath::milestone(index, field);

    if milestone.name.trim().is_empty() {
        errors.insert(path(MilestoneField::Name), "Milestone name is required");
    }
    if let Err(err) = validate_weight(milestone.weight) {
        errors.insert(path(MilestoneField::Weight), format!("Milestone {err}"));
    }

    check_dates(
        &DatedFields {
            subject: "Milestone",
            range: milestone.range(),
            start: milestone.start_date,
            end: milestone.end_date,
            revised_end: milestone.revised_end_date,
        },
        project,
        &DatePaths {
            start: path(MilestoneField::Start),
            end: path(MilestoneField::End),
            revised_end: path(MilestoneField::RevisedEnd),
        },
        errors,
    );

    let parent = Container {
        label: "milestone",
        range: DateRange::bounded(milestone.start_date, milestone.end_date),
    };
    for (activity_index, activity) in milestone.activities.iter().enumerate() {
        check_activity(index, activity_index, activity, &parent, errors);
    }

    if let Err(err) = validate_weight_sum(milestone.activities.iter().map(|a| a.weight), cap) {
        errors.insert(
            path(MilestoneField::ActivityWeights),
            format!("Total activity {err}"),
        );
    }
}

fn check_activity(
    milestone: usize,
    index: usize,
    activity: &Activity,
    parent: &Container,
    errors: &mut ErrorMap,
) {
    let path = |field| FieldPath::activity(milestone, index, field);

    if activity.name.trim().is_empty() {
        errors.insert(path(ActivityField::Name), "Activity name is required");
    }
    if let Err(err) = validate_weight(activity.weight) {
        errors.insert(path(ActivityField::Weight), format!("Activity {err}"));
    }

    check_dates(
        &DatedFields {
            subject: "Activity",
            range: activity.range(),
            start: activity.start_date,
            end: activity.end_date,
            revised_end: activity.revised_end_date,
        },
        parent,
        &DatePaths {
            start: path(ActivityField::Start),
            end: path(ActivityField::End),
            revised_end: path(ActivityField::RevisedEnd),
        },
        errors,
    );
}

fn check_dates(fields: &DatedFields, container: &Container, paths: &DatePaths, errors: &mut ErrorMap) {
    let subject = fields.subject;
    let label = container.label;
    let bounds = &container.range;

    if fields.start.is_none() {
        errors.insert(paths.start, format!("{subject} start date is required"));
    }
    if fields.end.is_none() {
        errors.insert(paths.end, format!("{subject} end date is required"));
    }

    if !fields.range.is_some_and(|range| range.is_within(bounds)) {
        if fields.start.is_some_and(|start| !bounds.admits_start(start)) {
            errors.insert(
                paths.start,
                format!("{subject} start date cannot be before {label} start date"),
            );
        }
        if fields.end.is_some_and(|end| !bounds.admits_end(end)) {
            errors.insert(
                paths.end,
                format!("{subject} end date cannot be after {label} end date"),
            );
        }
    }
    if fields.range.is_some_and(|range| !range.is_ordered()) {
        errors.insert(paths.end, format!("{subject} end date must be after start date"));
    }

    let Some(revised) = fields.revised_end else {
        return;
    };
    match (fields.start, fields.end) {
        (Some(start), None) if revised < start => {
            errors.insert(
                paths.revised_end,
                format!("{subject} revised end date cannot be before start date"),
            );
        }
        (Some(start), Some(_)) if !DateRange::new(start, revised).is_ordered() => {
            errors.insert(
                paths.revised_end,
                format!("{subject} revised end date must be after start date"),
            );
        }
        _ => {}
    }
    if fields.end.is_some_and(|end| revised < end) {
        errors.insert(
            paths.revised_end,
            format!("{subject} revised end date cannot be before original end date"),
        );
    }
    if !bounds.admits_end(revised) {
        errors.insert(
            paths.revised_end,
            format!("{subject} revised end date cannot be after {label} end date"),
        );
    }
}
