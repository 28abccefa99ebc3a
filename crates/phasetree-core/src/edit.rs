//! Typed edits to a phase tree
//!
//! Every user-settable field has exactly one edit variant, so form code never
//! writes fields by name. A milestone has no status edit: its status is
//! derived from its activities.
//!
//! Edits never mutate the input. [`Phase::apply`] returns a new tree and an
//! out-of-range index leaves the original untouched.

use chrono::NaiveDate;

use crate::path::{ActivityField, FieldPath, MilestoneField, PhaseField};
use crate::status::ActivityStatus;
use crate::{Activity, Milestone, ModelError, Phase, PhaseName, RevisionApproval};

/// Edit to a phase or anything beneath it
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseEdit {
    Name(Option<PhaseName>),
    Weight(Option<i64>),
    /// Append a milestone at the end
    AddMilestone(Milestone),
    /// Remove a milestone and all of its activities
    RemoveMilestone(usize),
    /// Move a milestone to a new position, renumbering `order`
    MoveMilestone { from: usize, to: usize },
    Milestone { index: usize, edit: MilestoneEdit },
}

/// Edit to a milestone or its activities
#[derive(Clone, Debug, PartialEq)]
pub enum MilestoneEdit {
    Name(String),
    Weight(Option<i64>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    RevisedEndDate(Option<NaiveDate>),
    RevisionApproval(Option<RevisionApproval>),
    AddActivity(Activity),
    RemoveActivity(usize),
    Activity { index: usize, edit: ActivityEdit },
}

/// Edit to a single activity
#[derive(Clone, Debug, PartialEq)]
pub enum ActivityEdit {
    Name(String),
    Description(Option<String>),
    Weight(Option<i64>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    RevisedEndDate(Option<NaiveDate>),
    RevisionApproval(Option<RevisionApproval>),
    Status(ActivityStatus),
}

impl Phase {
    /// Apply an edit, returning the edited copy
    pub fn apply(&self, edit: PhaseEdit) -> Result<Phase, ModelError> {
        let mut next = self.clone();
        edit.apply_to(&mut next)?;
        Ok(next)
    }
}

fn check_index(kind: &'static str, index: usize, len: usize) -> Result<(), ModelError> {
    if index < len {
        Ok(())
    } else {
        Err(ModelError::IndexOutOfRange { kind, index, len })
    }
}

impl PhaseEdit {
    /// Field this edit writes, for clearing its error in form state.
    ///
    /// Structural edits (add/remove/move) have no single target.
    pub fn target(&self) -> Option<FieldPath> {
        match self {
            PhaseEdit::Name(_) => Some(FieldPath::phase(PhaseField::Name)),
            PhaseEdit::Weight(_) => Some(FieldPath::phase(PhaseField::Weight)),
            PhaseEdit::Milestone { index, edit } => edit.target(*index),
            PhaseEdit::AddMilestone(_)
            | PhaseEdit::RemoveMilestone(_)
            | PhaseEdit::MoveMilestone { .. } => None,
        }
    }

    fn apply_to(self, phase: &mut Phase) -> Result<(), ModelError> {
        let len = phase.milestones.len();
        match self {
            PhaseEdit::Name(name) => phase.name = name,
            PhaseEdit::Weight(weight) => phase.weight = weight,
            PhaseEdit::AddMilestone(milestone) => {
                phase.milestones.push(milestone);
                phase.renumber();
            }
            PhaseEdit::RemoveMilestone(index) => {
                check_index("milestone", index, len)?;
                phase.milestones.remove(index);
                phase.renumber();
            }
            PhaseEdit::MoveMilestone { from, to } => {
                check_index("milestone", from, len)?;
                check_index("milestone", to, len)?;
                let milestone = phase.milestones.remove(from);
                phase.milestones.insert(to, milestone);
                phase.renumber();
            }
            PhaseEdit::Milestone { index, edit } => {
                check_index("milestone", index, len)?;
                edit.apply_to(&mut phase.milestones[index])?;
            }
        }
        Ok(())
    }
}

impl MilestoneEdit {
    fn target(&self, milestone: usize) -> Option<FieldPath> {
        let field = match self {
            MilestoneEdit::Name(_) => MilestoneField::Name,
            MilestoneEdit::Weight(_) => MilestoneField::Weight,
            MilestoneEdit::StartDate(_) => MilestoneField::Start,
            MilestoneEdit::EndDate(_) => MilestoneField::End,
            MilestoneEdit::RevisedEndDate(_) | MilestoneEdit::RevisionApproval(_) => {
                MilestoneField::RevisedEnd
            }
            MilestoneEdit::Activity { index, edit } => return edit.target(milestone, *index),
            MilestoneEdit::AddActivity(_) | MilestoneEdit::RemoveActivity(_) => return None,
        };
        Some(FieldPath::milestone(milestone, field))
    }

    fn apply_to(self, milestone: &mut Milestone) -> Result<(), ModelError> {
        let len = milestone.activities.len();
        match self {
            MilestoneEdit::Name(name) => milestone.name = name,
            MilestoneEdit::Weight(weight) => milestone.weight = weight,
            MilestoneEdit::StartDate(date) => milestone.start_date = date,
            MilestoneEdit::EndDate(date) => milestone.end_date = date,
            MilestoneEdit::RevisedEndDate(date) => milestone.revised_end_date = date,
            MilestoneEdit::RevisionApproval(approval) => milestone.revision_approval = approval,
            MilestoneEdit::AddActivity(activity) => milestone.activities.push(activity),
            MilestoneEdit::RemoveActivity(index) => {
                check_index("activity", index, len)?;
                milestone.activities.remove(index);
            }
            MilestoneEdit::Activity { index, edit } => {
                check_index("activity", index, len)?;
                edit.apply_to(&mut milestone.activities[index]);
            }
        }
        Ok(())
    }
}

impl ActivityEdit {
    fn target(&self, milestone: usize, activity: usize) -> Option<FieldPath> {
        let field = match self {
            ActivityEdit::Name(_) => ActivityField::Name,
            ActivityEdit::Weight(_) => ActivityField::Weight,
            ActivityEdit::StartDate(_) => ActivityField::Start,
            ActivityEdit::EndDate(_) => ActivityField::End,
            ActivityEdit::RevisedEndDate(_) | ActivityEdit::RevisionApproval(_) => {
                ActivityField::RevisedEnd
            }
            ActivityEdit::Description(_) | ActivityEdit::Status(_) => return None,
        };
        Some(FieldPath::activity(milestone, activity, field))
    }

    fn apply_to(self, activity: &mut Activity) {
        match self {
            ActivityEdit::Name(name) => activity.name = name,
            ActivityEdit::Description(description) => activity.description = description,
            ActivityEdit::Weight(weight) => activity.weight = weight,
            ActivityEdit::StartDate(date) => activity.start_date = date,
            ActivityEdit::EndDate(date) => activity.end_date = date,
            ActivityEdit::RevisedEndDate(date) => activity.revised_end_date = date,
            ActivityEdit::RevisionApproval(approval) => activity.revision_approval = approval,
            ActivityEdit::Status(status) => activity.status = status,
        }
    }
}
