//! Field paths into a phase tree
//!
//! A [`FieldPath`] names one form field (or one sibling group) inside a
//! single phase. Paths render as the dotted/indexed keys form code uses for
//! its error state, e.g. `milestone[2].start` or
//! `milestone[0].activity[1].end`.

use std::cmp::Ordering;
use std::fmt;

/// Fields on the phase itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseField {
    Name,
    Weight,
    /// Group key for the sum of child milestone weights
    MilestoneWeights,
}

/// Fields on a milestone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MilestoneField {
    Name,
    Weight,
    Start,
    End,
    RevisedEnd,
    /// Group key for the sum of child activity weights
    ActivityWeights,
}

/// Fields on an activity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityField {
    Name,
    Weight,
    Start,
    End,
    RevisedEnd,
}

/// Position of a field within one phase tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Phase(PhaseField),
    Milestone {
        milestone: usize,
        field: MilestoneField,
    },
    Activity {
        milestone: usize,
        activity: usize,
        field: ActivityField,
    },
}

impl FieldPath {
    pub fn phase(field: PhaseField) -> Self {
        FieldPath::Phase(field)
    }

    pub fn milestone(milestone: usize, field: MilestoneField) -> Self {
        FieldPath::Milestone { milestone, field }
    }

    pub fn activity(milestone: usize, activity: usize, field: ActivityField) -> Self {
        FieldPath::Activity {
            milestone,
            activity,
            field,
        }
    }

    /// Milestone index this path points into, if any
    pub fn milestone_index(&self) -> Option<usize> {
        match self {
            FieldPath::Phase(_) => None,
            FieldPath::Milestone { milestone, .. } | FieldPath::Activity { milestone, .. } => {
                Some(*milestone)
            }
        }
    }

    /// True for sibling-group keys rather than single fields
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            FieldPath::Phase(PhaseField::MilestoneWeights)
                | FieldPath::Milestone {
                    field: MilestoneField::ActivityWeights,
                    ..
                }
        )
    }

    // Groups sort ahead of the children they summarize, milestones in index
    // order with their activities directly after them.
    fn sort_key(&self) -> (Option<usize>, Option<usize>, u8) {
        match self {
            FieldPath::Phase(field) => (None, None, *field as u8),
            FieldPath::Milestone { milestone, field } => (Some(*milestone), None, *field as u8),
            FieldPath::Activity {
                milestone,
                activity,
                field,
            } => (Some(*milestone), Some(*activity), *field as u8),
        }
    }
}

impl Ord for FieldPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PhaseField {
    fn key(self) -> &'static str {
        match self {
            PhaseField::Name => "name",
            PhaseField::Weight => "weight",
            PhaseField::MilestoneWeights => "milestones.weight_sum",
        }
    }
}

impl MilestoneField {
    fn key(self) -> &'static str {
        match self {
            MilestoneField::Name => "name",
            MilestoneField::Weight => "weight",
            MilestoneField::Start => "start",
            MilestoneField::End => "end",
            MilestoneField::RevisedEnd => "revised_end",
            MilestoneField::ActivityWeights => "activities.weight_sum",
        }
    }
}

impl ActivityField {
    fn key(self) -> &'static str {
        match self {
            ActivityField::Name => "name",
            ActivityField::Weight => "weight",
            ActivityField::Start => "start",
            ActivityField::End => "end",
            ActivityField::RevisedEnd => "revised_end",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Phase(field) => write!(f, "{}", field.key()),
            FieldPath::Milestone { milestone, field } => {
                write!(f, "milestone[{}].{}", milestone, field.key())
            }
            FieldPath::Activity {
                milestone,
                activity,
                field,
            } => write!(f, "milestone[{}].activity[{}].{}", milestone, activity, field.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_form_keys() {
        assert_eq!(FieldPath::phase(PhaseField::Name).to_string(), "name");
        assert_eq!(
            FieldPath::phase(PhaseField::MilestoneWeights).to_string(),
            "milestones.weight_sum"
        );
        assert_eq!(
            FieldPath::milestone(2, MilestoneField::Start).to_string(),
            "milestone[2].start"
        );
        assert_eq!(
            FieldPath::milestone(0, MilestoneField::ActivityWeights).to_string(),
            "milestone[0].activities.weight_sum"
        );
        assert_eq!(
            FieldPath::activity(0, 1, ActivityField::RevisedEnd).to_string(),
            "milestone[0].activity[1].revised_end"
        );
    }

    #[test]
    fn ordering_groups_activities_under_their_milestone() {
        let mut paths = vec![
            FieldPath::activity(1, 0, ActivityField::End),
            FieldPath::milestone(1, MilestoneField::Start),
            FieldPath::activity(0, 3, ActivityField::Name),
            FieldPath::phase(PhaseField::Weight),
            FieldPath::milestone(0, MilestoneField::End),
        ];
        paths.sort();

        let rendered: Vec<String> = paths.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "weight",
                "milestone[0].end",
                "milestone[0].activity[3].name",
                "milestone[1].start",
                "milestone[1].activity[0].end",
            ]
        );
    }

    #[test]
    fn group_keys() {
        assert!(FieldPath::phase(PhaseField::MilestoneWeights).is_group());
        assert!(FieldPath::milestone(3, MilestoneField::ActivityWeights).is_group());
        assert!(!FieldPath::milestone(3, MilestoneField::Weight).is_group());
        assert_eq!(FieldPath::activity(4, 0, ActivityField::Name).milestone_index(), Some(4));
        assert_eq!(FieldPath::phase(PhaseField::Name).milestone_index(), None);
    }
}
