//! Plan-level validation
//!
//! Runs the phase checks on every phase and adds the rules that span phases:
//! phase weights share the same cap as any other sibling group, and a phase
//! name may be used only once per project.

use std::collections::HashSet;

use phasetree_core::{FieldPath, PhaseField, ProjectPlan};
use serde::Serialize;
use tracing::{debug, info};

use crate::schedule::check_phase;
use crate::weight::validate_weight_sum;
use crate::ErrorMap;

/// Validation result for a whole plan
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    /// One error map per phase, in phase order
    pub phases: Vec<ErrorMap>,
    /// Group error for the sum of phase weights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_weights: Option<String>,
}

impl PlanReport {
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.phases.iter().map(ErrorMap::len).sum::<usize>() + usize::from(self.phase_weights.is_some())
    }
}

pub(crate) fn check_plan(plan: &ProjectPlan, cap: i64) -> PlanReport {
    let mut phases: Vec<ErrorMap> = plan
        .phases
        .iter()
        .map(|phase| check_phase(phase, &plan.project, cap))
        .collect();

    let mut seen = HashSet::new();
    for (phase, errors) in plan.phases.iter().zip(phases.iter_mut()) {
        if let Some(name) = phase.name {
            if !seen.insert(name) {
                debug!(phase = name.as_str(), "duplicate phase name");
                errors.insert(
                    FieldPath::phase(PhaseField::Name),
                    format!("Phase '{name}' already exists in this project"),
                );
            }
        }
    }

    let phase_weights = validate_weight_sum(plan.phases.iter().map(|p| p.weight), cap)
        .err()
        .map(|err| format!("Total phase {err}"));

    let report = PlanReport {
        phases,
        phase_weights,
    };
    info!(
        phases = plan.phases.len(),
        errors = report.error_count(),
        "validated plan"
    );
    report
}
