//! # phasetree-check
//!
//! Validation for Phase → Milestone → Activity trees.
//!
//! This crate provides:
//! - Weight validation: single weights (1-100) and sibling sums against a cap
//! - Schedule validation: required fields, date ordering, and containment of
//!   activities in milestones and milestones in the project timeline
//! - Plan validation: every phase plus cross-phase rules
//!
//! Validation never stops at the first problem. Every violated invariant is
//! collected into an [`ErrorMap`] keyed by [`FieldPath`], so a form can show
//! all errors at once. An empty map means valid.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use phasetree_core::{Milestone, Phase, PhaseName, ProjectBounds};
//! use phasetree_check::validate_phase;
//!
//! let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
//! let bounds = ProjectBounds::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
//!
//! let phase = Phase::new(PhaseName::DetailedDesign)
//!     .weight(40)
//!     .milestone(Milestone::new("Survey", d(2023, 12, 1), d(2024, 2, 1)).weight(60));
//!
//! let errors = validate_phase(&phase, &bounds);
//! assert_eq!(
//!     errors.get_key("milestone[0].start"),
//!     Some("Milestone start date cannot be before project start date")
//! );
//! ```

pub mod plan;
pub mod schedule;
pub mod weight;

use std::collections::BTreeMap;

use phasetree_core::{FieldPath, Phase, ProjectBounds, ProjectPlan};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub use plan::PlanReport;
pub use weight::{
    validate_weight, validate_weight_sum, WeightError, WeightSumError, DEFAULT_WEIGHT_CAP,
    MAX_WEIGHT, MIN_WEIGHT,
};

// ============================================================================
// Error map
// ============================================================================

/// Field path → messages, ordered by position in the tree
///
/// A path keeps every distinct message recorded against it, in the order the
/// checks ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: BTreeMap<FieldPath, Vec<String>>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. Returns false when the path already carries the
    /// same message.
    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) -> bool {
        let message = message.into();
        let messages = self.entries.entry(path).or_default();
        if messages.contains(&message) {
            return false;
        }
        messages.push(message);
        true
    }

    /// First message recorded for a path
    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.entries
            .get(path)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Every message recorded for a path
    pub fn messages(&self, path: &FieldPath) -> &[String] {
        self.entries
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up by rendered key, e.g. `milestone[2].start`
    pub fn get_key(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(path, _)| path.to_string() == key)
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of messages, counting each one on a shared path
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// One item per message, in tree order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.entries.iter().flat_map(|(path, messages)| {
            messages.iter().map(move |message| (path, message.as_str()))
        })
    }

    /// Errors under one milestone, including its activities and their group
    pub fn for_milestone(&self, index: usize) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.iter().filter(move |(path, _)| path.milestone_index() == Some(index))
    }

    /// Rendered keys, as form error state stores them. Messages sharing a
    /// path are joined with `; `.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(path, messages)| (path.to_string(), messages.join("; ")))
            .collect()
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, messages) in &self.entries {
            map.serialize_entry(&path.to_string(), messages)?;
        }
        map.end()
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Validation settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Maximum sum of sibling weights
    pub weight_cap: i64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            weight_cap: DEFAULT_WEIGHT_CAP,
        }
    }
}

/// Validator for phase trees
#[derive(Clone, Debug, Default)]
pub struct Checker {
    pub config: CheckConfig,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Validate one phase against the project bounds
    pub fn validate_phase(&self, phase: &Phase, bounds: &ProjectBounds) -> ErrorMap {
        schedule::check_phase(phase, bounds, self.config.weight_cap)
    }

    /// Validate every phase of a plan plus cross-phase rules
    pub fn validate_plan(&self, plan: &ProjectPlan) -> PlanReport {
        plan::check_plan(plan, self.config.weight_cap)
    }
}

/// Validate one phase with default settings
pub fn validate_phase(phase: &Phase, bounds: &ProjectBounds) -> ErrorMap {
    Checker::new().validate_phase(phase, bounds)
}

/// Validate a plan with default settings
pub fn validate_plan(plan: &ProjectPlan) -> PlanReport {
    Checker::new().validate_plan(plan)
}
