//! Diagnostic formatting for `phasetree check`
//!
//! A [`PlanReport`] is flattened into [`Diagnostic`]s, one per failed field,
//! and written by an emitter:
//! - `TerminalEmitter`: rustc-style text
//! - `JsonEmitter`: machine-readable JSON
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: the plan has no validation errors |
//! | 1 | Failure: one or more validation errors |
//! | 2 | The plan or config could not be read |
//!
//! `--quiet` only hides the summary lines; it never changes the exit code.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use phasetree_check::PlanReport;
use phasetree_core::ProjectPlan;
use serde::Serialize;

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// No validation errors
    Success = 0,
    /// One or more validation errors
    Failure = 1,
}

impl ExitCode {
    pub fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Diagnostic
// ============================================================================

/// One validation error located in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Phase index; `None` for plan-wide errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    /// Field path within the phase, e.g. `milestone[0].start`
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    /// Location as `phase[N].path`, or just `path` for plan-wide errors
    pub fn location(&self) -> String {
        match self.phase {
            Some(index) => format!("phase[{index}].{}", self.path),
            None => self.path.clone(),
        }
    }
}

/// Path used for the plan-wide phase weight sum
pub const PHASE_WEIGHTS_PATH: &str = "phases.weight_sum";

/// Flatten a report into diagnostics, phase by phase in tree order
pub fn collect_diagnostics(plan: &ProjectPlan, report: &PlanReport) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = report
        .phases
        .iter()
        .enumerate()
        .flat_map(|(index, errors)| {
            let phase_name = plan
                .phases
                .get(index)
                .and_then(|phase| phase.name)
                .map(|name| name.to_string());
            errors.iter().map(move |(path, message)| Diagnostic {
                phase: Some(index),
                phase_name: phase_name.clone(),
                path: path.to_string(),
                message: message.to_string(),
            })
        })
        .collect();

    if let Some(message) = &report.phase_weights {
        diagnostics.push(Diagnostic {
            phase: None,
            phase_name: None,
            path: PHASE_WEIGHTS_PATH.to_string(),
            message: message.clone(),
        });
    }
    diagnostics
}

// ============================================================================
// Diagnostic Config
// ============================================================================

/// Configuration for diagnostic output
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    /// Only print errors, no summary
    pub quiet: bool,
}

/// Sink for diagnostics of one plan file
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);

    /// Called once after the last diagnostic
    fn finish(&mut self) -> std::io::Result<()>;

    fn error_count(&self) -> usize;

    fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count())
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Text emitter writing rustc-style diagnostics
pub struct TerminalEmitter<W: Write> {
    writer: W,
    file: PathBuf,
    config: DiagnosticConfig,
    error_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, file: impl Into<PathBuf>, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            file: file.into(),
            config,
            error_count: 0,
        }
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> std::io::Result<()> {
        writeln!(self.writer, "error: {}", diagnostic.message)?;
        writeln!(
            self.writer,
            "  --> {} {}",
            self.file.display(),
            diagnostic.location()
        )?;
        if let Some(name) = &diagnostic.phase_name {
            writeln!(self.writer, "   = phase: {name}")?;
        }
        writeln!(self.writer)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.error_count += 1;
        // stdout may be closed
        let _ = self.write_diagnostic(&diagnostic);
    }

    fn finish(&mut self) -> std::io::Result<()> {
        if self.config.quiet {
            return Ok(());
        }
        let file = self.file.display();
        match self.error_count {
            0 => writeln!(self.writer, "{file}: ok"),
            1 => writeln!(self.writer, "{file}: 1 error"),
            n => writeln!(self.writer, "{file}: {n} errors"),
        }
    }

    fn error_count(&self) -> usize {
        self.error_count
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Full JSON document for one checked file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonCheckOutput<'a> {
    pub file: String,
    pub valid: bool,
    pub error_count: usize,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> JsonCheckOutput<'a> {
    pub fn new(file: &Path, diagnostics: &'a [Diagnostic]) -> Self {
        Self {
            file: file.display().to_string(),
            valid: diagnostics.is_empty(),
            error_count: diagnostics.len(),
            diagnostics,
        }
    }
}

/// JSON emitter that collects diagnostics and writes one document.
///
/// The document is written even with `--quiet`, since it is the only output.
pub struct JsonEmitter<W: Write> {
    writer: W,
    file: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W, file: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            file: file.into(),
            diagnostics: Vec::new(),
        }
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn finish(&mut self) -> std::io::Result<()> {
        let output = JsonCheckOutput::new(&self.file, &self.diagnostics);
        serde_json::to_writer_pretty(&mut self.writer, &output)?;
        writeln!(self.writer)
    }

    fn error_count(&self) -> usize {
        self.diagnostics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use phasetree_check::validate_plan;
    use phasetree_core::{Milestone, Phase, PhaseName, ProjectBounds};
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn broken_plan() -> ProjectPlan {
        let bounds = ProjectBounds::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        ProjectPlan::new("Depot", bounds)
            .phase(
                Phase::new(PhaseName::DetailedDesign).weight(60).milestone(
                    Milestone::new("Survey", date(2023, 12, 1), date(2024, 2, 1)).weight(50),
                ),
            )
            .phase(Phase::new(PhaseName::Construction).weight(60))
    }

    fn diagnostics() -> Vec<Diagnostic> {
        let plan = broken_plan();
        collect_diagnostics(&plan, &validate_plan(&plan))
    }

    #[test]
    fn collects_phase_and_plan_errors_in_order() {
        let diagnostics = diagnostics();
        let locations: Vec<String> = diagnostics.iter().map(Diagnostic::location).collect();

        assert_eq!(
            locations,
            vec!["phase[0].milestone[0].start", "phases.weight_sum"]
        );
        assert_eq!(diagnostics[0].phase_name.as_deref(), Some("Detailed Design"));
        assert_eq!(
            diagnostics[1].message,
            "Total phase weight sum (120) cannot exceed 100"
        );
    }

    #[test]
    fn terminal_emitter_basic_output() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut output, "plan.json", DiagnosticConfig::default());
        for diagnostic in diagnostics() {
            emitter.emit(diagnostic);
        }
        emitter.finish().unwrap();
        assert_eq!(emitter.exit_code(), ExitCode::Failure);
        drop(emitter);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("error: Milestone start date cannot be before project start date"));
        assert!(output.contains("  --> plan.json phase[0].milestone[0].start"));
        assert!(output.contains("   = phase: Detailed Design"));
        assert!(output.ends_with("plan.json: 2 errors\n"));
    }

    #[test]
    fn terminal_emitter_quiet_hides_summary_only() {
        let mut output = Vec::new();
        let config = DiagnosticConfig { quiet: true };
        let mut emitter = TerminalEmitter::new(&mut output, "plan.json", config);
        for diagnostic in diagnostics() {
            emitter.emit(diagnostic);
        }
        emitter.finish().unwrap();
        assert_eq!(emitter.exit_code(), ExitCode::Failure);
        drop(emitter);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("error: "));
        assert!(!output.contains("2 errors"));
    }

    #[test]
    fn terminal_emitter_clean_plan() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut output, "plan.json", DiagnosticConfig::default());
        emitter.finish().unwrap();
        assert_eq!(emitter.exit_code(), ExitCode::Success);
        drop(emitter);

        assert_eq!(String::from_utf8(output).unwrap(), "plan.json: ok\n");
    }

    #[test]
    fn terminal_emitter_prints_file_as_given() {
        let mut output = Vec::new();
        let mut emitter =
            TerminalEmitter::new(&mut output, "plans/a.json", DiagnosticConfig::default());
        emitter.finish().unwrap();
        drop(emitter);

        assert_eq!(String::from_utf8(output).unwrap(), "plans/a.json: ok\n");
    }

    #[test]
    fn json_emitter_document() {
        let mut output = Vec::new();
        let mut emitter = JsonEmitter::new(&mut output, "plan.json");
        for diagnostic in diagnostics() {
            emitter.emit(diagnostic);
        }
        emitter.finish().unwrap();
        assert_eq!(emitter.exit_code(), ExitCode::Failure);
        drop(emitter);

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["file"], "plan.json");
        assert_eq!(json["valid"], false);
        assert_eq!(json["errorCount"], 2);
        assert_eq!(json["diagnostics"][0]["path"], "milestone[0].start");
        assert_eq!(json["diagnostics"][0]["phase"], 0);
        assert!(json["diagnostics"][1].get("phase").is_none());
    }

    #[test]
    fn json_output_counts_match_diagnostics() {
        let diagnostics = diagnostics();
        let output = JsonCheckOutput::new(Path::new("plan.json"), &diagnostics);

        assert_eq!(output.file, "plan.json");
        assert!(!output.valid);
        assert_eq!(output.error_count, 2);
        assert_eq!(output.diagnostics.len(), 2);
    }

    #[test]
    fn json_emitter_writes_parseable_output() {
        let mut output = Vec::new();
        let mut emitter = JsonEmitter::new(&mut output, "plan.json");
        emitter.finish().unwrap();
        assert_eq!(emitter.exit_code(), ExitCode::Success);
        drop(emitter);

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["diagnostics"], serde_json::json!([]));
    }

    // =========================================================================
    // Exit Code Tests
    // =========================================================================

    #[test]
    fn exit_code_zero_errors_is_success() {
        assert_eq!(ExitCode::from_error_count(0), ExitCode::Success);
        assert_eq!(ExitCode::Success as u8, 0);
    }

    #[test]
    fn exit_code_with_errors_is_failure() {
        assert_eq!(ExitCode::from_error_count(3), ExitCode::Failure);
        assert_eq!(ExitCode::Failure as u8, 1);
    }
}
