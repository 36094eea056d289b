//! Scenario and suite outcome reporting.

use serde::Serialize;

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepStatus {
    /// Step handler completed
    Passed,
    /// Step handler or resolution failed; the scenario stopped here
    Failed {
        /// The propagated error message
        message: String,
    },
    /// Step never ran because an earlier step failed
    Skipped,
}

/// Result of one executed (or skipped) step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Step keyword as written in the scenario
    pub keyword: String,
    /// Step text without the keyword
    pub text: String,
    /// Outcome
    #[serde(flatten)]
    pub status: StepStatus,
    /// Wall-clock duration in milliseconds (zero for skipped steps)
    pub duration_ms: u64,
}

impl StepReport {
    /// Whether this step passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == StepStatus::Passed
    }
}

/// Results from running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Per-step results, in execution order
    pub steps: Vec<StepReport>,
    /// Total wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Whether every step passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(StepReport::passed)
    }

    /// The step the scenario failed on, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::Failed { .. }))
    }

    /// Count of skipped steps
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count()
    }
}

/// Results from running a set of scenarios
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    /// Per-scenario results
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// Create an empty suite report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scenario result
    pub fn push(&mut self, report: ScenarioReport) {
        self.scenarios.push(report);
    }

    /// Whether every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::all_passed)
    }

    /// Count of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.all_passed()).count()
    }

    /// Count of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.passed_count()
    }

    /// Plain-text summary, one line per scenario plus a totals line
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for scenario in &self.scenarios {
            let mark = if scenario.all_passed() { "ok" } else { "FAILED" };
            out.push_str(&format!(
                "{mark:>6}  {} ({}ms)\n",
                scenario.name, scenario.duration_ms
            ));
            if let Some(step) = scenario.failed_step() {
                if let StepStatus::Failed { ref message } = step.status {
                    out.push_str(&format!(
                        "        at: {} {}\n        {message}\n",
                        step.keyword, step.text
                    ));
                }
            }
        }
        out.push_str(&format!(
            "\n{} passed, {} failed, {} total\n",
            self.passed_count(),
            self.failed_count(),
            self.scenarios.len()
        ));
        out
    }

    /// JSON export of the full suite
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
