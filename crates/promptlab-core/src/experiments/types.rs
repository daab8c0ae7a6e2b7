//! Experiment record types

use crate::eval::heuristic::round1;
use crate::eval::EvaluationScores;
use serde::{Deserialize, Serialize};

/// One scenario's outcome within a run. Created once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub scenario_id: String,
    pub scenario_name: String,
    /// Correlation id shared with this scenario's trace entries
    pub trace_id: String,
    /// Heuristic evaluation of the (possibly placeholder) response
    pub evaluation: EvaluationScores,
    /// Wall-clock generation + evaluation time for this scenario
    pub latency_ms: u64,
    /// Whether generation succeeded (false means a placeholder was scored)
    pub used_ai: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True only for the synthetic result of a scenario-level failure.
    /// A generation fallback is NOT a failure; it still completes.
    #[serde(default)]
    pub failed: bool,
}

/// Per-metric averages shared by summaries and comparison deltas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub clarity: f64,
    pub helpfulness: f64,
    pub tone: f64,
    pub financial_alignment: f64,
    pub average: f64,
}

impl MetricSet {
    pub const ZERO: MetricSet = MetricSet {
        clarity: 0.0,
        helpfulness: 0.0,
        tone: 0.0,
        financial_alignment: 0.0,
        average: 0.0,
    };
}

/// Aggregate over all results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub total_scenarios: usize,
    pub completed_scenarios: usize,
    pub failed_scenarios: usize,
    /// Mean of each metric across completed results only
    pub average_scores: MetricSet,
    /// Count of flagged results across all results, completed or failed
    pub safety_flags_count: usize,
    /// Mean latency across completed results only
    pub average_latency_ms: f64,
    /// Percentage of all results where generation succeeded
    pub ai_usage_rate: f64,
}

impl ExperimentSummary {
    /// Aggregate per the summary formulas. Invariant:
    /// `completed_scenarios + failed_scenarios == total_scenarios`.
    pub fn from_results(results: &[ExperimentResult]) -> Self {
        let total = results.len();
        let completed: Vec<&ExperimentResult> = results.iter().filter(|r| !r.failed).collect();
        let failed = total - completed.len();

        let average_scores = if completed.is_empty() {
            MetricSet::ZERO
        } else {
            let n = completed.len() as f64;
            MetricSet {
                clarity: round1(completed.iter().map(|r| r.evaluation.clarity).sum::<f64>() / n),
                helpfulness: round1(
                    completed.iter().map(|r| r.evaluation.helpfulness).sum::<f64>() / n,
                ),
                tone: round1(completed.iter().map(|r| r.evaluation.tone).sum::<f64>() / n),
                financial_alignment: round1(
                    completed
                        .iter()
                        .map(|r| r.evaluation.financial_alignment)
                        .sum::<f64>()
                        / n,
                ),
                average: round1(completed.iter().map(|r| r.evaluation.average).sum::<f64>() / n),
            }
        };

        let average_latency_ms = if completed.is_empty() {
            0.0
        } else {
            round1(
                completed.iter().map(|r| r.latency_ms as f64).sum::<f64>()
                    / completed.len() as f64,
            )
        };

        let ai_usage_rate = if total == 0 {
            0.0
        } else {
            round1(100.0 * results.iter().filter(|r| r.used_ai).count() as f64 / total as f64)
        };

        Self {
            total_scenarios: total,
            completed_scenarios: completed.len(),
            failed_scenarios: failed,
            average_scores,
            safety_flags_count: results.iter().filter(|r| r.evaluation.safety_flags).count(),
            average_latency_ms,
            ai_usage_rate,
        }
    }
}

/// Lifecycle of a run: created running, transitions exactly once to
/// completed (summary attached) when all scenarios have settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    Running,
    Completed,
    Failed,
}

/// One full experiment: a prompt version executed against the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRun {
    /// Opaque id derived from name, prompt version and a nanosecond timestamp
    pub experiment_id: String,
    pub experiment_name: String,
    pub prompt_version: String,
    /// Dataset version the run executed against; runs are only comparable
    /// within one dataset version. Defaults to empty for runs recorded
    /// before versioning.
    #[serde(default)]
    pub dataset_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub status: ExperimentStatus,
    pub results: Vec<ExperimentResult>,
    /// Present once status is completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExperimentSummary>,
}

/// Per-metric regression flags plus the safety flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionFlags {
    pub clarity: bool,
    pub helpfulness: bool,
    pub tone: bool,
    pub financial_alignment: bool,
    pub average: bool,
    pub safety: bool,
}

impl RegressionFlags {
    /// Count of raised flags
    pub fn count(&self) -> usize {
        [
            self.clarity,
            self.helpfulness,
            self.tone,
            self.financial_alignment,
            self.average,
            self.safety,
        ]
        .iter()
        .filter(|f| **f)
        .count()
    }
}

/// Stateless diff between two completed runs; computed fresh on request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentComparison {
    pub experiment_1_id: String,
    pub experiment_2_id: String,
    pub experiment_1_name: String,
    pub experiment_2_name: String,
    /// Per-metric deltas, exp2 minus exp1
    pub improvements: MetricSet,
    /// exp1 flags minus exp2 flags; positive means fewer flags in exp2
    pub safety_improvement: i64,
    /// exp2 minus exp1 average latency; informational, no sign convention
    pub latency_change_ms: f64,
    /// exp2 minus exp1 AI usage rate, in percentage points
    pub ai_usage_change: f64,
    pub regressions: RegressionFlags,
    pub regression_count: usize,
    pub overall_improvement: bool,
}
