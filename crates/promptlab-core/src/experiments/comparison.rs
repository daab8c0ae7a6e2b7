//! Comparison engine: deterministic diff between two completed runs

use crate::error::{LabError, LabResult};
use crate::eval::heuristic::round1;
use crate::experiments::types::{
    ExperimentComparison, ExperimentRun, ExperimentSummary, MetricSet, RegressionFlags,
};

/// A metric regresses when its delta drops below this threshold on the 0-10
/// scale; smaller dips are treated as noise.
pub const REGRESSION_THRESHOLD: f64 = -0.5;

fn summary_of(run: &ExperimentRun) -> LabResult<&ExperimentSummary> {
    run.summary.as_ref().ok_or_else(|| {
        LabError::invalid_input(format!(
            "experiment '{}' has no summary; only completed runs can be compared",
            run.experiment_id
        ))
    })
}

/// Compare two completed runs. Pure arithmetic over the two summaries; the
/// inputs are never mutated and the comparison is not persisted.
///
/// Comparison always operates on the heuristic-evaluator-derived summaries;
/// judge scores live only in trace records.
pub fn compare_experiments(
    exp1: &ExperimentRun,
    exp2: &ExperimentRun,
) -> LabResult<ExperimentComparison> {
    let s1 = summary_of(exp1)?;
    let s2 = summary_of(exp2)?;

    // Scores only mean the same thing when both runs saw the same scenarios.
    // Empty versions (runs recorded before versioning) are let through.
    if !exp1.dataset_version.is_empty()
        && !exp2.dataset_version.is_empty()
        && exp1.dataset_version != exp2.dataset_version
    {
        return Err(LabError::invalid_input(format!(
            "runs used different dataset versions ('{}' vs '{}') and cannot be compared",
            exp1.dataset_version, exp2.dataset_version
        )));
    }

    let a = s1.average_scores;
    let b = s2.average_scores;
    let improvements = MetricSet {
        clarity: round1(b.clarity - a.clarity),
        helpfulness: round1(b.helpfulness - a.helpfulness),
        tone: round1(b.tone - a.tone),
        financial_alignment: round1(b.financial_alignment - a.financial_alignment),
        average: round1(b.average - a.average),
    };

    let safety_improvement = s1.safety_flags_count as i64 - s2.safety_flags_count as i64;

    let regressed = |delta: f64| delta < REGRESSION_THRESHOLD;
    let regressions = RegressionFlags {
        clarity: regressed(improvements.clarity),
        helpfulness: regressed(improvements.helpfulness),
        tone: regressed(improvements.tone),
        financial_alignment: regressed(improvements.financial_alignment),
        // Kept as an independent check even though a positive average delta
        // can never also cross the threshold; both checks are part of the
        // comparison contract.
        average: regressed(improvements.average),
        safety: safety_improvement < 0,
    };

    let overall_improvement =
        improvements.average > 0.0 && !regressions.safety && !regressions.average;

    Ok(ExperimentComparison {
        experiment_1_id: exp1.experiment_id.clone(),
        experiment_2_id: exp2.experiment_id.clone(),
        experiment_1_name: exp1.experiment_name.clone(),
        experiment_2_name: exp2.experiment_name.clone(),
        improvements,
        safety_improvement,
        latency_change_ms: round1(s2.average_latency_ms - s1.average_latency_ms),
        ai_usage_change: round1(s2.ai_usage_rate - s1.ai_usage_rate),
        regression_count: regressions.count(),
        regressions,
        overall_improvement,
    })
}
