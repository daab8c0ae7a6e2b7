//! End-to-end flow: run two experiments against different response styles,
//! then compare them the way the review dashboard does.

use async_trait::async_trait;
use promptlab_core::llm::GenerationRequest;
use promptlab_core::trace::TraceEntry;
use promptlab_core::{
    compare_experiments, scenarios, EvalConfig, ExperimentRequest, ExperimentRunner, Generation,
    GenerationError, MemoryTraceRecorder, TextGenerator,
};
use std::sync::Arc;

/// Terse, sloppy responses with the occasional outcome promise
struct SloppyCoach;

#[async_trait]
impl TextGenerator for SloppyCoach {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        let question = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if question.contains("crypto") {
            return Ok(Generation::new(
                "Crypto is guaranteed to go up, put everything into it and you can't lose",
            ));
        }
        Ok(Generation::new("just spend less money"))
    }
}

/// Supportive, specific responses that echo the user's goals
struct CarefulCoach;

#[async_trait]
impl TextGenerator for CarefulCoach {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        let system = request.messages.first().map(|m| m.content.clone()).unwrap_or_default();
        // The profile is rendered into the system message; echo its goals back.
        let goals_line = system
            .lines()
            .find(|l| l.contains("Goals:"))
            .unwrap_or("")
            .to_string();
        Ok(Generation::new(format!(
            "You're doing the right thing by asking. Consider one step this week: put $50 toward \
what matters most to you ({goals_line}). No approach is certain, so start small and adjust.",
        )))
    }
}

fn runner(generator: Arc<dyn TextGenerator>, recorder: Arc<MemoryTraceRecorder>) -> ExperimentRunner {
    ExperimentRunner::new(generator, recorder, &EvalConfig::default())
}

#[tokio::test]
async fn careful_prompt_beats_sloppy_prompt() {
    let recorder = Arc::new(MemoryTraceRecorder::new());

    let sloppy_run = runner(Arc::new(SloppyCoach), recorder.clone())
        .run_experiment(ExperimentRequest::new("Sloppy baseline", "v1-baseline"))
        .await
        .unwrap();
    let careful_run = runner(Arc::new(CarefulCoach), recorder.clone())
        .run_experiment(ExperimentRequest::new("Careful candidate", "v2-empathetic"))
        .await
        .unwrap();

    let sloppy_summary = sloppy_run.summary.as_ref().unwrap();
    let careful_summary = careful_run.summary.as_ref().unwrap();

    // The sloppy coach promises outcomes on the crypto scenario.
    assert!(sloppy_summary.safety_flags_count >= 1);
    assert_eq!(careful_summary.safety_flags_count, 0);
    assert!(careful_summary.average_scores.average > sloppy_summary.average_scores.average);

    let comparison = compare_experiments(&sloppy_run, &careful_run).unwrap();
    assert!(comparison.improvements.average > 0.0);
    assert!(comparison.safety_improvement >= 1);
    assert!(!comparison.regressions.safety);
    assert!(comparison.overall_improvement);

    // Reversing the direction flags the safety regression.
    let reversed = compare_experiments(&careful_run, &sloppy_run).unwrap();
    assert!(reversed.regressions.safety);
    assert!(!reversed.overall_improvement);
}

#[tokio::test]
async fn traces_correlate_with_results() {
    let recorder = Arc::new(MemoryTraceRecorder::new());
    let run = runner(Arc::new(CarefulCoach), recorder.clone())
        .run_experiment(ExperimentRequest::new("Trace check", "v1-baseline"))
        .await
        .unwrap();

    let entries = recorder.entries().await;
    assert_eq!(entries.len(), scenarios().len() * 2);

    // Every result's trace id shows up on exactly one generation entry.
    for result in &run.results {
        let matching = entries
            .iter()
            .filter(|e| matches!(e, TraceEntry::Generation { .. }) && e.trace_id() == result.trace_id)
            .count();
        assert_eq!(matching, 1, "scenario {}", result.scenario_id);
    }
}

#[tokio::test]
async fn run_round_trips_through_json() {
    let run = runner(Arc::new(CarefulCoach), Arc::new(MemoryTraceRecorder::new()))
        .run_experiment(
            ExperimentRequest::new("Serde check", "v3-structured")
                .with_model_version("gpt-4o-mini")
                .with_scenario_ids(vec![
                    "overspender-dining".to_string(),
                    "emergency-fund-start".to_string(),
                ]),
        )
        .await
        .unwrap();

    let json = serde_json::to_string_pretty(&run).unwrap();
    let parsed: promptlab_core::ExperimentRun = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.experiment_id, run.experiment_id);
    assert_eq!(parsed.results.len(), 2);
    assert_eq!(
        parsed.summary.as_ref().unwrap().total_scenarios,
        run.summary.as_ref().unwrap().total_scenarios
    );

    // A round-tripped pair still compares cleanly.
    let comparison = compare_experiments(&run, &parsed).unwrap();
    assert_eq!(comparison.regression_count, 0);
    assert!(!comparison.overall_improvement);
}
