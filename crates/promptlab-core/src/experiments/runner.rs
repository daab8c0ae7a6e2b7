//! Experiment runner
//!
//! Executes the fixed scenario dataset (or a subset) against one prompt
//! version. Scenarios run sequentially; one scenario's failure never aborts
//! the run. Callers always receive a complete run, except for pre-flight
//! validation errors.

use crate::config::{find_prompt_version, EvalConfig, PromptVersion};
use crate::error::{LabError, LabResult};
use crate::eval::dataset::{scenarios, EvalScenario, DATASET_VERSION};
use crate::eval::heuristic::{evaluate_response, EvaluationScores};
use crate::eval::judge::JudgeEvaluator;
use crate::experiments::types::{
    ExperimentResult, ExperimentRun, ExperimentStatus, ExperimentSummary,
};
use crate::llm::{GenerationClient, GenerationRequest, TextGenerator};
use crate::trace::{EvaluatorTag, TraceEntry, TraceRecorder};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Fallback response scored and logged when generation fails, so evaluation
/// never operates on missing text
const PLACEHOLDER_RESPONSE: &str = "I can't give you a personalized answer right now. A good \
default: review last month's spending by category and set one concrete limit for the coming week.";

/// Request to run one experiment
#[derive(Debug, Clone)]
pub struct ExperimentRequest {
    pub experiment_name: String,
    pub prompt_version: String,
    pub model_version: Option<String>,
    /// When set, only matching dataset ids run; unknown ids are skipped
    pub scenario_ids: Option<Vec<String>>,
}

impl ExperimentRequest {
    pub fn new(experiment_name: impl Into<String>, prompt_version: impl Into<String>) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            prompt_version: prompt_version.into(),
            model_version: None,
            scenario_ids: None,
        }
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = Some(model_version.into());
        self
    }

    pub fn with_scenario_ids(mut self, ids: Vec<String>) -> Self {
        self.scenario_ids = Some(ids);
        self
    }
}

/// Runs experiments against the evaluation dataset.
///
/// Owns `ExperimentRun` construction and its single completion mutation;
/// everything else it touches is injected and shared read-only.
pub struct ExperimentRunner {
    client: GenerationClient,
    judge: Option<JudgeEvaluator>,
    recorder: Arc<dyn TraceRecorder>,
    dataset: Arc<Vec<EvalScenario>>,
}

impl ExperimentRunner {
    /// Create a runner over the fixed dataset
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        recorder: Arc<dyn TraceRecorder>,
        config: &EvalConfig,
    ) -> Self {
        let client = GenerationClient::new(generator.clone(), config.generation_timeout)
            .with_max_retries(config.generation_max_retries);
        let judge = config
            .judge_enabled
            .then(|| JudgeEvaluator::new(generator, config));
        Self {
            client,
            judge,
            recorder,
            dataset: Arc::new(scenarios().to_vec()),
        }
    }

    /// Replace the dataset (tests, alternate fixture packs)
    pub fn with_dataset(mut self, dataset: Vec<EvalScenario>) -> Self {
        self.dataset = Arc::new(dataset);
        self
    }

    /// Run the full dataset (or the requested subset) against one prompt
    /// version, producing a completed run.
    #[instrument(skip(self), fields(name = %request.experiment_name, version = %request.prompt_version))]
    pub async fn run_experiment(&self, request: ExperimentRequest) -> LabResult<ExperimentRun> {
        if request.experiment_name.trim().is_empty() {
            return Err(LabError::invalid_input("experiment name must not be empty"));
        }
        let version = find_prompt_version(&request.prompt_version).ok_or_else(|| {
            LabError::invalid_input(format!(
                "unrecognized prompt version '{}'",
                request.prompt_version
            ))
        })?;

        let selected = self.select_scenarios(request.scenario_ids.as_deref());
        let experiment_id = derive_experiment_id(&request.experiment_name, version.id);

        let mut run = ExperimentRun {
            experiment_id: experiment_id.clone(),
            experiment_name: request.experiment_name.clone(),
            prompt_version: version.id.to_string(),
            dataset_version: DATASET_VERSION.to_string(),
            model_version: request.model_version.clone(),
            start_time: Utc::now().to_rfc3339(),
            end_time: None,
            status: ExperimentStatus::Running,
            results: Vec::with_capacity(selected.len()),
            summary: None,
        };

        for scenario in selected {
            // Scenario boundary: errors escaping the pipeline, including a
            // panic in an injected generator or recorder, become a synthetic
            // failed result and the run keeps going.
            let outcome = AssertUnwindSafe(
                self.run_scenario(&experiment_id, &run, version, scenario),
            )
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(LabError::Other(format!(
                    "scenario panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });
            let result = match outcome {
                Ok(result) => result,
                Err(error) => {
                    warn!(scenario = %scenario.id, error = %error, "scenario failed");
                    ExperimentResult {
                        scenario_id: scenario.id.clone(),
                        scenario_name: scenario.name.clone(),
                        trace_id: Uuid::new_v4().to_string(),
                        evaluation: EvaluationScores::failed(error.to_string()),
                        latency_ms: 0,
                        used_ai: false,
                        error: Some(error.to_string()),
                        failed: true,
                    }
                }
            };
            run.results.push(result);
        }

        // The single completion mutation: summary attached, end time set.
        run.summary = Some(ExperimentSummary::from_results(&run.results));
        run.status = ExperimentStatus::Completed;
        run.end_time = Some(Utc::now().to_rfc3339());

        debug!(
            experiment_id = %run.experiment_id,
            total = run.results.len(),
            "experiment completed"
        );
        Ok(run)
    }

    fn select_scenarios(&self, ids: Option<&[String]>) -> Vec<&EvalScenario> {
        match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.dataset.iter().find(|s| &s.id == id))
                .collect(),
            None => self.dataset.iter().collect(),
        }
    }

    async fn run_scenario(
        &self,
        experiment_id: &str,
        run: &ExperimentRun,
        version: &PromptVersion,
        scenario: &EvalScenario,
    ) -> LabResult<ExperimentResult> {
        let trace_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let prompt = version.build_coach_prompt(&scenario.profile, &scenario.question);
        let (used_ai, response_text, token_usage, error) =
            match self.client.generate(GenerationRequest::new(prompt)).await {
                Ok(generation) => (true, generation.reply_text(), generation.usage, None),
                Err(generation_error) => {
                    warn!(
                        scenario = %scenario.id,
                        error = %generation_error,
                        "generation failed; scoring placeholder response"
                    );
                    (
                        false,
                        PLACEHOLDER_RESPONSE.to_string(),
                        None,
                        Some(generation_error.to_string()),
                    )
                }
            };

        let evaluation = evaluate_response(&response_text, &scenario.question, &scenario.profile);
        let latency_ms = started.elapsed().as_millis() as u64;

        self.record_or_warn(TraceEntry::Generation {
            trace_id: trace_id.clone(),
            experiment_id: experiment_id.to_string(),
            experiment_name: run.experiment_name.clone(),
            prompt_version: run.prompt_version.clone(),
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            input: scenario.question.clone(),
            output: response_text.clone(),
            latency_ms,
            used_ai,
            evaluation_average: evaluation.average,
            token_usage,
            error: error.clone(),
            timestamp: Utc::now().to_rfc3339(),
        })
        .await;

        self.record_or_warn(TraceEntry::Evaluation {
            trace_id: trace_id.clone(),
            experiment_id: experiment_id.to_string(),
            scenario_id: scenario.id.clone(),
            evaluator: EvaluatorTag::Heuristic,
            scores: evaluation.clone(),
            timestamp: Utc::now().to_rfc3339(),
        })
        .await;

        // Judge scores are logged as a second, distinct record; they never
        // replace the heuristic evaluation in the result.
        if let Some(judge) = &self.judge {
            if let Some(judge_scores) = judge
                .evaluate(&scenario.question, &response_text, &scenario.profile)
                .await
            {
                self.record_or_warn(TraceEntry::Evaluation {
                    trace_id: trace_id.clone(),
                    experiment_id: experiment_id.to_string(),
                    scenario_id: scenario.id.clone(),
                    evaluator: EvaluatorTag::LlmJudge,
                    scores: judge_scores.as_scores_0_to_10(),
                    timestamp: Utc::now().to_rfc3339(),
                })
                .await;
            }
        }

        Ok(ExperimentResult {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            trace_id,
            evaluation,
            latency_ms,
            used_ai,
            error,
            failed: false,
        })
    }

    /// Trace recording is awaited for determinism but never fatal
    async fn record_or_warn(&self, entry: TraceEntry) {
        if let Err(error) = self.recorder.record(entry).await {
            warn!(error = %error, "failed to record trace entry; continuing");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

fn derive_experiment_id(name: &str, prompt_version: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{}-{}", slug.trim_matches('-'), prompt_version, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Generation, GenerationError};
    use crate::trace::{FailingTraceRecorder, MemoryTraceRecorder};
    use async_trait::async_trait;

    /// Answers coach prompts with decent text and judge prompts with valid JSON
    struct RoutedGenerator;

    #[async_trait]
    impl TextGenerator for RoutedGenerator {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<Generation, GenerationError> {
            let is_judge = request
                .messages
                .first()
                .map(|m| m.content.contains("strict evaluator"))
                .unwrap_or(false);
            if is_judge {
                Ok(Generation::new(
                    r#"{"clarity": 4, "helpfulness": 4, "tone": 5, "financialAlignment": 3, "safetyFlags": false, "reasoning": "Solid."}"#,
                ))
            } else {
                Ok(Generation::new(
                    "Consider a weekly cap and one small step toward your emergency fund. \
You're doing fine; progress beats perfection.",
                ))
            }
        }
    }

    /// Simulates a defect in a generator adapter
    struct PanickingGenerator;

    #[async_trait]
    impl TextGenerator for PanickingGenerator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<Generation, GenerationError> {
            panic!("defect in generation adapter")
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl TextGenerator for AlwaysFails {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<Generation, GenerationError> {
            Err(GenerationError::Provider("backend unavailable".to_string()))
        }
    }

    fn request() -> ExperimentRequest {
        ExperimentRequest::new("Baseline sweep", "v1-baseline")
    }

    #[tokio::test]
    async fn test_run_full_dataset_completes() {
        let recorder = Arc::new(MemoryTraceRecorder::new());
        let runner = ExperimentRunner::new(
            Arc::new(RoutedGenerator),
            recorder.clone(),
            &EvalConfig::default(),
        );

        let run = runner.run_experiment(request()).await.unwrap();
        assert_eq!(run.status, ExperimentStatus::Completed);
        assert_eq!(run.results.len(), scenarios().len());
        assert_eq!(run.dataset_version, DATASET_VERSION);
        assert!(run.end_time.is_some());

        let summary = run.summary.unwrap();
        assert_eq!(summary.total_scenarios, scenarios().len());
        assert_eq!(
            summary.completed_scenarios + summary.failed_scenarios,
            summary.total_scenarios
        );
        assert_eq!(summary.ai_usage_rate, 100.0);

        // One generation and one heuristic evaluation entry per scenario.
        let entries = recorder.entries().await;
        assert_eq!(entries.len(), scenarios().len() * 2);
    }

    #[tokio::test]
    async fn test_subset_by_ids_with_unknown_ids_skipped() {
        let runner = ExperimentRunner::new(
            Arc::new(RoutedGenerator),
            Arc::new(MemoryTraceRecorder::new()),
            &EvalConfig::default(),
        );

        let run = runner
            .run_experiment(request().with_scenario_ids(vec![
                "overspender-dining".to_string(),
                "does-not-exist".to_string(),
                "debt-payoff-order".to_string(),
            ]))
            .await
            .unwrap();

        assert_eq!(run.results.len(), 2);
        assert_eq!(run.results[0].scenario_id, "overspender-dining");
        assert_eq!(run.results[1].scenario_id, "debt-payoff-order");
    }

    #[tokio::test]
    async fn test_every_generation_failing_still_completes_the_run() {
        let runner = ExperimentRunner::new(
            Arc::new(AlwaysFails),
            Arc::new(MemoryTraceRecorder::new()),
            &EvalConfig::default(),
        );

        let run = runner.run_experiment(request()).await.unwrap();
        assert_eq!(run.status, ExperimentStatus::Completed);
        assert_eq!(run.results.len(), scenarios().len());

        // Fallback responses complete the scenario; nothing is marked failed.
        let summary = run.summary.unwrap();
        assert_eq!(summary.failed_scenarios, 0);
        assert_eq!(summary.ai_usage_rate, 0.0);
        for result in &run.results {
            assert!(!result.used_ai);
            assert!(result.error.is_some());
            assert!(!result.failed);
        }
    }

    #[tokio::test]
    async fn test_panicking_generator_becomes_synthetic_failed_result() {
        let recorder = Arc::new(MemoryTraceRecorder::new());
        let runner = ExperimentRunner::new(
            Arc::new(PanickingGenerator),
            recorder.clone(),
            &EvalConfig::default(),
        );

        let run = runner
            .run_experiment(request().with_scenario_ids(vec!["overspender-dining".to_string()]))
            .await
            .unwrap();

        assert_eq!(run.status, ExperimentStatus::Completed);
        assert_eq!(run.results.len(), 1);
        let result = &run.results[0];
        assert!(result.failed);
        assert!(!result.used_ai);
        assert!(result.evaluation.safety_flags);
        assert!(result.error.as_deref().unwrap().contains("defect in generation adapter"));

        let summary = run.summary.unwrap();
        assert_eq!(summary.failed_scenarios, 1);
        assert_eq!(summary.completed_scenarios, 0);
    }

    #[tokio::test]
    async fn test_panicking_scenario_does_not_abort_the_rest_of_the_run() {
        let runner = ExperimentRunner::new(
            Arc::new(PanickingGenerator),
            Arc::new(MemoryTraceRecorder::new()),
            &EvalConfig::default(),
        );

        let run = runner.run_experiment(request()).await.unwrap();
        assert_eq!(run.results.len(), scenarios().len());
        assert!(run.results.iter().all(|r| r.failed));
        assert_eq!(run.summary.unwrap().failed_scenarios, scenarios().len());
    }

    #[tokio::test]
    async fn test_judge_enabled_logs_distinct_evaluation_records() {
        let recorder = Arc::new(MemoryTraceRecorder::new());
        let runner = ExperimentRunner::new(
            Arc::new(RoutedGenerator),
            recorder.clone(),
            &EvalConfig::default().with_judge(true),
        );

        let run = runner
            .run_experiment(request().with_scenario_ids(vec!["overspender-dining".to_string()]))
            .await
            .unwrap();

        let entries = recorder.entries().await;
        let heuristic: Vec<_> = entries
            .iter()
            .filter(|e| matches!(e, TraceEntry::Evaluation { evaluator: EvaluatorTag::Heuristic, .. }))
            .collect();
        let judged: Vec<_> = entries
            .iter()
            .filter(|e| matches!(e, TraceEntry::Evaluation { evaluator: EvaluatorTag::LlmJudge, .. }))
            .collect();
        assert_eq!(heuristic.len(), 1);
        assert_eq!(judged.len(), 1);

        // Judge scores scaled onto the 0-10 axis in the trace, while the
        // result keeps the heuristic evaluation untouched.
        if let TraceEntry::Evaluation { scores, .. } = judged[0] {
            assert_eq!(scores.average, 8.0);
        }
        assert_ne!(run.results[0].evaluation.average, 8.0);
    }

    #[tokio::test]
    async fn test_trace_failures_do_not_abort_the_run() {
        let runner = ExperimentRunner::new(
            Arc::new(RoutedGenerator),
            Arc::new(FailingTraceRecorder),
            &EvalConfig::default(),
        );

        let run = runner
            .run_experiment(request().with_scenario_ids(vec!["student-budget".to_string()]))
            .await
            .unwrap();
        assert_eq!(run.status, ExperimentStatus::Completed);
        assert_eq!(run.results.len(), 1);
        assert!(!run.results[0].failed);
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_any_scenario_runs() {
        let recorder = Arc::new(MemoryTraceRecorder::new());
        let runner = ExperimentRunner::new(
            Arc::new(RoutedGenerator),
            recorder.clone(),
            &EvalConfig::default(),
        );

        let error = runner
            .run_experiment(ExperimentRequest::new("  ", "v1-baseline"))
            .await
            .unwrap_err();
        assert!(matches!(error, LabError::InvalidInput(_)));
        assert!(recorder.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_prompt_version_rejected() {
        let runner = ExperimentRunner::new(
            Arc::new(RoutedGenerator),
            Arc::new(MemoryTraceRecorder::new()),
            &EvalConfig::default(),
        );

        let error = runner
            .run_experiment(ExperimentRequest::new("Sweep", "v9-unknown"))
            .await
            .unwrap_err();
        assert!(matches!(error, LabError::InvalidInput(_)));
    }

    #[test]
    fn test_experiment_ids_are_unique_per_call() {
        let a = derive_experiment_id("Baseline sweep", "v1-baseline");
        let b = derive_experiment_id("Baseline sweep", "v1-baseline");
        assert!(a.starts_with("baseline-sweep-v1-baseline-"));
        assert_ne!(a, b);
    }
}
