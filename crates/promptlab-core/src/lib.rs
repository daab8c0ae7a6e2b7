//! Promptlab core library
//!
//! Evaluation and experimentation engine for the FinCoach assistant:
//! a heuristic scorer for AI coach responses, an optional LLM judge, an
//! experiment runner over a fixed scenario dataset, and a comparison engine
//! that detects regressions between two runs.

pub mod config;
pub mod error;
pub mod eval;
pub mod experiments;
pub mod llm;
pub mod trace;

// Re-export commonly used types
pub use config::{find_prompt_version, EvalConfig, PromptVersion, PROMPT_VERSIONS};
pub use error::{LabError, LabResult};
pub use eval::{
    evaluate_insight, evaluate_response, scenarios, EvalScenario, EvaluationScores, Insight,
    InsightType, JudgeEvaluation, JudgeEvaluator, UserProfile,
};
pub use experiments::{
    compare_experiments, ExperimentComparison, ExperimentRequest, ExperimentRun, ExperimentRunner,
    ExperimentStatus, ExperimentSummary, MetricSet, RegressionFlags,
};
pub use llm::{
    ChatMessage, Generation, GenerationClient, GenerationError, GenerationRequest, TextGenerator,
};
pub use trace::{JsonlTraceRecorder, MemoryTraceRecorder, TraceEntry, TraceRecorder};
