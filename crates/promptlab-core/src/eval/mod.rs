//! Response evaluation: fixed dataset, heuristic scorer, optional LLM judge

pub mod dataset;
pub mod heuristic;
pub mod judge;

pub use dataset::{scenario_by_id, scenarios, EvalScenario, Transaction, UserProfile, DATASET_VERSION};
pub use heuristic::{evaluate_insight, evaluate_response, EvaluationScores, Insight, InsightType};
pub use judge::{JudgeEvaluation, JudgeEvaluator};
