//! Trace entry types for JSONL experiment logging

use crate::eval::EvaluationScores;
use crate::llm::TokenUsage;
use serde::{Deserialize, Serialize};

/// Which evaluator produced an evaluation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorTag {
    Heuristic,
    LlmJudge,
}

impl std::fmt::Display for EvaluatorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatorTag::Heuristic => write!(f, "heuristic"),
            EvaluatorTag::LlmJudge => write!(f, "llm_judge"),
        }
    }
}

/// A single entry in the experiment trace log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEntry {
    /// One coach-response generation for one scenario
    #[serde(rename = "generation")]
    Generation {
        /// Correlation id shared with the evaluation entries for this scenario
        trace_id: String,
        experiment_id: String,
        experiment_name: String,
        prompt_version: String,
        scenario_id: String,
        scenario_name: String,
        /// Snapshot of the question sent to the coach
        input: String,
        /// Snapshot of the (possibly placeholder) response text
        output: String,
        latency_ms: u64,
        used_ai: bool,
        /// Heuristic average for quick scanning; full scores live in the
        /// paired evaluation entry
        evaluation_average: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        token_usage: Option<TokenUsage>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: String,
    },

    /// One evaluator's scores for one scenario response
    #[serde(rename = "evaluation")]
    Evaluation {
        trace_id: String,
        experiment_id: String,
        scenario_id: String,
        evaluator: EvaluatorTag,
        scores: EvaluationScores,
        timestamp: String,
    },
}

impl TraceEntry {
    /// Correlation id of this entry
    pub fn trace_id(&self) -> &str {
        match self {
            Self::Generation { trace_id, .. } => trace_id,
            Self::Evaluation { trace_id, .. } => trace_id,
        }
    }

    /// Entry type as string
    pub fn entry_type(&self) -> &'static str {
        match self {
            Self::Generation { .. } => "generation",
            Self::Evaluation { .. } => "evaluation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_entry_serialization() {
        let entry = TraceEntry::Evaluation {
            trace_id: "t-1".to_string(),
            experiment_id: "exp-1".to_string(),
            scenario_id: "overspender-dining".to_string(),
            evaluator: EvaluatorTag::LlmJudge,
            scores: EvaluationScores::failed("n/a"),
            timestamp: "2025-07-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"evaluation\""));
        assert!(json.contains("\"evaluator\":\"llm_judge\""));

        let parsed: TraceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entry_type(), "evaluation");
        assert_eq!(parsed.trace_id(), "t-1");
    }
}
