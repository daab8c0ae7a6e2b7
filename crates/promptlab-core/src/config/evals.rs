//! Evaluation run configuration
//!
//! All knobs are explicit values handed to the runner. The core never reads
//! the environment, so tests can toggle behavior deterministically.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one experiment run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Whether to also score each response with the LLM judge
    pub judge_enabled: bool,
    /// Deadline for each coach-response generation call
    #[serde(with = "duration_secs")]
    pub generation_timeout: Duration,
    /// Deadline for each judge call
    #[serde(with = "duration_secs")]
    pub judge_timeout: Duration,
    /// Retries after the first attempt for coach-response generation
    pub generation_max_retries: u32,
    /// Retries after the first attempt for the judge (kept low: the judge is optional)
    pub judge_max_retries: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            judge_enabled: false,
            generation_timeout: Duration::from_secs(30),
            judge_timeout: Duration::from_secs(25),
            generation_max_retries: 2,
            judge_max_retries: 1,
        }
    }
}

impl EvalConfig {
    /// Enable or disable the LLM judge
    pub fn with_judge(mut self, enabled: bool) -> Self {
        self.judge_enabled = enabled;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
