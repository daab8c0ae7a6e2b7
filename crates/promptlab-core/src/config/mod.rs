//! Explicit configuration for evaluation runs and prompt versions

pub mod evals;
pub mod prompts;

pub use evals::EvalConfig;
pub use prompts::{find_prompt_version, PromptVersion, PROMPT_VERSIONS};
