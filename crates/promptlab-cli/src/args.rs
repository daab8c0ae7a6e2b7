//! Command-line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prompt experimentation lab for the FinCoach assistant
#[derive(Debug, Parser)]
#[command(name = "promptlab", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter, e.g. "info" or "promptlab_core=debug"
    #[arg(long, global = true, default_value = "info", env = "PROMPTLAB_LOG")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the evaluation dataset against one prompt version
    Run(RunArgs),
    /// Compare two completed experiment runs
    Compare(CompareArgs),
    /// List the scenarios in the evaluation dataset
    Scenarios,
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Experiment name, recorded on the run and in traces
    #[arg(long)]
    pub name: String,

    /// Prompt version to execute, e.g. "v2-empathetic"
    #[arg(long)]
    pub prompt_version: String,

    /// Model to request from the generation backend
    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Restrict the run to specific scenario ids (repeatable)
    #[arg(long = "scenario")]
    pub scenario_ids: Vec<String>,

    /// Also score each response with the LLM judge
    #[arg(long)]
    pub judge: bool,

    /// Chat-completions endpoint
    #[arg(
        long,
        env = "PROMPTLAB_API_URL",
        default_value = "https://api.openai.com/v1/chat/completions"
    )]
    pub api_url: String,

    /// API key for the generation backend
    #[arg(long, env = "PROMPTLAB_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Where to write the experiment run JSON (stdout if omitted)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Where to append JSONL trace entries
    #[arg(long, default_value = "traces/promptlab.jsonl")]
    pub trace_file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct CompareArgs {
    /// Path to the baseline run JSON (exp1)
    pub baseline: PathBuf,

    /// Path to the candidate run JSON (exp2)
    pub candidate: PathBuf,

    /// Print the raw comparison JSON instead of the table
    #[arg(long)]
    pub json: bool,
}
