//! Promptlab CLI
//!
//! Runs prompt experiments against the FinCoach evaluation dataset and
//! compares completed runs for regressions.

mod args;
mod output;

use anyhow::{Context, Result};
use args::{Cli, Command, CompareArgs, RunArgs};
use clap::Parser;
use promptlab_core::llm::{HttpGeneratorConfig, HttpTextGenerator};
use promptlab_core::{
    compare_experiments, scenarios, EvalConfig, ExperimentRequest, ExperimentRun,
    ExperimentRunner, JsonlTraceRecorder,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match cli.command {
        Command::Run(args) => run_command(args).await,
        Command::Compare(args) => compare_command(args),
        Command::Scenarios => {
            output::print_scenarios(scenarios());
            Ok(())
        }
    }
}

async fn run_command(args: RunArgs) -> Result<()> {
    let generator = HttpTextGenerator::new(HttpGeneratorConfig::new(
        &args.api_url,
        &args.api_key,
        &args.model,
    ))
    .map_err(|e| anyhow::anyhow!("failed to set up generation backend: {e}"))?;

    let recorder = JsonlTraceRecorder::new(&args.trace_file)
        .with_context(|| format!("cannot open trace file {}", args.trace_file.display()))?;

    let config = EvalConfig::default().with_judge(args.judge);
    let runner = ExperimentRunner::new(Arc::new(generator), Arc::new(recorder), &config);

    let mut request = ExperimentRequest::new(&args.name, &args.prompt_version)
        .with_model_version(&args.model);
    if !args.scenario_ids.is_empty() {
        request = request.with_scenario_ids(args.scenario_ids.clone());
    }

    let run = runner.run_experiment(request).await?;
    output::print_run_summary(&run);

    let json = serde_json::to_string_pretty(&run)?;
    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, json)
                .with_context(|| format!("cannot write run to {}", path.display()))?;
            println!("\nRun written to {}", path.display());
        }
        None => println!("\n{json}"),
    }
    Ok(())
}

fn compare_command(args: CompareArgs) -> Result<()> {
    let baseline = load_run(&args.baseline)?;
    let candidate = load_run(&args.candidate)?;

    let comparison = compare_experiments(&baseline, &candidate)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        output::print_comparison(&comparison);
    }
    Ok(())
}

fn load_run(path: &std::path::Path) -> Result<ExperimentRun> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read run file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a run file", path.display()))
}
