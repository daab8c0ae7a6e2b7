//! Console rendering for runs, comparisons and the scenario list

use colored::Colorize;
use promptlab_core::{EvalScenario, ExperimentComparison, ExperimentRun};

pub fn print_scenarios(scenarios: &[EvalScenario]) {
    println!("{}", "Evaluation dataset".bold());
    for scenario in scenarios {
        let marker = if scenario.should_flag_as_unsafe == Some(true) {
            " [expects safety flag]".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {}  {}{}", scenario.id.cyan(), scenario.name, marker);
        println!("      Q: {}", scenario.question.dimmed());
    }
}

pub fn print_run_summary(run: &ExperimentRun) {
    println!("{} {}", "Experiment".bold(), run.experiment_id.cyan());
    println!(
        "  prompt version: {}   model: {}   dataset: {}",
        run.prompt_version,
        run.model_version.as_deref().unwrap_or("-"),
        if run.dataset_version.is_empty() { "-" } else { &run.dataset_version }
    );

    let Some(summary) = &run.summary else {
        println!("  (no summary)");
        return;
    };

    println!(
        "  scenarios: {} total, {} completed, {} failed",
        summary.total_scenarios, summary.completed_scenarios, summary.failed_scenarios
    );
    let scores = &summary.average_scores;
    println!(
        "  scores: clarity {:.1}  helpfulness {:.1}  tone {:.1}  alignment {:.1}  avg {:.1}",
        scores.clarity, scores.helpfulness, scores.tone, scores.financial_alignment, scores.average
    );
    let safety = if summary.safety_flags_count == 0 {
        format!("{}", "0 safety flags".green())
    } else {
        format!("{}", format!("{} safety flags", summary.safety_flags_count).red())
    };
    println!(
        "  {}   latency {:.0}ms avg   AI usage {:.1}%",
        safety, summary.average_latency_ms, summary.ai_usage_rate
    );
}

fn delta(value: f64) -> String {
    let text = format!("{value:+.1}");
    if value > 0.0 {
        text.green().to_string()
    } else if value < 0.0 {
        text.red().to_string()
    } else {
        text.dimmed().to_string()
    }
}

pub fn print_comparison(comparison: &ExperimentComparison) {
    println!(
        "{} {} -> {}",
        "Comparison".bold(),
        comparison.experiment_1_name.cyan(),
        comparison.experiment_2_name.cyan()
    );

    let imp = &comparison.improvements;
    let reg = &comparison.regressions;
    let row = |label: &str, value: f64, regressed: bool| {
        let flag = if regressed { " REGRESSION".red().to_string() } else { String::new() };
        println!("  {label:<20} {}{}", delta(value), flag);
    };
    row("clarity", imp.clarity, reg.clarity);
    row("helpfulness", imp.helpfulness, reg.helpfulness);
    row("tone", imp.tone, reg.tone);
    row("financial alignment", imp.financial_alignment, reg.financial_alignment);
    row("average", imp.average, reg.average);

    let safety = if comparison.regressions.safety {
        format!("{}", format!("{:+} (REGRESSION)", comparison.safety_improvement).red())
    } else {
        format!("{}", format!("{:+}", comparison.safety_improvement).green())
    };
    println!("  {:<20} {}", "safety flags", safety);
    println!(
        "  {:<20} {:+.1}ms   {:<12} {:+.1}pp",
        "latency", comparison.latency_change_ms, "AI usage", comparison.ai_usage_change
    );

    let verdict = if comparison.overall_improvement {
        "OVERALL IMPROVEMENT".green().bold().to_string()
    } else {
        format!(
            "{} ({} regression{})",
            "NOT AN IMPROVEMENT".yellow().bold(),
            comparison.regression_count,
            if comparison.regression_count == 1 { "" } else { "s" }
        )
    };
    println!("\n  {verdict}");
}
