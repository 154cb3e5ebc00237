//! Evaluation CLI: score syllabus answers with LLM-as-judge metrics.
//!
//! Usage:
//!   eval                     # Score test case 3 with all five metrics
//!   eval --case 1            # Score a specific built-in test case
//!   eval --case all          # Score every test case
//!
//! Options:
//!   --cases <path>           # Load test cases from a JSON file instead
//!   --metric <name>          # Only run the given metric (repeatable)
//!   --output <path>          # Save results to JSON file

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use syllabus_buddy::config::Config;
use syllabus_buddy::eval::{
    EvaluationReport, GeminiJudge, JudgeMetric, LlmTestCase, MetricKind, evaluate,
    load_test_cases, syllabus_test_cases,
};
use syllabus_buddy::llm::Generator;

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Score syllabus answers with LLM-as-judge metrics", long_about = None)]
struct Cli {
    /// Test case to score: a 1-based number or "all"
    #[arg(short, long, default_value = "3")]
    case: String,

    /// Load test cases from a JSON file instead of the built-in ones
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Only run these metrics
    #[arg(short, long, value_enum)]
    metric: Vec<MetricKind>,

    /// Save results to JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Pick the requested cases, keeping their 1-based numbers.
fn select_cases(cases: Vec<LlmTestCase>, selector: &str) -> Result<Vec<(usize, LlmTestCase)>> {
    let numbered: Vec<(usize, LlmTestCase)> = cases
        .into_iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c))
        .collect();

    if selector.eq_ignore_ascii_case("all") {
        return Ok(numbered);
    }

    let wanted: usize = selector
        .parse()
        .with_context(|| format!("--case must be a number or 'all', got '{}'", selector))?;
    let total = numbered.len();

    numbered
        .into_iter()
        .find(|(n, _)| *n == wanted)
        .map(|case| vec![case])
        .ok_or_else(|| anyhow::anyhow!("No test case {} (have {})", wanted, total))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init()
        .ok();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let cases = match &cli.cases {
        Some(path) => {
            println!("Loading test cases from {:?}...", path);
            load_test_cases(path).context("Failed to load test cases")?
        }
        None => syllabus_test_cases(),
    };
    let selected = select_cases(cases, &cli.case)?;

    let judge = Arc::new(GeminiJudge::new(&config.llm));
    println!("LLM API Base: {}", config.llm.api_base);
    println!("Judge Model: {}", judge.model_name());

    let metrics: Vec<JudgeMetric> = if cli.metric.is_empty() {
        JudgeMetric::all(judge.clone())
    } else {
        cli.metric
            .iter()
            .map(|kind| JudgeMetric::new(*kind, judge.clone()))
            .collect()
    };

    let report: EvaluationReport = evaluate(&metrics, &selected, judge.model_name())
        .await
        .context("Evaluation failed")?;

    for case in &report.cases {
        case.print();
    }
    println!("\nFinished in {:.1}s", report.total_time_secs);

    if let Some(output_path) = cli.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&output_path, json)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        println!("Results saved to {:?}", output_path);
    }

    Ok(())
}
