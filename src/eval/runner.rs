//! Runs metrics over test cases, one at a time.

use super::metrics::{JudgeMetric, MetricResult};
use super::test_case::LlmTestCase;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// All metric results for one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// 1-based position of the case in the run.
    pub case_number: usize,
    pub input: String,
    pub results: Vec<MetricResult>,
}

impl CaseReport {
    /// Print each metric's score and reason.
    pub fn print(&self) {
        println!("\n========== Test Case {} ==========", self.case_number);
        println!("Input: {}", self.input);
        println!("----------------------------------------");
        for result in &self.results {
            println!("{} Score: {}", result.metric.name(), result.score);
            println!("Reason: {}", result.reason);
        }
    }
}

/// Results of an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub judge_model: String,
    pub cases: Vec<CaseReport>,
    pub total_time_secs: f64,
}

/// Score each case with every metric, sequentially.
///
/// The first failing metric call aborts the run.
pub async fn evaluate(
    metrics: &[JudgeMetric],
    cases: &[(usize, LlmTestCase)],
    judge_model: &str,
) -> Result<EvaluationReport> {
    let start = Instant::now();
    let mut reports = Vec::with_capacity(cases.len());

    for (case_number, case) in cases {
        let mut results = Vec::with_capacity(metrics.len());
        for metric in metrics {
            results.push(metric.measure(case).await?);
        }
        reports.push(CaseReport {
            case_number: *case_number,
            input: case.input.clone(),
            results,
        });
    }

    Ok(EvaluationReport {
        judge_model: judge_model.to_string(),
        cases: reports,
        total_time_secs: start.elapsed().as_secs_f64(),
    })
}
