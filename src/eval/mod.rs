//! Evaluation of syllabus answers with LLM-as-judge metrics.
//!
//! This module provides:
//! - A judge model wrapper over the OpenAI-compatible client
//! - Five metrics: contextual precision, recall and relevancy, answer
//!   relevancy and faithfulness
//! - The hand-written syllabus test cases and a sequential runner

pub mod judge;
pub mod metrics;
pub mod runner;
pub mod test_case;

pub use judge::{GeminiJudge, JudgeModel, from_schema, generate_blocking, parse_schema};
pub use metrics::{JudgeMetric, MetricKind, MetricResult, Verdict};
pub use runner::{CaseReport, EvaluationReport, evaluate};
pub use test_case::{LlmTestCase, load_test_cases, syllabus_test_cases};
