//! LLM-as-judge metrics for RAG answers.
//!
//! Each metric asks the judge for one verdict per item (context node,
//! sentence, statement or claim) and computes the score from the verdicts,
//! so the number does not depend on the judge doing arithmetic.

use super::judge::{JudgeModel, from_schema};
use super::test_case::LlmTestCase;
use crate::error::Result;
use crate::llm::{Generator, Prompts, fill};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// The five supported metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ContextualPrecision,
    ContextualRecall,
    ContextualRelevancy,
    AnswerRelevancy,
    Faithfulness,
}

impl MetricKind {
    /// All metrics in the order they are reported.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::ContextualPrecision,
        MetricKind::ContextualRecall,
        MetricKind::ContextualRelevancy,
        MetricKind::AnswerRelevancy,
        MetricKind::Faithfulness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::ContextualPrecision => "Contextual Precision",
            MetricKind::ContextualRecall => "Contextual Recall",
            MetricKind::ContextualRelevancy => "Contextual Relevancy",
            MetricKind::AnswerRelevancy => "Answer Relevancy",
            MetricKind::Faithfulness => "Faithfulness",
        }
    }

    /// Judge prompt for this metric filled with the test case.
    pub fn prompt(&self, case: &LlmTestCase) -> String {
        let context = case.numbered_context();
        match self {
            MetricKind::ContextualPrecision => fill(
                Prompts::contextual_precision(),
                &[
                    ("input", case.input.as_str()),
                    ("expected_output", case.expected_output.as_str()),
                    ("retrieval_context", context.as_str()),
                ],
            ),
            MetricKind::ContextualRecall => fill(
                Prompts::contextual_recall(),
                &[
                    ("expected_output", case.expected_output.as_str()),
                    ("retrieval_context", context.as_str()),
                ],
            ),
            MetricKind::ContextualRelevancy => fill(
                Prompts::contextual_relevancy(),
                &[("input", case.input.as_str()), ("retrieval_context", context.as_str())],
            ),
            MetricKind::AnswerRelevancy => fill(
                Prompts::answer_relevancy(),
                &[
                    ("input", case.input.as_str()),
                    ("actual_output", case.actual_output.as_str()),
                ],
            ),
            MetricKind::Faithfulness => fill(
                Prompts::faithfulness(),
                &[
                    ("actual_output", case.actual_output.as_str()),
                    ("retrieval_context", context.as_str()),
                ],
            ),
        }
    }

    /// Whether a verdict counts in the answer's favour. Answer relevancy and
    /// faithfulness only penalise an explicit "no".
    pub fn is_favourable(&self, verdict: Verdict) -> bool {
        match self {
            MetricKind::AnswerRelevancy | MetricKind::Faithfulness => verdict != Verdict::No,
            _ => verdict == Verdict::Yes,
        }
    }

    /// Score in [0, 1] computed from the judge's verdicts.
    pub fn score(&self, verdicts: &[Verdict]) -> f64 {
        let favourable = |v: Verdict| self.is_favourable(v);
        let score = match self {
            MetricKind::ContextualPrecision => weighted_precision(verdicts),
            MetricKind::ContextualRecall | MetricKind::ContextualRelevancy => {
                fraction(verdicts, favourable, 0.0)
            }
            MetricKind::AnswerRelevancy | MetricKind::Faithfulness => {
                fraction(verdicts, favourable, 1.0)
            }
        };
        score.clamp(0.0, 1.0)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single judge verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Yes,
    No,
    Idk,
}

impl Verdict {
    /// Parse a verdict string, treating anything unrecognised as "idk".
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Verdict::Yes,
            "no" | "false" => Verdict::No,
            _ => Verdict::Idk,
        }
    }
}

/// Share of verdicts satisfying `favourable`, or `empty` when there are none.
fn fraction(verdicts: &[Verdict], favourable: impl Fn(Verdict) -> bool, empty: f64) -> f64 {
    if verdicts.is_empty() {
        return empty;
    }
    let count = verdicts.iter().filter(|v| favourable(**v)).count();
    count as f64 / verdicts.len() as f64
}

/// Mean of precision@k over the ranks that hold a relevant node.
fn weighted_precision(verdicts: &[Verdict]) -> f64 {
    let mut relevant = 0usize;
    let mut sum = 0.0;

    for (rank, verdict) in verdicts.iter().enumerate() {
        if *verdict == Verdict::Yes {
            relevant += 1;
            sum += relevant as f64 / (rank + 1) as f64;
        }
    }

    if relevant == 0 {
        0.0
    } else {
        sum / relevant as f64
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    verdict: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdicts {
    #[serde(default)]
    verdicts: Vec<RawVerdict>,
    #[serde(default)]
    reason: String,
}

/// Outcome of one metric on one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: MetricKind,
    pub score: f64,
    pub reason: String,
    /// Number of verdicts the score was computed from.
    pub verdicts: usize,
}

/// A metric bound to the model that judges it.
pub struct JudgeMetric {
    kind: MetricKind,
    model: Arc<dyn JudgeModel>,
}

impl JudgeMetric {
    pub fn new(kind: MetricKind, model: Arc<dyn JudgeModel>) -> Self {
        Self { kind, model }
    }

    /// One metric of each kind, all judged by `model`.
    pub fn all(model: Arc<dyn JudgeModel>) -> Vec<Self> {
        MetricKind::ALL
            .into_iter()
            .map(|kind| Self::new(kind, model.clone()))
            .collect()
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Score a test case.
    pub async fn measure(&self, case: &LlmTestCase) -> Result<MetricResult> {
        let prompt = self.kind.prompt(case);
        let raw: RawVerdicts = from_schema(self.model.generate_with_schema(&prompt).await?)?;

        let verdicts: Vec<Verdict> = raw
            .verdicts
            .iter()
            .map(|v| Verdict::parse(&v.verdict))
            .collect();
        let score = self.kind.score(&verdicts);

        let reason = if raw.reason.trim().is_empty() {
            format!(
                "The score is {:.2}: {} of {} verdicts were favourable.",
                score,
                verdicts.iter().filter(|v| self.kind.is_favourable(**v)).count(),
                verdicts.len()
            )
        } else {
            raw.reason.trim().to_string()
        };

        info!(
            metric = self.kind.name(),
            score,
            judge = self.model.model_name(),
            "measured"
        );

        Ok(MetricResult {
            metric: self.kind,
            score,
            reason,
            verdicts: verdicts.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Canned(String);

    #[async_trait]
    impl Generator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    impl JudgeModel for Canned {
        fn load_model(&self) -> &dyn Generator {
            self
        }
    }

    fn metric(kind: MetricKind, reply: &str) -> JudgeMetric {
        JudgeMetric::new(kind, Arc::new(Canned(reply.to_string())))
    }

    fn case() -> LlmTestCase {
        LlmTestCase::new("q", "a", "e", vec!["node one".into(), "node two".into()])
    }

    #[test]
    fn test_weighted_precision() {
        use Verdict::*;
        assert_eq!(weighted_precision(&[Yes, Yes]), 1.0);
        assert_eq!(weighted_precision(&[No, No]), 0.0);
        // (1/2 + 2/3) / 2
        let score = weighted_precision(&[No, Yes, Yes]);
        assert!((score - 0.583_333).abs() < 1e-5);
        assert!(weighted_precision(&[Yes, No]) > weighted_precision(&[No, Yes]));
    }

    #[test]
    fn test_empty_verdicts() {
        assert_eq!(MetricKind::ContextualPrecision.score(&[]), 0.0);
        assert_eq!(MetricKind::ContextualRecall.score(&[]), 0.0);
        assert_eq!(MetricKind::ContextualRelevancy.score(&[]), 0.0);
        assert_eq!(MetricKind::AnswerRelevancy.score(&[]), 1.0);
        assert_eq!(MetricKind::Faithfulness.score(&[]), 1.0);
    }

    #[test]
    fn test_idk_counts_differently() {
        use Verdict::*;
        let verdicts = [Yes, Idk, No, Yes];
        assert_eq!(MetricKind::ContextualRecall.score(&verdicts), 0.5);
        assert_eq!(MetricKind::Faithfulness.score(&verdicts), 0.75);
    }

    #[test]
    fn test_metric_names_on_command_line() {
        assert_eq!(
            MetricKind::from_str("answer-relevancy", false).unwrap(),
            MetricKind::AnswerRelevancy
        );
        assert_eq!(
            MetricKind::from_str("Contextual-Precision", true).unwrap(),
            MetricKind::ContextualPrecision
        );
        assert!(MetricKind::from_str("bleu", false).is_err());
    }

    #[test]
    fn test_verdict_parse() {
        assert_eq!(Verdict::parse(" YES "), Verdict::Yes);
        assert_eq!(Verdict::parse("no"), Verdict::No);
        assert_eq!(Verdict::parse("maybe"), Verdict::Idk);
    }

    #[test]
    fn test_prompts_carry_case_fields() {
        let case = LlmTestCase::new(
            "which books?",
            "Russel and Norvig",
            "Text Books: AIMA",
            vec!["References: Rich & Knight".into()],
        );
        let precision = MetricKind::ContextualPrecision.prompt(&case);
        assert!(precision.contains("which books?"));
        assert!(precision.contains("Text Books: AIMA"));
        assert!(precision.contains("Node 1:\nReferences: Rich & Knight"));

        let faithfulness = MetricKind::Faithfulness.prompt(&case);
        assert!(faithfulness.contains("Russel and Norvig"));
        assert!(!faithfulness.contains("{actual_output}"));
    }

    #[tokio::test]
    async fn test_measure_uses_judge_reason() {
        let reply = r#"```json
{"verdicts": [{"verdict": "yes", "reason": "r"}, {"verdict": "no", "reason": "r"}],
 "reason": "The first node lists the text books."}
```"#;
        let result = metric(MetricKind::ContextualPrecision, reply)
            .measure(&case())
            .await
            .unwrap();
        assert_eq!(result.score, 1.0);
        assert_eq!(result.verdicts, 2);
        assert_eq!(result.reason, "The first node lists the text books.");
    }

    #[tokio::test]
    async fn test_measure_falls_back_to_generated_reason() {
        let reply = r#"{"verdicts": [{"verdict": "yes"}, {"verdict": "no"}]}"#;
        let result = metric(MetricKind::ContextualRecall, reply)
            .measure(&case())
            .await
            .unwrap();
        assert_eq!(result.score, 0.5);
        assert!(result.reason.contains("0.50"));
    }

    #[tokio::test]
    async fn test_measure_propagates_parse_errors() {
        let result = metric(MetricKind::Faithfulness, "I cannot judge this.")
            .measure(&case())
            .await;
        assert!(result.is_err());
    }
}
