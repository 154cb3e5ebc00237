//! Prompts for syllabus answering and judge metrics.
//!
//! Placeholders are written as `{name}` and filled with [`fill`], which
//! substitutes in a single pass so braces inside the substituted text are
//! left alone.

/// Collection of prompts used by the query pipeline and the evaluation metrics.
pub struct Prompts;

impl Prompts {
    /// Template for answering a question from retrieved syllabus context.
    pub fn syllabus_answer() -> &'static str {
        "
You are a helpful assistant that helps students by giving answers to syllabus-related queries.
You are given a context below. Give an answer to the question below using only information from this context.

{context}

---

Answer the question based on the above context: {question}
"
    }

    /// Judge whether each retrieval-context node was useful for the expected output.
    pub fn contextual_precision() -> &'static str {
        r#"Given the input, expected output, and retrieval context, determine for EACH node in the retrieval context whether it was useful in arriving at the expected output.

Input:
{input}

Expected output:
{expected_output}

Retrieval context (in rank order):
{retrieval_context}

Return JSON with exactly one verdict per node, in the same order:
{
    "verdicts": [
        {"verdict": "<yes or no>", "reason": "<why the node is or is not useful>"}
    ],
    "reason": "<concise explanation of the overall precision, referring to nodes by rank>"
}
Directly return the final JSON structure. Do not output anything else."#
    }

    /// Judge whether each sentence of the expected output is attributable to the retrieval context.
    pub fn contextual_recall() -> &'static str {
        r#"For EACH sentence in the expected output below, determine whether the sentence can be attributed to the nodes of the retrieval context.

Expected output:
{expected_output}

Retrieval context:
{retrieval_context}

Return JSON:
{
    "verdicts": [
        {"verdict": "<yes or no>", "reason": "<which node supports it, or why none does>"}
    ],
    "reason": "<concise explanation of the overall recall>"
}
Directly return the final JSON structure. Do not output anything else."#
    }

    /// Judge whether each statement in the retrieval context is relevant to the input.
    pub fn contextual_relevancy() -> &'static str {
        r#"Break the retrieval context below into individual statements. For EACH statement, determine whether it is relevant to the input.

Input:
{input}

Retrieval context:
{retrieval_context}

Return JSON:
{
    "verdicts": [
        {"statement": "<statement>", "verdict": "<yes or no>", "reason": "<why>"}
    ],
    "reason": "<concise explanation of the overall relevancy>"
}
Directly return the final JSON structure. Do not output anything else."#
    }

    /// Judge whether each statement in the actual output addresses the input.
    pub fn answer_relevancy() -> &'static str {
        r#"Break the actual output below into individual statements. For EACH statement, determine whether it is relevant to addressing the input. Use "idk" for statements that are ambiguous but could support the answer.

Input:
{input}

Actual output:
{actual_output}

Return JSON:
{
    "verdicts": [
        {"statement": "<statement>", "verdict": "<yes, no or idk>", "reason": "<why, required for no>"}
    ],
    "reason": "<concise explanation of the overall answer relevancy>"
}
Directly return the final JSON structure. Do not output anything else."#
    }

    /// Judge whether each claim in the actual output is contradicted by the retrieval context.
    pub fn faithfulness() -> &'static str {
        r#"Extract the factual claims made in the actual output. For EACH claim, determine whether it agrees with the retrieval context. Answer "no" ONLY if the context directly contradicts the claim; answer "idk" if the context does not mention it.

Actual output:
{actual_output}

Retrieval context:
{retrieval_context}

Return JSON:
{
    "verdicts": [
        {"claim": "<claim>", "verdict": "<yes, no or idk>", "reason": "<required for no>"}
    ],
    "reason": "<concise explanation of the overall faithfulness>"
}
Directly return the final JSON structure. Do not output anything else."#
    }
}

/// Substitute `{key}` placeholders in one pass.
///
/// Unknown placeholders are kept verbatim, and substituted values are never
/// scanned for further placeholders.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_not_empty() {
        assert!(!Prompts::syllabus_answer().is_empty());
        assert!(!Prompts::contextual_precision().is_empty());
        assert!(!Prompts::contextual_recall().is_empty());
        assert!(!Prompts::contextual_relevancy().is_empty());
        assert!(!Prompts::answer_relevancy().is_empty());
        assert!(!Prompts::faithfulness().is_empty());
    }

    #[test]
    fn test_fill_replaces_known_keys() {
        let out = fill("a {x} b {y}", &[("x", "1"), ("y", "2")]);
        assert_eq!(out, "a 1 b 2");
    }

    #[test]
    fn test_fill_keeps_json_braces() {
        let out = fill(r#"{"verdict": "{v}"}"#, &[("v", "yes")]);
        assert_eq!(out, r#"{"verdict": "yes"}"#);
    }

    #[test]
    fn test_fill_does_not_expand_substituted_text() {
        let out = fill("{a}|{b}", &[("a", "{b}"), ("b", "B")]);
        assert_eq!(out, "{b}|B");
    }

    #[test]
    fn test_judge_prompts_keep_schema_after_fill() {
        let out = fill(
            Prompts::faithfulness(),
            &[("actual_output", "answer"), ("retrieval_context", "ctx")],
        );
        assert!(out.contains("\"verdicts\""));
        assert!(out.contains("answer"));
        assert!(!out.contains("{actual_output}"));
    }
}
