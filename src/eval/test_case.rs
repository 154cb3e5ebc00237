//! Evaluation test cases.

use crate::error::{Result, SyllabusError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One question with the answer to judge and what it should have been.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmTestCase {
    /// The question asked.
    pub input: String,
    /// The answer the system produced.
    pub actual_output: String,
    /// The answer a reviewer wrote by hand.
    pub expected_output: String,
    /// Passages the answer was generated from, in rank order.
    pub retrieval_context: Vec<String>,
}

impl LlmTestCase {
    pub fn new(
        input: impl Into<String>,
        actual_output: impl Into<String>,
        expected_output: impl Into<String>,
        retrieval_context: Vec<String>,
    ) -> Self {
        Self {
            input: input.into(),
            actual_output: actual_output.into(),
            expected_output: expected_output.into(),
            retrieval_context,
        }
    }

    /// Retrieval context rendered as numbered nodes for judge prompts.
    pub fn numbered_context(&self) -> String {
        self.retrieval_context
            .iter()
            .enumerate()
            .map(|(i, node)| format!("Node {}:\n{}", i + 1, node))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Load test cases from a JSON array file.
pub fn load_test_cases(path: &Path) -> Result<Vec<LlmTestCase>> {
    let content = fs::read_to_string(path).map_err(|e| SyllabusError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| SyllabusError::Serialization(format!("invalid test case file: {}", e)))
}

/// The three hand-written syllabus test cases.
pub fn syllabus_test_cases() -> Vec<LlmTestCase> {
    vec![
        LlmTestCase::new(
            "what are the topics included in unit 3 of 'engineering chemistry'?",
            "Unit III (Electrochemistry and Corrosion) covers: electrode potential; types of electrodes (calomel and glass electrodes – construction and working); electrochemical series and applications; electrochemical cells (galvanic & electrolytic cells); Nernst equation – applications, numerical problems; batteries (primary and secondary types, lithium metal, lithium ion and lead acid batteries); types of fuel cells (hydrogen-oxygen fuel cell - applications and advantages, microbial fuel cell); corrosion (definition, causes and effects, theories of chemical and electrochemical corrosion with mechanism, types of corrosion - galvanic, concentration cell and pitting corrosions, factors affecting corrosion (nature of metal & nature of environment), corrosion control methods (proper designing, cathodic protection (sacrificial anodic and impressed current cathodic protection), metallic coatings: hot dipping - galvanization and tinning, electroplating, electroless plating of nickel.",
            "Electrochemistry : Electrode potential, types of electrodes: calomel and glass electrodes - construction and working, electrochemical series and applications, electrochemical cells: Galvanic & electrolytic cells, Nernst equation - applications, numerical problems, Batteries: primary and secondary types, lithium metal, lithium ion and lead acid batteries. Types of Fuel cells: hydrogen -oxygen fuel cell - applications and advantages, microbial fuel cell.",
            vec![
                r#"UNIT III Electrochemistry and Corrosion: (12 Lectures)
Electrochemistry : Electrode potential, types of electrodes: calomel and glass electrodes - construction and working, electrochemical series and applications, electrochemical cells:
Galvanic & electrolytic cells, Nernst equation - applications, numerical problems, Batteries:
primary and secondary types, lithium metal, lithium ion and lead acid batteries. Types of
Fuel cells: hydrogen -oxygen fuel cell - applications and advantages, microbial fuel cell.
Corrosion: Definition ,causes and effects of corrosion, The ories of chemical and electro
chemical corrosion with mechanism, Types of corrosion - Galvanic, concentration cell and pitting corrosions, factors affecting corrosion (Nature of metal & Nature of Environment),
corrosion control methods: Proper designing, cathodic protection (sacrificial anodic and
impressed current cathodic protection), Metallic coatings: Hot dipping - Galvanization and
tinning, electroplating, electroless plating of nickel."#
                    .to_string(),
            ],
        ),
        LlmTestCase::new(
            "what are the prerequisities for 'software engineering' subject",
            "Basic knowledge of programming language. Idea about Database systems. Design of flow charts.",
            "1. Basic knowledge of programming language. 2. Idea about Database systems. 3. Design of flow charts.",
            vec![
                r#"Prerequisites:

                        Basic knowledge of programming language
                        Idea about Data base systems
                        Design of flow charts"#
                    .to_string(),
            ],
        ),
        LlmTestCase::new(
            "what are the recommended books for artificial intelligence subject?",
            "Artificial Intelligence - A modern approach by Stuart Russel, Peter Norvig, 2nd edition, PHI/Pearson Artificial Intelligence by Riche & K. Night, 2nd edition, TMH.",
            "Text Books:  1. Artificial Intelligence-A modern approach-by Staurt Russel, Peter Norvig, 2nd edition, PHI/Pearson  References: 1. Artificial Intelligence – Riche &K.Night , 2nd edition, TMH. 2. Paradigms of Artificial intelligence programming, case studies in common lisp-Peter. Norvig, Morgan Kaufmann.ISBN-13:978-1558601918. 3. Robotics: Fundamental Concepts and Analysis –Ashitava Goshal, oxford. 4. A Textbook of Robotics 1-Basic Concepts-M. Shoham-Springer US.",
            vec![
                r#"Text Books:
Artificial Intelligence -A modern approach -by Staurt Russel, Peter Norvig, 2nd edition,
PHI/Pearson
References:
Artificial Intelligence – Riche &K.Night , 2nd edition, TMH."#
                    .to_string(),
            ],
        ),
    ]
}
