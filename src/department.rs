//! The fixed set of departments and where their vector stores live.

use crate::error::{Result, SyllabusError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A university department with its own syllabus store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Cse,
    Aiml,
    Ece,
    It,
    Csbs,
    Ds,
}

impl Department {
    /// All departments, in the order the UI lists them.
    pub const ALL: [Department; 6] = [
        Department::Cse,
        Department::Aiml,
        Department::Ece,
        Department::It,
        Department::Csbs,
        Department::Ds,
    ];

    /// Human-readable label shown in the department selector.
    pub fn label(&self) -> &'static str {
        match self {
            Department::Cse => "Computer Science and Engineering (CSE)",
            Department::Aiml => "Artificial Intelligence and Machine Learning (CS-AIML)",
            Department::Ece => "Electronics and Communication Engineering (ECE)",
            Department::It => "Information Technology (IT)",
            Department::Csbs => "Computer Science and Business System (CSBS)",
            Department::Ds => "Data Science (DS)",
        }
    }

    /// Storage-path suffix.
    pub fn code(&self) -> &'static str {
        match self {
            Department::Cse => "cse",
            Department::Aiml => "aiml",
            Department::Ece => "ece",
            Department::It => "it",
            Department::Csbs => "csbs",
            Department::Ds => "ds",
        }
    }

    /// Store directory for this department: the prefix followed by the code.
    pub fn store_path(&self, prefix: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", prefix, self.code()))
    }

    /// Look up a department by its full label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl FromStr for Department {
    type Err = SyllabusError;

    /// Accepts either the code (case-insensitive) or the full label.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(trimmed))
            .or_else(|| Self::from_label(trimmed))
            .ok_or_else(|| SyllabusError::UnknownDepartment(s.to_string()))
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
