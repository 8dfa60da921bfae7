// src/classifier/types.rs

use serde::{Deserialize, Serialize};

/// Which strategy produced a classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Ai => "ai",
            Source::Fallback => "fallback",
        }
    }
}

/// Ticket text handed to the classifier. Immutable once built; the combined
/// title + description is the only input either strategy looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub title: String,
    pub description: String,
}

impl ClassificationRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// The text every strategy classifies over.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// Outcome of classifying one ticket. Created per call, never mutated;
/// re-categorization produces a fresh value.
///
/// `department` is always a member of the configured set in canonical
/// casing, and `confidence` is always within 0-100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub department: String,
    pub confidence: u8,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}
