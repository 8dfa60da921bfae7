// src/classifier/keyword.rs
// Deterministic keyword fallback. This path is the system's actual
// correctness guarantee: it is pure, never fails, and is what a ticket gets
// when the model service is unavailable or untrustworthy.

use tracing::info;

use crate::config::TriageConfig;

use super::{ClassificationRequest, ClassificationResult, Source};

/// Confidence assigned when no keyword matched anywhere and the ticket lands
/// in the default department.
pub const NO_MATCH_CONFIDENCE: u8 = 30;

const MATCH_BASE_CONFIDENCE: u32 = 50;
const MATCH_STEP: u32 = 10;
const MATCH_CONFIDENCE_CAP: u32 = 75;

/// Classify a ticket by counting configured keywords in its text.
///
/// Matching is case-insensitive substring containment, so multi-word phrases
/// count too. Ties break toward the department listed earlier in the
/// configured order. Zero matches anywhere selects the default department at
/// [`NO_MATCH_CONFIDENCE`]; otherwise confidence grows with the match count
/// and is capped below any authoritative AI answer.
pub fn classify_by_keywords(
    request: &ClassificationRequest,
    config: &TriageConfig,
) -> ClassificationResult {
    let text = request.combined_text().to_lowercase();

    let mut best_department: Option<&str> = None;
    let mut best_count = 0usize;
    let mut best_matches: Vec<&str> = Vec::new();

    for dept in &config.departments {
        let matches: Vec<&str> = dept
            .keywords
            .iter()
            .filter(|keyword| text.contains(keyword.to_lowercase().as_str()))
            .map(|keyword| keyword.as_str())
            .collect();

        // Strictly greater keeps the earlier department on ties.
        if matches.len() > best_count {
            best_count = matches.len();
            best_department = Some(dept.name.as_str());
            best_matches = matches;
        }
    }

    let result = match best_department {
        Some(department) if best_count > 0 => {
            let confidence =
                (MATCH_BASE_CONFIDENCE + MATCH_STEP * best_count as u32).min(MATCH_CONFIDENCE_CAP);
            ClassificationResult {
                department: department.to_string(),
                confidence: confidence as u8,
                source: Source::Fallback,
                rationale: Some(format!("matched keywords: {}", best_matches.join(", "))),
            }
        }
        _ => {
            let department = config
                .find_department(&config.default_department)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| config.default_department.clone());
            ClassificationResult {
                department,
                confidence: NO_MATCH_CONFIDENCE,
                source: Source::Fallback,
                rationale: None,
            }
        }
    };

    info!(
        "Fallback categorization: {} (confidence: {}%)",
        result.department, result.confidence
    );
    result
}
