// src/classifier/parse.rs
// Extracts a (department, confidence, rationale) triple from a model reply.
// The reply shape is a prompt contract, not a wire format: models wrap
// answers in markdown, change label casing, and add stray emphasis, so the
// parser tolerates that variance and rejects anything it cannot trust.

use crate::config::DepartmentConfig;
use crate::error::ParseError;

/// Fields recovered from a well-formed model reply. `confidence` is `None`
/// when the reply omitted the line; the gateway substitutes its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub department: String,
    pub confidence: Option<u8>,
    pub rationale: Option<String>,
}

/// Parse a model reply against the configured department set.
///
/// A reply without a recognizable `Department:` line, naming a department
/// outside the set, or carrying a non-integer / out-of-range confidence is a
/// [`ParseError`] — malformed output is never retried.
pub fn parse_model_reply(
    reply: &str,
    departments: &[DepartmentConfig],
) -> Result<ParsedReply, ParseError> {
    let mut department: Option<String> = None;
    let mut unknown: Option<String> = None;
    let mut confidence: Option<u8> = None;
    let mut rationale: Option<String> = None;

    for raw_line in reply.lines() {
        let line = clean_line(raw_line);
        if line.is_empty() {
            continue;
        }

        if let Some(value) = label_value(line, "department:") {
            if department.is_some() || unknown.is_some() {
                continue; // first department line wins
            }
            match departments
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(value))
            {
                Some(dept) => department = Some(dept.name.clone()),
                None => unknown = Some(value.to_string()),
            }
        } else if let Some(value) = label_value(line, "confidence:") {
            if confidence.is_some() {
                continue;
            }
            let digits = value.trim_end_matches('%').trim();
            let parsed = digits
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidConfidence(value.to_string()))?;
            if !(0..=100).contains(&parsed) {
                return Err(ParseError::InvalidConfidence(value.to_string()));
            }
            confidence = Some(parsed as u8);
        } else if let Some(value) = label_value(line, "reason:") {
            if rationale.is_none() && !value.is_empty() {
                rationale = Some(value.to_string());
            }
        }
    }

    match (department, unknown) {
        (Some(department), _) => Ok(ParsedReply {
            department,
            confidence,
            rationale,
        }),
        (None, Some(unknown)) => Err(ParseError::UnknownDepartment(unknown)),
        (None, None) => Err(ParseError::MissingDepartment),
    }
}

/// Strip the markdown dressing models like to add: code fences, emphasis
/// markers, bracket echoes of the prompt template.
fn clean_line(line: &str) -> &str {
    let line = line.trim();
    if line.starts_with("```") {
        return "";
    }
    line.trim_matches(|c| c == '*' || c == '`').trim()
}

/// Case-insensitive label match; returns the value with template brackets
/// and emphasis stripped. Labels are ASCII so byte offsets line up.
fn label_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if line.len() < label.len()
        || !line.is_char_boundary(label.len())
        || !line[..label.len()].eq_ignore_ascii_case(label)
    {
        return None;
    }
    Some(
        line[label.len()..]
            .trim()
            .trim_matches(|c| c == '[' || c == ']' || c == '*')
            .trim(),
    )
}
