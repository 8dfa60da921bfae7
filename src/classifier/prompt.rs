// src/classifier/prompt.rs
// Builds the categorization prompt sent to the model service.

use std::fmt::Write;

use crate::config::DepartmentConfig;

use super::ClassificationRequest;

/// Render the categorization prompt: the department enumeration, the ticket
/// text, the exact reply format, and one routing rule per department. The
/// reply format must stay in lockstep with what `parse` accepts.
pub fn build_categorization_prompt(
    request: &ClassificationRequest,
    departments: &[DepartmentConfig],
) -> String {
    let names = departments
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Categorize this support ticket into exactly one of these departments: {names}.\n\n\
         Ticket Title: {title}\n\
         Ticket Description: {description}\n\n\
         Respond in this exact format:\n\
         Department: [department name]\n\
         Confidence: [number from 0-100]\n\
         Reason: [one short sentence, optional]\n\n\
         Rules:\n",
        title = request.title,
        description = request.description,
    );

    for dept in departments {
        if dept.hint.is_empty() {
            let _ = writeln!(prompt, "- {}", dept.name);
        } else {
            let _ = writeln!(prompt, "- {}: {}", dept.name, dept.hint);
        }
    }

    prompt
}
