//! Presentation-agnostic helpers for the finished-questionnaire summary.

use serde_json::Value;

use crate::session::StepSession;

/// One row of the summary: accumulated display label plus formatted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub code: String,
    pub label: String,
    pub value: String,
}

/// Builds summary rows from the session's final answers, in the order the
/// service reported them. Labels accumulated while walking the steps caption
/// codes whose step is long gone; unknown codes fall back to the code
/// itself.
#[must_use]
pub fn summary_rows(session: &StepSession) -> Vec<SummaryRow> {
    session
        .final_answers()
        .iter()
        .map(|(code, value)| SummaryRow {
            code: code.clone(),
            label: session
                .labels()
                .get(code)
                .cloned()
                .unwrap_or_else(|| code.clone()),
            value: format_value(value),
        })
        .collect()
}

/// Renders a final-answer value for display: booleans as yes/no, file lists
/// as a count, empty values as a placeholder.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Array(items) if items.is_empty() => "—".to_string(),
        Value::Array(items) => format!("{} file(s)", items.len()),
        Value::Null => "—".to_string(),
        Value::String(text) if text.is_empty() => "—".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
