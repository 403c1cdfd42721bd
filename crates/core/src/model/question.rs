use serde::{Deserialize, Serialize};

use crate::model::overrides::override_for;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Rendering/validation category of a question, as declared by the step
/// service. Categories are mutually exclusive; unrecognized type strings map
/// to `Unknown` so new server-side kinds do not break deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    YesNo,
    Select,
    Text,
    Phone,
    Email,
    Date,
    Textarea,
    File,
    FileMulti,
    #[serde(other)]
    Unknown,
}

impl QuestionKind {
    /// True for kinds answered by picking from an option list.
    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(self, Self::YesNo | Self::Select)
    }

    /// True for kinds answered with one or more file attachments.
    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, Self::File | Self::FileMulti)
    }
}

/// One selectable entry of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A single question of a step. Immutable once received from the step
/// service for the lifetime of its step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Effective ordered option list for this question.
    ///
    /// A per-code override with a hardcoded option set wins over whatever the
    /// service sent; non-choice kinds have no options.
    #[must_use]
    pub fn effective_options(&self) -> Vec<QuestionOption> {
        if let Some(ovr) = override_for(&self.code)
            && !ovr.manual_options.is_empty()
        {
            return ovr
                .manual_options
                .iter()
                .map(|(value, label)| QuestionOption::new(*value, *label))
                .collect();
        }
        if self.kind.is_choice() {
            self.options.clone()
        } else {
            Vec::new()
        }
    }

    /// Display text for the question, falling back to its code when the
    /// service sent no label.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.code)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
