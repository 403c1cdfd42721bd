use serde::{Deserialize, Serialize};

use crate::model::question::Question;

/// A server-defined ordered group of questions presented together before the
/// next synchronization point. The question order defines the valid cursor
/// range `[0, len - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Step {
    /// Index of the last question, or 0 for a step with no questions.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionKind;

    fn step(codes: &[&str]) -> Step {
        Step {
            code: "s_contact".to_string(),
            title: "Contact details".to_string(),
            questions: codes
                .iter()
                .map(|code| Question {
                    code: (*code).to_string(),
                    kind: QuestionKind::Text,
                    label: None,
                    options: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn last_index_is_zero_for_empty_step() {
        assert_eq!(step(&[]).last_index(), 0);
    }

    #[test]
    fn question_lookup_respects_order() {
        let step = step(&["q_name", "q_phone"]);
        assert_eq!(step.last_index(), 1);
        assert_eq!(step.question(1).unwrap().code, "q_phone");
        assert!(step.question(2).is_none());
    }

    #[test]
    fn step_deserializes_without_questions() {
        let step: Step =
            serde_json::from_str(r#"{"code": "s_intro", "title": "Introduction"}"#).unwrap();
        assert!(step.questions.is_empty());
    }
}
